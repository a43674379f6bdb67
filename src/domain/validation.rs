use std::collections::BTreeMap;

/// Subscription form field a validation error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldErrorCode {
    NameRequired,
    NameTooShort,
    NameTooLong,
    EmailRequired,
    EmailInvalid,
}

impl FieldErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NameRequired => "Name is required.",
            Self::NameTooShort => "Name must be at least 2 characters.",
            Self::NameTooLong => "Name is too long.",
            Self::EmailRequired => "Email is required.",
            Self::EmailInvalid => "Please enter a valid email address.",
        }
    }
}

impl std::fmt::Display for FieldErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// At most one error code per field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, FieldErrorCode>);

impl ValidationErrors {
    pub fn insert(&mut self, field: Field, code: FieldErrorCode) {
        self.0.entry(field).or_insert(code);
    }

    pub fn get(&self, field: Field) -> Option<FieldErrorCode> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldErrorCode)> + '_ {
        self.0.iter().map(|(field, code)| (*field, *code))
    }

    /// Field name to user-facing message, as returned by the intake endpoint.
    pub fn messages(&self) -> BTreeMap<Field, &'static str> {
        self.iter().map(|(field, code)| (field, code.message())).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, code) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{field:?}: {code}")?;
            first = false;
        }
        Ok(())
    }
}
