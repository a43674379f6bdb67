use validator::ValidateEmail;

use super::FieldErrorCode;

#[derive(Debug, Clone)]
pub struct SubscriberEmail(String);

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SubscriberEmail {
    /// Trims `email` and requires a `local@domain.tld` shape. The address is kept verbatim otherwise.
    pub fn parse(email: impl AsRef<str>) -> Result<Self, FieldErrorCode> {
        let email = email.as_ref().trim().to_string();
        if email.is_empty() {
            return Err(FieldErrorCode::EmailRequired);
        }
        if !ValidateEmail::validate_email(&email) || !has_dotted_domain(&email) {
            return Err(FieldErrorCode::EmailInvalid);
        }
        Ok(Self(email))
    }
}

// `validator` accepts single-label domains such as `localhost`.
fn has_dotted_domain(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((_, domain)) => {
            domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    }
}
