use crate::domain::{Field, SubscriberEmail, SubscriberName, ValidationErrors};

#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub name: SubscriberName,
    pub email: SubscriberEmail,
}

impl NewSubscriber {
    /// Validates both fields independently so every field error is reported at once.
    pub fn parse(name: impl AsRef<str>, email: impl AsRef<str>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = SubscriberName::parse(name)
            .map_err(|code| errors.insert(Field::Name, code))
            .ok();
        let email = SubscriberEmail::parse(email)
            .map_err(|code| errors.insert(Field::Email, code))
            .ok();

        match (name, email) {
            (Some(name), Some(email)) => Ok(Self { name, email }),
            _ => Err(errors),
        }
    }
}
