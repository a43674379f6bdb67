use unicode_segmentation::UnicodeSegmentation;

use super::FieldErrorCode;

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 255;

#[derive(Debug, Clone)]
pub struct SubscriberName(String);

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SubscriberName {
    /// Trims `name` and checks its length in grapheme clusters.
    pub fn parse(name: impl AsRef<str>) -> Result<Self, FieldErrorCode> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(FieldErrorCode::NameRequired);
        }

        let length = name.graphemes(true).count();
        if length < MIN_LENGTH {
            Err(FieldErrorCode::NameTooShort)
        } else if length > MAX_LENGTH {
            Err(FieldErrorCode::NameTooLong)
        } else {
            Ok(Self(name.to_string()))
        }
    }
}
