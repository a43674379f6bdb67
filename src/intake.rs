use chrono::{DateTime, Utc};

use crate::domain::{NewSubscriber, ValidationErrors};
use crate::store::{StoreError, SubscriberStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscribed {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug)]
pub enum IntakeError {
    #[error("The subscription request failed validation: {0}")]
    ValidationFailed(ValidationErrors),
    #[error("The email is already subscribed")]
    DuplicateEmail,
    #[error("Failed to store the subscription")]
    StorageError(#[source] anyhow::Error),
}

/// Validates subscription requests and persists the valid ones.
pub struct Intake<S> {
    store: S,
}

impl<S: SubscriberStore> Intake<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(
        name = "Adding a new subscriber",
        skip(self, name, email),
        fields(subscriber_email = %email.as_ref().trim(), subscriber_name = %name.as_ref().trim())
    )]
    pub async fn subscribe(
        &self,
        name: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<Subscribed, IntakeError> {
        let subscriber =
            NewSubscriber::parse(name, email).map_err(IntakeError::ValidationFailed)?;

        match self.store.insert(&subscriber).await {
            Ok(row) => Ok(Subscribed {
                id: row.id,
                created_at: row.created_at,
            }),
            Err(StoreError::UniqueViolation(_)) => Err(IntakeError::DuplicateEmail),
            Err(StoreError::Unexpected(e)) => Err(IntakeError::StorageError(e)),
        }
    }
}
