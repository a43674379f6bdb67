use std::sync::Arc;

use crate::authentication::{AuthorizationChecker, Caller};
use crate::domain::{SearchFilter, Subscriber};
use crate::store::SubscriberStore;

#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    #[error("The caller is not allowed to read the subscriber directory")]
    Forbidden,
    #[error("Failed to read the subscriber directory")]
    StorageError(#[source] anyhow::Error),
}

/// Authorized, optionally filtered listing of every subscriber, newest first.
pub struct Directory<S> {
    store: S,
    authorization: Arc<dyn AuthorizationChecker>,
}

impl<S: SubscriberStore> Directory<S> {
    pub fn new(store: S, authorization: Arc<dyn AuthorizationChecker>) -> Self {
        Self {
            store,
            authorization,
        }
    }

    #[tracing::instrument(name = "List subscribers", skip(self))]
    pub async fn list(
        &self,
        caller: &Caller,
        filter: Option<&str>,
    ) -> Result<Vec<Subscriber>, DirectoryError> {
        if !self.authorization.can_manage_subscribers(caller) {
            tracing::warn!("Rejected subscriber directory access");
            return Err(DirectoryError::Forbidden);
        }

        let filter = SearchFilter::from_optional(filter);
        self.store
            .list(filter.as_ref())
            .await
            .map_err(|e| DirectoryError::StorageError(e.into()))
    }
}
