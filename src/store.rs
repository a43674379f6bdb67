use std::future::Future;

use anyhow::Context;
use sqlx::PgPool;

use crate::domain::{NewSubscriber, SearchFilter, Subscriber};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("A subscriber with this email already exists")]
    UniqueViolation(#[source] sqlx::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::UniqueViolation(e)
            }
            _ => Self::Unexpected(anyhow::Error::new(e)),
        }
    }
}

/// Durable storage for subscribers.
pub trait SubscriberStore: Send + Sync + 'static {
    /// Inserts a subscriber. Fails with `UniqueViolation` if the email is taken, leaving the store untouched.
    fn insert(
        &self,
        subscriber: &NewSubscriber,
    ) -> impl Future<Output = Result<Subscriber, StoreError>> + Send;

    /// All subscribers, or those whose name or email contains `filter`, newest first.
    fn list(
        &self,
        filter: Option<&SearchFilter>,
    ) -> impl Future<Output = Result<Vec<Subscriber>, StoreError>> + Send;
}

#[derive(Clone, Debug)]
pub struct PgSubscriberStore {
    pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(name = "Saving new subscriber to database", skip(self, subscriber))]
    async fn insert(&self, subscriber: &NewSubscriber) -> Result<Subscriber, StoreError> {
        sqlx::query_as::<_, Subscriber>(
            r#"INSERT INTO subscribers(name, email)
                 VALUES($1, $2)
                 RETURNING id, name, email, created_at"#,
        )
        .bind(subscriber.name.as_ref())
        .bind(subscriber.email.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert subscriber to database: {e:?}");
            StoreError::from(e)
        })
    }

    #[tracing::instrument(name = "Get subscribers from database", skip(self))]
    async fn list(&self, filter: Option<&SearchFilter>) -> Result<Vec<Subscriber>, StoreError> {
        let query = match filter {
            Some(filter) => sqlx::query_as::<_, Subscriber>(
                r#"SELECT id, name, email, created_at
                   FROM subscribers
                   WHERE name ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\'
                   ORDER BY created_at DESC, id DESC"#,
            )
            .bind(filter.like_pattern()),
            None => sqlx::query_as::<_, Subscriber>(
                r#"SELECT id, name, email, created_at
                   FROM subscribers
                   ORDER BY created_at DESC, id DESC"#,
            ),
        };

        let subscribers = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch subscribers from database")?;
        Ok(subscribers)
    }
}
