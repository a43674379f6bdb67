use actix_web::http::StatusCode;
use actix_web::{
    HttpResponse, ResponseError,
    web::{self, Form},
};

use crate::anti_forgery::{TokenAction, TokenError, TokenVerifier};
use crate::authentication::AuthorizationChecker;
use crate::directory::{Directory, DirectoryError};
use crate::domain::Subscriber;
use crate::routes::{MessageBody, TokenBody, error_chain_fmt, verify_session_token};
use crate::session_state::TypedSession;
use crate::store::SubscriberStore;

#[derive(serde::Serialize)]
pub struct SubscribersBody {
    pub subscribers: Vec<Subscriber>,
    pub total: usize,
}

impl From<Vec<Subscriber>> for SubscribersBody {
    fn from(subscribers: Vec<Subscriber>) -> Self {
        Self {
            total: subscribers.len(),
            subscribers,
        }
    }
}

#[derive(serde::Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    token: String,
    #[serde(default)]
    search: String,
}

/// Initial, unfiltered listing for the admin page.
#[tracing::instrument(name = "List all subscribers", skip(session, directory))]
pub async fn list_subscribers<S: SubscriberStore>(
    session: TypedSession,
    directory: web::Data<Directory<S>>,
) -> Result<HttpResponse, SearchError> {
    let caller = session
        .caller()
        .map_err(|e| SearchError::UnexpectedError(e.into()))?;
    let subscribers = directory.list(&caller, None).await?;
    Ok(HttpResponse::Ok().json(SubscribersBody::from(subscribers)))
}

#[tracing::instrument(name = "Issue search token", skip(session, verifier, authorization))]
pub async fn search_token(
    session: TypedSession,
    verifier: web::Data<dyn TokenVerifier>,
    authorization: web::Data<dyn AuthorizationChecker>,
) -> Result<HttpResponse, SearchError> {
    let caller = session
        .caller()
        .map_err(|e| SearchError::UnexpectedError(e.into()))?;
    if !authorization.can_manage_subscribers(&caller) {
        return Err(SearchError::Forbidden);
    }
    let seed = session.token_seed()?;
    let token = verifier.issue(&seed, TokenAction::Search)?;
    Ok(HttpResponse::Ok().json(TokenBody { token }))
}

#[tracing::instrument(
    name = "Search subscribers",
    skip(form, session, verifier, directory),
    fields(search = %form.search)
)]
pub async fn search_subscribers<S: SubscriberStore>(
    Form(form): Form<SearchForm>,
    session: TypedSession,
    verifier: web::Data<dyn TokenVerifier>,
    directory: web::Data<Directory<S>>,
) -> Result<HttpResponse, SearchError> {
    verify_session_token(&session, verifier.get_ref(), &form.token, TokenAction::Search)
        .map_err(SearchError::SecurityTokenInvalid)?;

    let caller = session
        .caller()
        .map_err(|e| SearchError::UnexpectedError(e.into()))?;
    let subscribers = directory.list(&caller, Some(form.search.as_str())).await?;
    Ok(HttpResponse::Ok().json(SubscribersBody::from(subscribers)))
}

#[derive(thiserror::Error)]
pub enum SearchError {
    #[error("Security check failed")]
    SecurityTokenInvalid(#[source] TokenError),
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("An error occurred while searching. Please try again.")]
    StorageError(#[source] anyhow::Error),
    #[error("An error occurred while searching. Please try again.")]
    UnexpectedError(#[from] anyhow::Error),
}

impl From<DirectoryError> for SearchError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Forbidden => Self::Forbidden,
            DirectoryError::StorageError(e) => Self::StorageError(e),
        }
    }
}

impl std::fmt::Debug for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::SecurityTokenInvalid(_) | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::StorageError(_) | Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageBody::new(self))
    }
}
