use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{
    HttpResponse, ResponseError,
    web::{self, Form},
};

use super::{MessageBody, TokenBody, error_chain_fmt, verify_session_token};
use crate::anti_forgery::{TokenAction, TokenError, TokenVerifier};
use crate::domain::{Field, ValidationErrors};
use crate::intake::{Intake, IntakeError};
use crate::session_state::TypedSession;
use crate::store::SubscriberStore;

#[derive(serde::Deserialize)]
pub struct SubscribeForm {
    #[serde(default)]
    token: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

#[tracing::instrument(name = "Issue subscription form token", skip(session, verifier))]
pub async fn subscription_token(
    session: TypedSession,
    verifier: web::Data<dyn TokenVerifier>,
) -> Result<HttpResponse, SubscribeError> {
    let seed = session.token_seed()?;
    let token = verifier.issue(&seed, TokenAction::Subscribe)?;
    Ok(HttpResponse::Ok().json(TokenBody { token }))
}

#[tracing::instrument(
    name = "Handle subscription request",
    skip(form, session, verifier, intake),
    fields(
           subscriber_email = %form.email,
           subscriber_name = %form.name
           )
)]
pub async fn subscribe<S: SubscriberStore>(
    Form(form): Form<SubscribeForm>,
    session: TypedSession,
    verifier: web::Data<dyn TokenVerifier>,
    intake: web::Data<Intake<S>>,
) -> Result<HttpResponse, SubscribeError> {
    verify_session_token(&session, verifier.get_ref(), &form.token, TokenAction::Subscribe)
        .map_err(SubscribeError::SecurityTokenInvalid)?;

    let subscribed = intake.subscribe(form.name, form.email).await?;
    tracing::info!(subscriber_id = subscribed.id, "New subscriber saved");

    Ok(HttpResponse::Ok().json(MessageBody::new(
        "Thank you for subscribing! We'll keep you updated.",
    )))
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Security check failed. Please refresh the page and try again.")]
    SecurityTokenInvalid(#[source] TokenError),
    #[error("Please correct the errors below.")]
    ValidationFailed(ValidationErrors),
    #[error("This email is already subscribed to our newsletter.")]
    DuplicateEmail,
    #[error("An error occurred. Please try again later.")]
    StorageError(#[source] anyhow::Error),
    #[error("An error occurred. Please try again later.")]
    UnexpectedError(#[from] anyhow::Error),
}

impl From<IntakeError> for SubscribeError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::ValidationFailed(errors) => Self::ValidationFailed(errors),
            IntakeError::DuplicateEmail => Self::DuplicateEmail,
            IntakeError::StorageError(e) => Self::StorageError(e),
        }
    }
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::SecurityTokenInvalid(_) => StatusCode::FORBIDDEN,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::StorageError(_) | Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            Self::ValidationFailed(errors) => {
                response.json(MessageBody::with_errors(self, errors.messages()))
            }
            Self::DuplicateEmail => {
                let errors = BTreeMap::from([(Field::Email, "Email already exists.")]);
                response.json(MessageBody::with_errors(self, errors))
            }
            _ => response.json(MessageBody::new(self)),
        }
    }
}
