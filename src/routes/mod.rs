pub mod admin;
pub mod health_check;
pub mod login;
pub mod subscriptions;

pub use admin::*;
pub use health_check::*;
pub use login::*;
pub use subscriptions::*;

use actix_web::error::{InternalError, UrlencodedError};
use actix_web::{HttpRequest, HttpResponse};

use crate::anti_forgery::{TokenAction, TokenError, TokenVerifier};
use crate::session_state::TypedSession;

/// `{message, errors?}` body shared by every endpoint's success and failure responses.
#[derive(serde::Serialize)]
pub struct MessageBody<E: serde::Serialize = ()> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<E>,
}

impl MessageBody {
    pub fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            errors: None,
        }
    }
}

impl<E: serde::Serialize> MessageBody<E> {
    pub fn with_errors(message: impl ToString, errors: E) -> Self {
        Self {
            message: message.to_string(),
            errors: Some(errors),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct TokenBody {
    pub token: String,
}

/// Bodies that cannot be read as a form get the same JSON shape as every other error.
pub fn form_error_handler(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected unreadable form body: {err}");
    let response = HttpResponse::BadRequest().json(MessageBody::new(
        "The request body is not a valid form submission.",
    ));
    InternalError::from_response(err, response).into()
}

// Sessions that never asked for a token have no seed, so any token they send is rejected.
fn verify_session_token(
    session: &TypedSession,
    verifier: &dyn TokenVerifier,
    token: &str,
    action: TokenAction,
) -> Result<(), TokenError> {
    let seed = session
        .existing_token_seed()
        .map_err(|e| TokenError::Unexpected(e.into()))?
        .unwrap_or_default();
    verifier.verify(token, &seed, action)
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
