use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use secrecy::Secret;
use sqlx::PgPool;

use super::{MessageBody, error_chain_fmt};
use crate::authentication::{AuthError, Credentials, validate_credentials};
use crate::session_state::TypedSession;

#[derive(serde::Deserialize)]
pub struct LoginForm {
    username: String,
    password: Secret<String>,
}

#[tracing::instrument(name = "Login", skip(form, pg_pool, session), fields(username=tracing::field::Empty, user_id=tracing::field::Empty))]
pub async fn login(
    form: web::Form<LoginForm>,
    pg_pool: web::Data<PgPool>,
    session: TypedSession,
) -> Result<HttpResponse, LoginError> {
    tracing::Span::current().record("username", tracing::field::display(&form.username));
    let credentials = Credentials {
        username: form.0.username,
        password: form.0.password,
    };

    let user_id = validate_credentials(&pg_pool, credentials)
        .await
        .map_err(|e| match e {
            AuthError::AuthError(e) => LoginError::AuthError(e),
            AuthError::UnexpectedError(e) => LoginError::UnexpectedError(e),
        })?;
    tracing::Span::current().record("user_id", tracing::field::display(&user_id));

    session.renew();
    session
        .insert_user_id(user_id)
        .map_err(|e| LoginError::UnexpectedError(e.into()))?;

    Ok(HttpResponse::Ok().json(MessageBody::new("You are logged in.")))
}

#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("Invalid login credentials")]
    AuthError(#[source] anyhow::Error),
    #[error("An unexpected error occurred while trying to authenticate")]
    UnexpectedError(#[source] anyhow::Error),
}

impl std::fmt::Debug for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LoginError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthError(_) => StatusCode::UNAUTHORIZED,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageBody::new(self))
    }
}
