use std::future::{Ready, ready};

use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use uuid::Uuid;

use crate::anti_forgery::generate_session_seed;
use crate::authentication::Caller;

pub struct TypedSession(Session);

impl TypedSession {
    const USER_ID_KEY: &'static str = "user_id";
    const TOKEN_SEED_KEY: &'static str = "token_seed";

    pub fn renew(&self) {
        self.0.renew();
    }

    pub fn insert_user_id(&self, user_id: Uuid) -> Result<(), SessionInsertError> {
        self.0.insert(Self::USER_ID_KEY, user_id)
    }

    pub fn get_user_id(&self) -> Result<Option<Uuid>, SessionGetError> {
        self.0.get(Self::USER_ID_KEY)
    }

    pub fn caller(&self) -> Result<Caller, SessionGetError> {
        self.get_user_id().map(Caller::from_user_id)
    }

    /// The seed anti-forgery tokens are bound to, created on first use.
    pub fn token_seed(&self) -> Result<String, anyhow::Error> {
        if let Some(seed) = self.existing_token_seed()? {
            return Ok(seed);
        }
        let seed = generate_session_seed();
        self.0.insert(Self::TOKEN_SEED_KEY, &seed)?;
        Ok(seed)
    }

    pub fn existing_token_seed(&self) -> Result<Option<String>, SessionGetError> {
        self.0.get(Self::TOKEN_SEED_KEY)
    }

    pub fn log_out(self) {
        self.0.purge()
    }
}

impl FromRequest for TypedSession {
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<TypedSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(TypedSession(req.get_session())))
    }
}
