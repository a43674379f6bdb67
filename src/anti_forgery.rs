use hmac::Mac;
use rand::{Rng, distributions::Alphanumeric};
use secrecy::{ExposeSecret, Secret};

type HmacSha256 = hmac::Hmac<sha2::Sha256>;

/// The request a token authorizes. A token issued for one action is rejected for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    Subscribe,
    Search,
}

impl TokenAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAction::Subscribe => "subscribe",
            TokenAction::Search => "search",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("No anti-forgery seed is bound to this session")]
    MissingBinding,
    #[error("The anti-forgery token is not valid hex")]
    Malformed(#[source] hex::FromHexError),
    #[error("The anti-forgery token does not match")]
    Mismatch,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Issues and checks anti-forgery tokens bound to a per-session seed.
pub trait TokenVerifier: Send + Sync {
    fn issue(&self, binding: &str, action: TokenAction) -> Result<String, anyhow::Error>;

    fn verify(&self, token: &str, binding: &str, action: TokenAction) -> Result<(), TokenError>;
}

pub struct HmacTokenVerifier {
    secret: Secret<String>,
}

impl HmacTokenVerifier {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    fn mac(&self, binding: &str, action: TokenAction) -> Result<HmacSha256, anyhow::Error> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to key the token HMAC: {e}"))?;
        mac.update(format!("{}:{binding}", action.as_str()).as_bytes());
        Ok(mac)
    }
}

impl TokenVerifier for HmacTokenVerifier {
    fn issue(&self, binding: &str, action: TokenAction) -> Result<String, anyhow::Error> {
        let tag = self.mac(binding, action)?.finalize().into_bytes();
        Ok(hex::encode(tag))
    }

    fn verify(&self, token: &str, binding: &str, action: TokenAction) -> Result<(), TokenError> {
        if binding.is_empty() {
            return Err(TokenError::MissingBinding);
        }
        let tag = hex::decode(token.trim()).map_err(TokenError::Malformed)?;
        self.mac(binding, action)?
            .verify_slice(&tag)
            .map_err(|_| TokenError::Mismatch)
    }
}

/// Random seed a session's tokens are bound to.
pub fn generate_session_seed() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(32)
        .collect()
}
