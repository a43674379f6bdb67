mod authorization;
mod password;

pub use authorization::{AuthorizationChecker, Caller, SessionAdministrator};
pub use password::{AuthError, Credentials, provision_administrator, validate_credentials};
