use uuid::Uuid;

/// Who is making a request, as far as the session can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Administrator(Uuid),
}

impl Caller {
    pub fn from_user_id(user_id: Option<Uuid>) -> Self {
        match user_id {
            Some(user_id) => Self::Administrator(user_id),
            None => Self::Anonymous,
        }
    }
}

/// Decides whether a caller holds the capability to read the subscriber directory.
pub trait AuthorizationChecker: Send + Sync {
    fn can_manage_subscribers(&self, caller: &Caller) -> bool;
}

/// Every account in `users` is an administrator, so a logged-in session is enough.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionAdministrator;

impl AuthorizationChecker for SessionAdministrator {
    fn can_manage_subscribers(&self, caller: &Caller) -> bool {
        matches!(caller, Caller::Administrator(_))
    }
}
