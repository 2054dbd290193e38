use ledgerly_core::UserId;

/// Authenticated user context for a request.
///
/// Identity verification happens upstream (the identity provider is out of
/// scope); this carries the already-resolved user id and must be present
/// for all domain routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
