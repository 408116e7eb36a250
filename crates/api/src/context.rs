use armory_core::UserId;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware and passed explicitly to every service
/// call; nothing reads a "current user" from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
    name: String,
}

impl CallerContext {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
