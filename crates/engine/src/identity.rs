use aquarium_core::ids::UserId;

/// An authenticated session as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub valid: bool,
}

pub trait IdentityProvider {
    fn current_session(&self) -> Option<Session>;

    /// The user id, only when a session exists and is still valid.
    fn authenticated_user(&self) -> Option<UserId> {
        self.current_session()
            .filter(|session| session.valid)
            .map(|session| session.user_id)
    }
}

/// A fixed identity, or none at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticIdentity(pub Option<Session>);

impl StaticIdentity {
    pub fn signed_in(user_id: UserId) -> Self {
        Self(Some(Session { user_id, valid: true }))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }

    pub fn expired(user_id: UserId) -> Self {
        Self(Some(Session { user_id, valid: false }))
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_session(&self) -> Option<Session> {
        self.0
    }
}
