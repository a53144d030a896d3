//! Explicit session context
//!
//! Every service client and the reconciler receive a [`SessionContext`]
//! at construction. Nothing reads ambient global storage: the session a
//! call acts under is always visible at the call site.

/// Identity and session state for collaborator calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_token: String,
    actor: Option<String>,
}

impl SessionContext {
    /// Create a context from a session token
    #[inline]
    #[must_use]
    pub fn new(session_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
            actor: None,
        }
    }

    /// With a display name for the acting user (used in flow logs)
    #[inline]
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// The opaque session token
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str {
        &self.session_token
    }

    /// The acting user, if named
    #[inline]
    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}
