use serde::{Deserialize, Serialize};

use crate::UserId;

/// User information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Session bootstrap progress for one client.
///
/// A client without a known user first moves to `SessionPending` while the
/// session is created, then settles on `Authenticated` or `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "user", rename_all = "snake_case")]
pub enum SessionState {
    /// No session lookup has been attempted.
    #[default]
    Unauthenticated,
    /// Session creation is in flight.
    SessionPending,
    /// Session resolved to a known user.
    Authenticated(UserIdentity),
    /// Session resolved without a user.
    Anonymous,
}

impl SessionState {
    /// Starts session creation. Settled states are left untouched.
    #[must_use]
    pub fn begin(self) -> Self {
        match self {
            Self::Unauthenticated => Self::SessionPending,
            other => other,
        }
    }

    /// Settles a pending session with the lookup outcome.
    ///
    /// Resolving an unauthenticated state implies `begin`.
    #[must_use]
    pub fn resolve(self, identity: Option<UserIdentity>) -> Self {
        match self {
            Self::Unauthenticated | Self::SessionPending => match identity {
                Some(identity) => Self::Authenticated(identity),
                None => Self::Anonymous,
            },
            other => other,
        }
    }

    /// Returns the identity only for authenticated sessions.
    #[must_use]
    pub fn identity(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Returns a stable label for logs and transport.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::SessionPending => "session_pending",
            Self::Authenticated(_) => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionState, UserIdentity};
    use crate::UserId;

    fn identity() -> UserIdentity {
        UserIdentity::new(UserId::new(), "Ada", Some("ada@example.org".to_owned()))
    }

    #[test]
    fn pending_session_resolves_to_authenticated() {
        let user = identity();
        let state = SessionState::default().begin().resolve(Some(user.clone()));
        assert_eq!(state.identity(), Some(&user));
    }

    #[test]
    fn pending_session_without_user_becomes_anonymous() {
        let state = SessionState::default().begin().resolve(None);
        assert_eq!(state, SessionState::Anonymous);
        assert!(state.identity().is_none());
    }

    #[test]
    fn settled_sessions_ignore_later_transitions() {
        let user = identity();
        let authenticated = SessionState::Authenticated(user.clone());
        assert_eq!(
            authenticated.clone().resolve(None),
            SessionState::Authenticated(user)
        );
        assert_eq!(SessionState::Anonymous.begin(), SessionState::Anonymous);
    }

    #[test]
    fn pending_session_has_no_identity() {
        assert!(SessionState::SessionPending.identity().is_none());
        assert_eq!(SessionState::SessionPending.as_str(), "session_pending");
    }
}
