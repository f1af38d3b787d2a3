use super::User;

/// The persisted authentication state: a bearer token and the user it belongs to.
///
/// Both halves are written together and cleared together. A session holding
/// only one of them never counts as signed in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// The signed-out session.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }

    /// True iff both a non-empty token and a user are present.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty()) && self.user.is_some()
    }

    /// Collapse a half-written session to the empty one.
    pub fn normalized(self) -> Self {
        if self.is_authenticated() {
            self
        } else {
            Self::empty()
        }
    }
}

/// Where the client should send the user on start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Welcome, login, signup and verification screens.
    Onboarding,
    /// The signed-in shell.
    Dashboard,
}

/// Authentication state derived from the session store.
///
/// Never cached: callers get a fresh value from
/// [`SessionContext::auth_state`](crate::SessionContext::auth_state).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl AuthState {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn route(&self) -> Route {
        if self.is_authenticated {
            Route::Dashboard
        } else {
            Route::Onboarding
        }
    }
}

impl From<Session> for AuthState {
    fn from(session: Session) -> Self {
        let is_authenticated = session.is_authenticated();
        Self {
            user: if is_authenticated { session.user } else { None },
            is_authenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
            email_verified: true,
            avatar: None,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_authenticated_requires_both_halves() {
        assert!(Session::new("abc", user()).is_authenticated());
        assert!(!Session::empty().is_authenticated());
        assert!(!Session::new("", user()).is_authenticated());

        let token_only = Session {
            token: Some("abc".to_string()),
            user: None,
        };
        assert!(!token_only.is_authenticated());
        assert!(token_only.normalized().is_empty());
    }

    #[test]
    fn test_route_follows_auth_state() {
        let state = AuthState::from(Session::new("abc", user()));
        assert_eq!(state.route(), Route::Dashboard);
        assert_eq!(state.user.map(|u| u.id), Some("u1".to_string()));

        let state = AuthState::from(Session {
            token: None,
            user: Some(user()),
        });
        assert_eq!(state.route(), Route::Onboarding);
        assert!(state.user.is_none());
    }
}
