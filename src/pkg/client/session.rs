use crate::pkg::{
    client::api::AuthApi,
    internal::auth::User,
};

#[derive(Debug, Clone, Copy)]
pub enum Access {
    SignedIn,
    Employer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
}

/// Explicit session state passed to the views that need it, instead of an
/// ambient global. Init validates a persisted token before trusting it;
/// teardown clears local state whether or not the server cooperates.
#[derive(Debug, Default)]
pub struct SessionContext {
    token: Option<String>,
    user: Option<User>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        SessionContext::default()
    }

    /// Builds a context from a token the app persisted earlier. The token
    /// is checked against the session endpoint; a stale or garbage token
    /// yields an anonymous context, never an error.
    pub async fn init<A: AuthApi>(api: &A, persisted_token: Option<String>) -> Self {
        let Some(token) = persisted_token.filter(|t| !t.is_empty()) else {
            return Self::anonymous();
        };
        match api.me(&token).await {
            Ok(user) => SessionContext {
                token: Some(token),
                user: Some(user),
            },
            Err(e) => {
                tracing::warn!("persisted token rejected: {}", e);
                Self::anonymous()
            }
        }
    }

    /// For a freshly issued token, e.g. straight after login.
    pub fn establish(token: String, user: User) -> Self {
        SessionContext {
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn gate(&self, access: Access) -> GateDecision {
        let allowed = match access {
            Access::SignedIn => self.user.is_some(),
            Access::Employer => self.user.as_ref().map(User::is_employer).unwrap_or(false),
        };
        if allowed {
            GateDecision::Allow
        } else {
            GateDecision::RedirectToLogin
        }
    }

    /// Calls the termination endpoint, then forgets the token and user no
    /// matter what the server answered.
    pub async fn logout<A: AuthApi>(&mut self, api: &A) {
        if let Some(token) = self.token.take() {
            if let Err(e) = api.logout(&token).await {
                tracing::warn!("logout call failed, clearing local session anyway: {}", e);
            }
        }
        self.user = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::auth::Role;
    use crate::prelude::{Error, Result};

    struct FakeAuth {
        user: Option<User>,
        fail_logout: bool,
        logout_calls: AtomicUsize,
    }

    impl FakeAuth {
        fn for_user(user: User) -> Self {
            FakeAuth {
                user: Some(user),
                fail_logout: false,
                logout_calls: AtomicUsize::new(0),
            }
        }

        fn rejecting() -> Self {
            FakeAuth {
                user: None,
                fail_logout: true,
                logout_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn me(&self, token: &str) -> Result<User> {
            match (&self.user, token) {
                (Some(user), "valid-token") => Ok(user.clone()),
                _ => Err(Error::Unauthorized),
            }
        }

        async fn logout(&self, _token: &str) -> Result<()> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_logout {
                Err(Error::Api {
                    status: 500,
                    code: "ERR-DB-000".into(),
                    message: "database error".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn employer() -> User {
        User {
            user_id: "u-employer".into(),
            name: "Erin".into(),
            email: "erin@acme.test".into(),
            role: Role::Employer,
        }
    }

    fn jobseeker() -> User {
        User {
            user_id: "u-seeker".into(),
            name: "Sam".into(),
            email: "sam@mail.test".into(),
            role: Role::Jobseeker,
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn test_init_with_valid_token_populates_user() {
        let api = FakeAuth::for_user(employer());
        let session = SessionContext::init(&api, Some("valid-token".into())).await;
        assert_eq!(session.token(), Some("valid-token"));
        assert!(session.user().is_some());
        assert_eq!(session.gate(Access::Employer), GateDecision::Allow);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_init_with_stale_token_is_anonymous() {
        let api = FakeAuth::for_user(employer());
        let session = SessionContext::init(&api, Some("stale-token".into())).await;
        assert!(session.token().is_none());
        assert!(session.user().is_none());
        assert_eq!(session.gate(Access::SignedIn), GateDecision::RedirectToLogin);
    }

    #[tokio::test]
    async fn test_init_without_token_is_anonymous() {
        let api = FakeAuth::for_user(employer());
        let session = SessionContext::init(&api, None).await;
        assert!(session.user().is_none());
        let session = SessionContext::init(&api, Some(String::new())).await;
        assert!(session.user().is_none());
    }

    #[test]
    fn test_employer_gate_is_role_exact() {
        let employer_session = SessionContext::establish("t".into(), employer());
        assert_eq!(employer_session.gate(Access::Employer), GateDecision::Allow);
        assert_eq!(employer_session.gate(Access::SignedIn), GateDecision::Allow);

        let seeker_session = SessionContext::establish("t".into(), jobseeker());
        assert_eq!(
            seeker_session.gate(Access::Employer),
            GateDecision::RedirectToLogin
        );
        assert_eq!(seeker_session.gate(Access::SignedIn), GateDecision::Allow);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_logout_clears_state_even_when_server_fails() {
        let api = FakeAuth::rejecting();
        let mut session = SessionContext::establish("valid-token".into(), employer());
        session.logout(&api).await;
        assert!(session.token().is_none());
        assert!(session.user().is_none());
        assert_eq!(api.logout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_anonymous_logout_skips_server_call() {
        let api = FakeAuth::rejecting();
        let mut session = SessionContext::anonymous();
        session.logout(&api).await;
        assert_eq!(api.logout_calls.load(Ordering::SeqCst), 0);
    }
}
