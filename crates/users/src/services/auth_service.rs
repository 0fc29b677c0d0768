//! Authentication service: signup, code redemption, token checks.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use reviewdeck_config::{AuthConfig, LimitsConfig};
use reviewdeck_database::{CreateUserRequest, User, UserRepository};

use crate::services::notification_service::Notifier;
use crate::types::{AuthError, AuthResult};
use crate::utils::confirmation::CodeIssuer;
use crate::utils::jwt::TokenManager;
use crate::utils::validation::validate_signup;

pub const CONFIRMATION_SUBJECT: &str = "Your confirmation code";

/// What signup echoes back; the code itself travels only through the
/// notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupReceipt {
    pub username: String,
    pub email: String,
}

/// Service coordinating the passwordless signup flow: issue a confirmation
/// code to an email address, exchange it once for an access token, and
/// resolve tokens back to fresh user rows.
pub struct Authenticator {
    users: UserRepository,
    codes: CodeIssuer,
    tokens: TokenManager,
    notifier: Arc<dyn Notifier>,
    limits: LimitsConfig,
}

impl Authenticator {
    pub fn new(
        pool: SqlitePool,
        auth: &AuthConfig,
        limits: &LimitsConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            users: UserRepository::new(pool),
            codes: CodeIssuer::new(&auth.secret, auth.confirmation_ttl_seconds),
            tokens: TokenManager::new(&auth.secret, auth.token_ttl_seconds),
            notifier,
            limits: limits.clone(),
        }
    }

    /// Register (or re-recognize) a user and send them a confirmation code.
    ///
    /// An exact (username, email) match is an existing registrant asking for
    /// a fresh code, not a conflict. A partial match means the username or
    /// the email is taken by someone else.
    pub async fn signup(&self, username: &str, email: &str) -> AuthResult<SignupReceipt> {
        validate_signup(username, email, &self.limits)?;

        let user = match self.users.find_by_pair(username, email).await? {
            Some(user) => user,
            None => {
                let user = self
                    .users
                    .create(&CreateUserRequest {
                        username: username.to_string(),
                        email: email.to_string(),
                        first_name: String::new(),
                        last_name: String::new(),
                        bio: None,
                        role: None,
                    })
                    .await?;
                info!(username, "registered new user");
                user
            }
        };

        let code = self.codes.issue(&user);
        let body = format!(
            "Hello {},\n\nYour confirmation code is:\n\n{}\n",
            user.username, code
        );
        self.notifier
            .send(&user.email, CONFIRMATION_SUBJECT, &body)
            .map_err(|e| AuthError::DeliveryFailed(e.0))?;

        Ok(SignupReceipt {
            username: user.username,
            email: user.email,
        })
    }

    /// Exchange a confirmation code for an access token.
    ///
    /// Redemption rotates the user's confirmation seed with a
    /// compare-and-swap, so a code works exactly once even under
    /// concurrent attempts.
    pub async fn redeem(&self, username: &str, code: &str) -> AuthResult<String> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.codes.verify(&user, code) {
            return Err(AuthError::InvalidCode);
        }

        if !self
            .users
            .rotate_confirmation_seed(user.id, &user.confirmation_seed)
            .await?
        {
            return Err(AuthError::InvalidCode);
        }

        info!(username, "confirmation code redeemed");
        self.tokens.issue(&user)
    }

    /// Resolve a bearer token to the current user row. The row is re-read
    /// on every call so role changes apply to in-flight tokens.
    pub async fn authenticate(&self, token: &str) -> AuthResult<User> {
        let claims = self.tokens.decode(token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("malformed subject".to_string()))?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("unknown subject".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notification_service::DeliveryError;
    use reviewdeck_config::DatabaseConfig;
    use reviewdeck_database::initialize_database;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingNotifier {
        fn last_code(&self) -> String {
            let messages = self.messages.lock().unwrap();
            let (_, _, body) = messages.last().expect("no message sent");
            body.lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .expect("empty body")
                .trim()
                .to_string()
        }
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
            self.messages
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, _: &str, _: &str, _: &str) -> Result<(), DeliveryError> {
            Err(DeliveryError("smtp unreachable".to_string()))
        }
    }

    async fn setup(notifier: Arc<dyn Notifier>) -> Authenticator {
        let pool = initialize_database(&DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();

        Authenticator::new(
            pool,
            &AuthConfig::default(),
            &LimitsConfig::default(),
            notifier,
        )
    }

    #[tokio::test]
    async fn signup_then_redeem_yields_token() {
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = setup(notifier.clone()).await;

        let receipt = auth.signup("alice", "alice@example.com").await.unwrap();
        assert_eq!(receipt.username, "alice");

        {
            let messages = notifier.messages.lock().unwrap();
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].0, "alice@example.com");
            assert_eq!(messages[0].1, CONFIRMATION_SUBJECT);
        }

        let token = auth.redeem("alice", &notifier.last_code()).await.unwrap();
        let user = auth.authenticate(&token).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn codes_are_single_use() {
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = setup(notifier.clone()).await;

        auth.signup("alice", "alice@example.com").await.unwrap();
        let code = notifier.last_code();

        auth.redeem("alice", &code).await.unwrap();
        let err = auth.redeem("alice", &code).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
    }

    #[tokio::test]
    async fn resignup_reissues_without_conflict() {
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = setup(notifier.clone()).await;

        auth.signup("alice", "alice@example.com").await.unwrap();
        let first_code = notifier.last_code();
        auth.signup("alice", "alice@example.com").await.unwrap();
        let second_code = notifier.last_code();

        // Both codes stay valid until one is redeemed.
        auth.redeem("alice", &first_code).await.unwrap();
        let err = auth.redeem("alice", &second_code).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
    }

    #[tokio::test]
    async fn partial_pair_match_is_a_conflict() {
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = setup(notifier).await;

        auth.signup("alice", "alice@example.com").await.unwrap();

        let err = auth
            .signup("alice", "other@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        let err = auth.signup("bob", "alice@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn redeem_for_unknown_user_is_not_found() {
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = setup(notifier).await;

        let err = auth.redeem("ghost", "whatever").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn wrong_code_is_rejected() {
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = setup(notifier).await;

        auth.signup("alice", "alice@example.com").await.unwrap();
        let err = auth.redeem("alice", "deadbeef.AAAA").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
    }

    #[tokio::test]
    async fn delivery_failure_surfaces() {
        let auth = setup(Arc::new(FailingNotifier)).await;

        let err = auth.signup("alice", "alice@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::DeliveryFailed(_)));
    }

    #[tokio::test]
    async fn invalid_signup_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = setup(notifier.clone()).await;

        let err = auth.signup("me", "not-an-email").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(notifier.messages.lock().unwrap().is_empty());
    }
}
