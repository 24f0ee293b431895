//! Login-token use-cases.
//!
//! Tokens are the application's entire authentication mechanism: a link
//! carrying a valid secret establishes the acting user for the session.
//! Validation is deliberately all-or-nothing: callers learn whether a
//! secret resolved, never why it did not.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::error::Error;
use crate::domain::login_token::{LoginToken, TokenSecret};
use crate::domain::ports::{
    Clock, LoginTokenPersistenceError, LoginTokenRepository, UserPersistenceError, UserRepository,
};
use crate::domain::user::UserId;

fn map_token_error(error: LoginTokenPersistenceError) -> Error {
    match error {
        LoginTokenPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("login token repository unavailable: {message}"))
        }
        LoginTokenPersistenceError::Query { message } => {
            Error::internal(format!("login token repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } | UserPersistenceError::Duplicate { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Shape of a token to issue.
#[derive(Debug, Clone)]
pub struct IssueTokenRequest {
    /// User the token will authenticate as.
    pub user_id: UserId,
    /// Optional post-login redirect destination.
    pub destination: Option<String>,
    /// Optional validity window from issue time.
    pub ttl: Option<Duration>,
    /// Whether the first redemption consumes the token.
    pub single_use: bool,
}

/// A freshly issued token: the secret leaves the service exactly once.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Raw secret to embed in the login link.
    pub secret: TokenSecret,
    /// The persisted record.
    pub token: LoginToken,
}

/// Result of redeeming a secret.
#[derive(Debug, Clone, PartialEq)]
pub struct RedeemedLogin {
    /// The authenticated user.
    pub user_id: UserId,
    /// Redirect destination carried by the token, if any.
    pub destination: Option<String>,
}

/// Domain service issuing and redeeming login tokens.
#[derive(Clone)]
pub struct LoginService {
    tokens: Arc<dyn LoginTokenRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl LoginService {
    /// Create the service over token and user persistence.
    pub fn new(
        tokens: Arc<dyn LoginTokenRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            users,
            clock,
        }
    }

    /// Issue a token for an existing user.
    pub async fn issue(&self, request: IssueTokenRequest) -> Result<IssuedToken, Error> {
        self.users
            .find_by_id(request.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user does not exist"))?;

        let secret = TokenSecret::generate();
        let now = self.clock.now();
        let token = LoginToken {
            digest: secret.digest(),
            user_id: request.user_id,
            destination: request.destination,
            issued_at: now,
            expires_at: request.ttl.map(|ttl| now + ttl),
            single_use: request.single_use,
            consumed_at: None,
        };
        self.tokens.insert(&token).await.map_err(map_token_error)?;
        Ok(IssuedToken { secret, token })
    }

    /// Redeem a raw secret. Yields the login or `None`; no detail about why
    /// a secret did not resolve is surfaced.
    pub async fn redeem(&self, raw_secret: &str) -> Result<Option<RedeemedLogin>, Error> {
        let secret = TokenSecret::from_raw(raw_secret);
        let redeemed = self
            .tokens
            .redeem(&secret.digest(), self.clock.now())
            .await
            .map_err(map_token_error)?;
        Ok(redeemed.map(|token| RedeemedLogin {
            user_id: token.user_id,
            destination: token.destination,
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::FixedClock;
    use crate::domain::user::{DisplayName, User, UserDraft, UserRole};
    use crate::outbound::memory::InMemoryStore;
    use chrono::{TimeZone, Utc};

    fn service_with_user() -> (LoginService, UserId, InMemoryStore) {
        let store = InMemoryStore::new();
        let user = User::new(UserDraft {
            id: UserId::random(),
            display_name: DisplayName::new("Sam").expect("valid name"),
            role: UserRole::Friend,
            phone_number: None,
            profile_photo_url: None,
            address_text: None,
        });
        let user_id = user.id();
        futures::executor::block_on(crate::domain::ports::UserRepository::create(&store, &user))
            .expect("create user");
        let clock = FixedClock(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single().expect("valid instant"),
        );
        let service = LoginService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(clock),
        );
        (service, user_id, store)
    }

    #[tokio::test]
    async fn issued_tokens_redeem_to_their_user() {
        let (service, user_id, _store) = service_with_user();
        let issued = service
            .issue(IssueTokenRequest {
                user_id,
                destination: Some("/hangouts/abc/respond".to_owned()),
                ttl: Some(Duration::hours(24)),
                single_use: false,
            })
            .await
            .expect("token issued");

        let login = service
            .redeem(issued.secret.reveal())
            .await
            .expect("redeem succeeds")
            .expect("token resolves");
        assert_eq!(login.user_id, user_id);
        assert_eq!(login.destination.as_deref(), Some("/hangouts/abc/respond"));
    }

    #[tokio::test]
    async fn unknown_secrets_resolve_to_none() {
        let (service, _user_id, _store) = service_with_user();
        let login = service
            .redeem("not-a-real-secret")
            .await
            .expect("redeem succeeds");
        assert!(login.is_none());
    }

    #[tokio::test]
    async fn single_use_tokens_stop_resolving_after_first_redeem() {
        let (service, user_id, _store) = service_with_user();
        let issued = service
            .issue(IssueTokenRequest {
                user_id,
                destination: None,
                ttl: None,
                single_use: true,
            })
            .await
            .expect("token issued");

        assert!(
            service
                .redeem(issued.secret.reveal())
                .await
                .expect("redeem succeeds")
                .is_some()
        );
        assert!(
            service
                .redeem(issued.secret.reveal())
                .await
                .expect("redeem succeeds")
                .is_none()
        );
    }

    #[tokio::test]
    async fn tokens_for_unknown_users_are_not_issued() {
        let (service, _user_id, _store) = service_with_user();
        let err = service
            .issue(IssueTokenRequest {
                user_id: UserId::random(),
                destination: None,
                ttl: None,
                single_use: true,
            })
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn repository_failures_surface_as_service_unavailable() {
        use crate::domain::ports::{MockLoginTokenRepository, MockUserRepository};

        let mut tokens = MockLoginTokenRepository::new();
        tokens
            .expect_redeem()
            .returning(|_, _| Err(LoginTokenPersistenceError::connection("db down")));
        let service = LoginService::new(
            Arc::new(tokens),
            Arc::new(MockUserRepository::new()),
            Arc::new(FixedClock(Utc::now())),
        );

        let err = service
            .redeem("whatever")
            .await
            .expect_err("connection failures surface");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn only_the_digest_is_persisted() {
        let (service, user_id, store) = service_with_user();
        let issued = service
            .issue(IssueTokenRequest {
                user_id,
                destination: None,
                ttl: None,
                single_use: false,
            })
            .await
            .expect("token issued");

        // Redeeming the digest itself must fail: the stored value is not the
        // secret.
        let login = service
            .redeem(&issued.token.digest)
            .await
            .expect("redeem succeeds");
        assert!(login.is_none());
        let _ = store;
    }
}
