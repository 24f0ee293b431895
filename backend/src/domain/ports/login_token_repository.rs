//! Port for login token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::login_token::LoginToken;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by login token repository adapters.
    pub enum LoginTokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "login token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "login token repository query failed: {message}",
    }
}

/// Port for storing and redeeming login tokens.
///
/// Validation is deliberately shape-free: redeeming yields the token record
/// or nothing, with no detail about why a digest did not match, so callers
/// cannot probe which tokens exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginTokenRepository: Send + Sync {
    /// Persist a freshly issued token record.
    async fn insert(&self, token: &LoginToken) -> Result<(), LoginTokenPersistenceError>;

    /// Redeem the token with the given digest, if one is usable at `now`.
    ///
    /// Atomically marks single-use tokens consumed; a second redeem of a
    /// single-use token yields `None`.
    async fn redeem(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginToken>, LoginTokenPersistenceError>;
}
