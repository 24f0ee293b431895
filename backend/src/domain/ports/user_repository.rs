//! Port for user persistence.

use async_trait::async_trait;

use crate::domain::user::{User, UserId};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// A user with the same id already exists.
        Duplicate { message: String } =>
            "user already exists: {message}",
    }
}

/// Port for writing and reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;
}
