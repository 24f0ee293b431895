//! Port for pup persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::pup::Pup;
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by pup repository adapters.
    pub enum PupPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "pup repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "pup repository query failed: {message}",
    }
}

/// Port for writing and reading pups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PupRepository: Send + Sync {
    /// Persist a new pup.
    async fn create(&self, pup: &Pup) -> Result<(), PupPersistenceError>;

    /// Find a pup by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pup>, PupPersistenceError>;

    /// List the pups owned by a user.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Pup>, PupPersistenceError>;
}
