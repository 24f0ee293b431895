//! Port for pup friendship persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::friendship::PupFriendship;
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by friendship repository adapters.
    pub enum FriendshipPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "friendship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "friendship repository query failed: {message}",
        /// The (pup, friend) pair already has a friendship row.
        DuplicatePair { message: String } =>
            "friendship already exists: {message}",
    }
}

/// Port for writing and reading pup friendships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Persist a new friendship. Fails with [`FriendshipPersistenceError::DuplicatePair`]
    /// when the (pup, friend) pair already exists.
    async fn create(&self, friendship: &PupFriendship) -> Result<(), FriendshipPersistenceError>;

    /// Find a friendship by id.
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError>;

    /// Find the friendship linking a pup and a friend, if any.
    async fn find_by_pup_and_friend(
        &self,
        pup_id: Uuid,
        friend_user_id: UserId,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError>;

    /// List all friendships of a pup.
    async fn list_by_pup(
        &self,
        pup_id: Uuid,
    ) -> Result<Vec<PupFriendship>, FriendshipPersistenceError>;

    /// Replace the free-text history of a friendship. Returns the updated
    /// row, or `None` when the friendship does not exist.
    async fn update_history(
        &self,
        id: Uuid,
        history_with_pup: Option<String>,
    ) -> Result<Option<PupFriendship>, FriendshipPersistenceError>;

    /// Delete a friendship. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, FriendshipPersistenceError>;
}
