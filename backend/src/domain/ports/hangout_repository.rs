//! Port for hangout persistence, including the conditional status writes
//! that make assignment race-safe.
//!
//! Two concurrent self-assigns for the same open hangout must not both
//! succeed, so the status-gated transitions are expressed as single
//! conditional writes at this port rather than read-then-write sequences in
//! the service layer. The losing racer observes the outcome variant and maps
//! it to a conflict.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::hangout::{Hangout, HangoutStatus};
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by hangout repository adapters.
    pub enum HangoutPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "hangout repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "hangout repository query failed: {message}",
    }
}

/// Outcome of a conditional status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalWrite {
    /// The condition held and the transition was persisted.
    Applied(Hangout),
    /// No hangout with the given id exists.
    Missing,
    /// The hangout exists but is not in the required status.
    StatusConflict {
        /// Status observed instead of the required one.
        current: HangoutStatus,
    },
    /// The hangout is assigned, but not to the acting friend.
    AssigneeMismatch,
}

/// Port for writing and reading hangouts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HangoutRepository: Send + Sync {
    /// Persist a new hangout.
    async fn create(&self, hangout: &Hangout) -> Result<(), HangoutPersistenceError>;

    /// Find a hangout by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hangout>, HangoutPersistenceError>;

    /// List the hangouts of a pup, most recent start first.
    async fn list_by_pup(&self, pup_id: Uuid) -> Result<Vec<Hangout>, HangoutPersistenceError>;

    /// Attach a friend iff the hangout is still open.
    ///
    /// Atomic with respect to concurrent callers: exactly one of two racing
    /// assigns observes [`ConditionalWrite::Applied`].
    async fn assign_if_open(
        &self,
        id: Uuid,
        friend: UserId,
    ) -> Result<ConditionalWrite, HangoutPersistenceError>;

    /// Clear the assignment iff the hangout is assigned to `friend`.
    async fn unassign_if_assigned_to(
        &self,
        id: Uuid,
        friend: UserId,
    ) -> Result<ConditionalWrite, HangoutPersistenceError>;
}
