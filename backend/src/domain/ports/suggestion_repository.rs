//! Port for hangout suggestion persistence.
//!
//! The owner decision is a conditional write: the first decision on a
//! pending suggestion wins and later decisions observe
//! [`DecisionWrite::AlreadyDecided`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::suggestion::{HangoutSuggestion, SuggestionStatus};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by suggestion repository adapters.
    pub enum SuggestionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "suggestion repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "suggestion repository query failed: {message}",
    }
}

/// Outcome of a conditional decision write.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionWrite {
    /// The suggestion was pending and now carries the decision.
    Applied(HangoutSuggestion),
    /// No suggestion with the given id exists.
    Missing,
    /// A decision had already been recorded.
    AlreadyDecided {
        /// The decision that was already in place.
        current: SuggestionStatus,
    },
}

/// Port for writing and reading hangout suggestions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuggestionRepository: Send + Sync {
    /// Persist a new pending suggestion.
    async fn create(&self, suggestion: &HangoutSuggestion)
    -> Result<(), SuggestionPersistenceError>;

    /// Find a suggestion by id.
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<HangoutSuggestion>, SuggestionPersistenceError>;

    /// List the pending suggestions for a pup, oldest first.
    async fn list_pending_by_pup(
        &self,
        pup_id: Uuid,
    ) -> Result<Vec<HangoutSuggestion>, SuggestionPersistenceError>;

    /// Record a decision iff the suggestion is still pending.
    async fn decide_if_pending(
        &self,
        id: Uuid,
        decision: SuggestionStatus,
    ) -> Result<DecisionWrite, SuggestionPersistenceError>;
}
