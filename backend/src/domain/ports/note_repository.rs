//! Port for hangout note persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::note::HangoutNote;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by note repository adapters.
    pub enum NotePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "note repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "note repository query failed: {message}",
    }
}

/// Port for appending to and reading a hangout's note log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Append a note to the log.
    async fn append(&self, note: &HangoutNote) -> Result<(), NotePersistenceError>;

    /// Read one page of the log in creation order.
    async fn list_page(
        &self,
        hangout_id: Uuid,
        skip: u32,
        take: u32,
    ) -> Result<Vec<HangoutNote>, NotePersistenceError>;
}
