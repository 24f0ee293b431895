//! Port for hangout response persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::response::HangoutResponse;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by response repository adapters.
    pub enum ResponsePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "response repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "response repository query failed: {message}",
    }
}

/// Port for recording yes/no replies, keyed by (hangout, responder).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Insert or update the reply for (hangout, responder). Repeated calls
    /// replace the answer and timestamp; they never create a second row.
    async fn upsert(&self, response: &HangoutResponse) -> Result<(), ResponsePersistenceError>;

    /// List all replies to a hangout, oldest first.
    async fn list_by_hangout(
        &self,
        hangout_id: Uuid,
    ) -> Result<Vec<HangoutResponse>, ResponsePersistenceError>;
}
