//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without real
//! infrastructure.

use std::sync::Arc;

use crate::domain::ports::{EmailSender, ObjectStorage, UserRepository};
use crate::domain::{
    AccountService, FriendshipService, HangoutService, LoginService, SuggestionService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User/pup registration use-cases.
    pub accounts: AccountService,
    /// Friendship management use-cases.
    pub friendships: FriendshipService,
    /// Hangout lifecycle use-cases.
    pub hangouts: HangoutService,
    /// Suggestion workflow use-cases.
    pub suggestions: SuggestionService,
    /// Login-token use-cases.
    pub login: LoginService,
    /// User lookups for acting-user resolution.
    pub users: Arc<dyn UserRepository>,
    /// Contact-form mail delivery.
    pub mailer: Arc<dyn EmailSender>,
    /// Photo object storage.
    pub storage: Arc<dyn ObjectStorage>,
    /// Shared secret gating the admin endpoints, when configured.
    pub admin_token: Option<String>,
    /// Destination address for contact-form mail, when configured.
    pub contact_address: Option<String>,
}
