//! Domain ports.
//!
//! In hexagonal terms these are the seams of the application: repositories
//! and senders the domain services drive without knowing the backing
//! infrastructure. Adapters live under `outbound/`; tests substitute
//! automocks or the in-memory adapters.

pub(crate) mod macros;

pub mod clock;
pub mod friendship_repository;
pub mod hangout_repository;
pub mod login_token_repository;
pub mod message_sender;
pub mod note_repository;
pub mod object_storage;
pub mod pup_repository;
pub mod response_repository;
pub mod suggestion_repository;
pub mod user_repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use friendship_repository::{FriendshipPersistenceError, FriendshipRepository};
pub use hangout_repository::{ConditionalWrite, HangoutPersistenceError, HangoutRepository};
pub use login_token_repository::{LoginTokenPersistenceError, LoginTokenRepository};
pub use message_sender::{
    DisabledEmailSender, DisabledWhatsAppSender, EmailSender, SendError, WhatsAppSender,
};
pub use note_repository::{NotePersistenceError, NoteRepository};
pub use object_storage::{ObjectStorage, StorageError, StoredObject};
pub use pup_repository::{PupPersistenceError, PupRepository};
pub use response_repository::{ResponsePersistenceError, ResponseRepository};
pub use suggestion_repository::{DecisionWrite, SuggestionPersistenceError, SuggestionRepository};
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
pub use friendship_repository::MockFriendshipRepository;
#[cfg(test)]
pub use hangout_repository::MockHangoutRepository;
#[cfg(test)]
pub use login_token_repository::MockLoginTokenRepository;
#[cfg(test)]
pub use message_sender::MockWhatsAppSender;
#[cfg(test)]
pub use note_repository::MockNoteRepository;
#[cfg(test)]
pub use pup_repository::MockPupRepository;
#[cfg(test)]
pub use response_repository::MockResponseRepository;
#[cfg(test)]
pub use suggestion_repository::MockSuggestionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
