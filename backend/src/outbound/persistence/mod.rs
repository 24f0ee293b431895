//! PostgreSQL persistence adapters built on Diesel and `diesel-async`.

mod error_map;

pub mod diesel_friendship_repository;
pub mod diesel_hangout_repository;
pub mod diesel_login_token_repository;
pub mod diesel_note_repository;
pub mod diesel_pup_repository;
pub mod diesel_response_repository;
pub mod diesel_suggestion_repository;
pub mod diesel_user_repository;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_friendship_repository::DieselFriendshipRepository;
pub use diesel_hangout_repository::DieselHangoutRepository;
pub use diesel_login_token_repository::DieselLoginTokenRepository;
pub use diesel_note_repository::DieselNoteRepository;
pub use diesel_pup_repository::DieselPupRepository;
pub use diesel_response_repository::DieselResponseRepository;
pub use diesel_suggestion_repository::DieselSuggestionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
