//! Domain types, services, and ports.
//!
//! Purpose: define the strongly typed entities and use-cases of the
//! scheduling workflows, independent of HTTP and persistence. Inbound
//! adapters translate payloads into these types; outbound adapters implement
//! the ports under [`ports`].

pub mod account_service;
pub mod calendar;
pub mod dispatcher;
pub mod error;
pub mod friendship;
pub mod friendship_service;
pub mod hangout;
pub mod hangout_service;
pub mod login_service;
pub mod login_token;
pub mod note;
pub mod notification;
pub mod ports;
pub mod pup;
pub mod response;
pub mod suggestion;
pub mod suggestion_service;
pub mod upload;
pub mod user;

pub use self::account_service::{
    AccountService, CreatePupRequest, CreateUserRequest,
};
pub use self::dispatcher::{DispatchPolicy, NotificationDispatcher};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::friendship::PupFriendship;
pub use self::friendship_service::{CreateFriendshipRequest, FriendshipService};
pub use self::hangout::{Hangout, HangoutDraft, HangoutStatus, TimeWindow};
pub use self::hangout_service::{
    CreateHangoutRequest, HangoutService, HangoutServiceDeps, TransitionOutcome,
    resolve_acting_user,
};
pub use self::login_service::{IssueTokenRequest, IssuedToken, LoginService, RedeemedLogin};
pub use self::login_token::{LoginToken, TokenSecret};
pub use self::note::HangoutNote;
pub use self::notification::{
    DeliveryOutcome, DeliveryReport, HangoutEventKind, NotificationMessage, Recipient,
    TemplateVars,
};
pub use self::pup::{Pup, PupName};
pub use self::response::{HangoutResponse, ResponseAnswer};
pub use self::suggestion::{HangoutSuggestion, SuggestionStatus};
pub use self::suggestion_service::{
    ApprovalOutcome, CreateSuggestionRequest, SuggestionService, SuggestionServiceDeps,
};
pub use self::user::{
    ActingUser, DisplayName, PhoneNumber, User, UserDraft, UserId, UserRole, UserValidationError,
};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
