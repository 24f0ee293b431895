//! Row types bridging Diesel and the domain.
//!
//! Each struct carries the domain-relevant columns of its table; columns
//! with database defaults (audit timestamps) are omitted from insert rows.
//! Conversions into domain types validate the stored strings so a corrupted
//! row surfaces as a query error instead of a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::friendship::PupFriendship;
use crate::domain::hangout::{Hangout, HangoutDraft, HangoutStatus, TimeWindow};
use crate::domain::login_token::LoginToken;
use crate::domain::note::HangoutNote;
use crate::domain::pup::{Pup, PupName};
use crate::domain::response::{HangoutResponse, ResponseAnswer};
use crate::domain::suggestion::{HangoutSuggestion, SuggestionStatus};
use crate::domain::user::{DisplayName, PhoneNumber, User, UserDraft, UserId, UserRole};

use super::schema::{
    hangout_notes, hangout_responses, hangout_suggestions, hangouts, login_tokens,
    pup_friendships, pups, users,
};

/// Error converting a stored row into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored row is not a valid {entity}: {message}")]
pub struct RowConversionError {
    /// Entity the row belongs to.
    pub entity: &'static str,
    /// Validation failure text.
    pub message: String,
}

impl RowConversionError {
    fn new(entity: &'static str, message: impl std::fmt::Display) -> Self {
        Self {
            entity,
            message: message.to_string(),
        }
    }
}

/// Row shape of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// `owner` or `friend`.
    pub role: String,
    /// Phone number, if recorded.
    pub phone_number: Option<String>,
    /// Profile photo location, if uploaded.
    pub profile_photo_url: Option<String>,
    /// Free-text address, if recorded.
    pub address_text: Option<String>,
}

impl UserRow {
    /// Build an insertable row from a domain user.
    pub fn from_domain(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref().to_owned(),
            role: user.role().as_str().to_owned(),
            phone_number: user.phone_number().map(|p| p.as_ref().to_owned()),
            profile_photo_url: user.profile_photo_url().map(str::to_owned),
            address_text: user.address_text().map(str::to_owned),
        }
    }

    /// Convert the row into a domain user.
    pub fn into_domain(self) -> Result<User, RowConversionError> {
        let role =
            UserRole::parse(&self.role).map_err(|err| RowConversionError::new("user", err))?;
        let display_name = DisplayName::new(self.display_name)
            .map_err(|err| RowConversionError::new("user", err))?;
        let phone_number = self
            .phone_number
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|err| RowConversionError::new("user", err))?;
        Ok(User::new(UserDraft {
            id: UserId::from_uuid(self.id),
            display_name,
            role,
            phone_number,
            profile_photo_url: self.profile_photo_url,
            address_text: self.address_text,
        }))
    }
}

/// Row shape of the `pups` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PupRow {
    /// Primary key.
    pub id: Uuid,
    /// The pup's name.
    pub name: String,
    /// Owning user.
    pub owner_user_id: Uuid,
    /// Care instructions, if recorded.
    pub care_instructions: Option<String>,
    /// Profile photo location, if uploaded.
    pub profile_photo_url: Option<String>,
}

impl PupRow {
    /// Build an insertable row from a domain pup.
    pub fn from_domain(pup: &Pup) -> Self {
        Self {
            id: pup.id(),
            name: pup.name().as_ref().to_owned(),
            owner_user_id: *pup.owner_user_id().as_uuid(),
            care_instructions: pup.care_instructions().map(str::to_owned),
            profile_photo_url: pup.profile_photo_url().map(str::to_owned),
        }
    }

    /// Convert the row into a domain pup.
    pub fn into_domain(self) -> Result<Pup, RowConversionError> {
        let name = PupName::new(self.name).map_err(|err| RowConversionError::new("pup", err))?;
        Ok(Pup::new(
            self.id,
            name,
            UserId::from_uuid(self.owner_user_id),
            self.care_instructions,
            self.profile_photo_url,
        ))
    }
}

/// Row shape of the `pup_friendships` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pup_friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FriendshipRow {
    /// Primary key.
    pub id: Uuid,
    /// The linked pup.
    pub pup_id: Uuid,
    /// The linked friend.
    pub friend_user_id: Uuid,
    /// History text, if recorded.
    pub history_with_pup: Option<String>,
}

impl FriendshipRow {
    /// Build an insertable row from a domain friendship.
    pub fn from_domain(friendship: &PupFriendship) -> Self {
        Self {
            id: friendship.id(),
            pup_id: friendship.pup_id(),
            friend_user_id: *friendship.friend_user_id().as_uuid(),
            history_with_pup: friendship.history_with_pup().map(str::to_owned),
        }
    }

    /// Convert the row into a domain friendship.
    pub fn into_domain(self) -> PupFriendship {
        PupFriendship::new(
            self.id,
            self.pup_id,
            UserId::from_uuid(self.friend_user_id),
            self.history_with_pup,
        )
    }
}

/// Row shape of the `hangouts` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = hangouts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HangoutRow {
    /// Primary key.
    pub id: Uuid,
    /// The pup the slot cares for.
    pub pup_id: Uuid,
    /// Window start.
    pub start_at: DateTime<Utc>,
    /// Window end.
    pub end_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: String,
    /// Attached friend while assigned.
    pub assigned_friend_user_id: Option<Uuid>,
    /// Owner who created the slot.
    pub created_by_owner_id: Uuid,
    /// Notes from the owner, if any.
    pub owner_notes: Option<String>,
    /// Custom event name, if any.
    pub event_name: Option<String>,
}

impl HangoutRow {
    /// Build an insertable row from a domain hangout.
    pub fn from_domain(hangout: &Hangout) -> Self {
        Self {
            id: hangout.id(),
            pup_id: hangout.pup_id(),
            start_at: hangout.window().start_at(),
            end_at: hangout.window().end_at(),
            status: hangout.status().as_str().to_owned(),
            assigned_friend_user_id: hangout.assigned_friend_user_id().map(|id| *id.as_uuid()),
            created_by_owner_id: *hangout.created_by_owner_id().as_uuid(),
            owner_notes: hangout.owner_notes().map(str::to_owned),
            event_name: hangout.event_name().map(str::to_owned),
        }
    }

    /// Convert the row into a domain hangout, revalidating the invariants.
    pub fn into_domain(self) -> Result<Hangout, RowConversionError> {
        let status = HangoutStatus::parse(&self.status)
            .map_err(|err| RowConversionError::new("hangout", err))?;
        let window = TimeWindow::new(self.start_at, self.end_at)
            .map_err(|err| RowConversionError::new("hangout", err))?;
        Hangout::new(HangoutDraft {
            id: self.id,
            pup_id: self.pup_id,
            window,
            status,
            assigned_friend_user_id: self.assigned_friend_user_id.map(UserId::from_uuid),
            created_by_owner_id: UserId::from_uuid(self.created_by_owner_id),
            owner_notes: self.owner_notes,
            event_name: self.event_name,
        })
        .map_err(|err| RowConversionError::new("hangout", err))
    }
}

/// Row shape of the `hangout_suggestions` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = hangout_suggestions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SuggestionRow {
    /// Primary key.
    pub id: Uuid,
    /// The pup the proposal is for.
    pub pup_id: Uuid,
    /// The proposing friend.
    pub suggested_by_friend_user_id: Uuid,
    /// Proposed window start.
    pub start_at: DateTime<Utc>,
    /// Proposed window end.
    pub end_at: DateTime<Utc>,
    /// Comment, if any.
    pub friend_comment: Option<String>,
    /// Decision state.
    pub status: String,
}

impl SuggestionRow {
    /// Build an insertable row from a domain suggestion.
    pub fn from_domain(suggestion: &HangoutSuggestion) -> Self {
        Self {
            id: suggestion.id(),
            pup_id: suggestion.pup_id(),
            suggested_by_friend_user_id: *suggestion.suggested_by_friend_user_id().as_uuid(),
            start_at: suggestion.window().start_at(),
            end_at: suggestion.window().end_at(),
            friend_comment: suggestion.friend_comment().map(str::to_owned),
            status: suggestion.status().as_str().to_owned(),
        }
    }

    /// Convert the row into a domain suggestion.
    pub fn into_domain(self) -> Result<HangoutSuggestion, RowConversionError> {
        let status = SuggestionStatus::parse(&self.status)
            .map_err(|err| RowConversionError::new("suggestion", err))?;
        let window = TimeWindow::new(self.start_at, self.end_at)
            .map_err(|err| RowConversionError::new("suggestion", err))?;
        Ok(HangoutSuggestion::from_parts(
            self.id,
            self.pup_id,
            UserId::from_uuid(self.suggested_by_friend_user_id),
            window,
            self.friend_comment,
            status,
        ))
    }
}

/// Row shape of the `hangout_responses` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = hangout_responses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ResponseRow {
    /// Primary key.
    pub id: Uuid,
    /// The hangout replied to.
    pub hangout_id: Uuid,
    /// The replying friend.
    pub responder_user_id: Uuid,
    /// `yes` or `no`.
    pub answer: String,
    /// When the latest reply was recorded.
    pub responded_at: DateTime<Utc>,
}

impl ResponseRow {
    /// Build an insertable row from a domain response.
    pub fn from_domain(response: &HangoutResponse) -> Self {
        Self {
            id: Uuid::new_v4(),
            hangout_id: response.hangout_id(),
            responder_user_id: *response.responder_user_id().as_uuid(),
            answer: response.answer().as_str().to_owned(),
            responded_at: response.responded_at(),
        }
    }

    /// Convert the row into a domain response.
    pub fn into_domain(self) -> Result<HangoutResponse, RowConversionError> {
        let answer = ResponseAnswer::parse(&self.answer)
            .map_err(|err| RowConversionError::new("response", err))?;
        Ok(HangoutResponse::new(
            self.hangout_id,
            UserId::from_uuid(self.responder_user_id),
            answer,
            self.responded_at,
        ))
    }
}

/// Row shape of the `hangout_notes` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = hangout_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NoteRow {
    /// Primary key.
    pub id: Uuid,
    /// The hangout the note belongs to.
    pub hangout_id: Uuid,
    /// Who wrote the note.
    pub author_user_id: Uuid,
    /// The note body.
    pub note_text: String,
    /// When the note was written.
    pub created_at: DateTime<Utc>,
}

impl NoteRow {
    /// Build an insertable row from a domain note.
    pub fn from_domain(note: &HangoutNote) -> Self {
        Self {
            id: note.id(),
            hangout_id: note.hangout_id(),
            author_user_id: *note.author_user_id().as_uuid(),
            note_text: note.note_text().to_owned(),
            created_at: note.created_at(),
        }
    }

    /// Convert the row into a domain note.
    pub fn into_domain(self) -> Result<HangoutNote, RowConversionError> {
        HangoutNote::new(
            self.id,
            self.hangout_id,
            UserId::from_uuid(self.author_user_id),
            self.note_text,
            self.created_at,
        )
        .map_err(|err| RowConversionError::new("note", err))
    }
}

/// Row shape of the `login_tokens` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = login_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LoginTokenRow {
    /// Primary key: digest of the secret.
    pub digest: String,
    /// The user the token authenticates as.
    pub user_id: Uuid,
    /// Redirect destination, if any.
    pub destination: Option<String>,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// Hard expiry, if time-bounded.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the first redemption consumes the token.
    pub single_use: bool,
    /// Last redemption time.
    pub consumed_at: Option<DateTime<Utc>>,
}

impl LoginTokenRow {
    /// Build an insertable row from a domain token.
    pub fn from_domain(token: &LoginToken) -> Self {
        Self {
            digest: token.digest.clone(),
            user_id: *token.user_id.as_uuid(),
            destination: token.destination.clone(),
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            single_use: token.single_use,
            consumed_at: token.consumed_at,
        }
    }

    /// Convert the row into a domain token.
    pub fn into_domain(self) -> LoginToken {
        LoginToken {
            digest: self.digest,
            user_id: UserId::from_uuid(self.user_id),
            destination: self.destination,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            single_use: self.single_use,
            consumed_at: self.consumed_at,
        }
    }
}
