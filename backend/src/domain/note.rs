//! Hangout note data model.
//!
//! Notes form an ordered log on a hangout, attachable by the pup's owner or
//! the assigned friend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Validation errors returned by note constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// The note text was missing or blank once trimmed.
    EmptyText,
    /// The note text exceeded the maximum length.
    TextTooLong {
        /// Maximum number of characters allowed.
        max: usize,
    },
}

impl fmt::Display for NoteValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text must not be empty"),
            Self::TextTooLong { max } => {
                write!(f, "note text must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for NoteValidationError {}

/// Maximum allowed length for a note body.
pub const NOTE_TEXT_MAX: usize = 2000;

/// One entry in a hangout's note log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct HangoutNote {
    id: Uuid,
    hangout_id: Uuid,
    author_user_id: UserId,
    note_text: String,
    created_at: DateTime<Utc>,
}

impl HangoutNote {
    /// Validate and build a note entry.
    pub fn new(
        id: Uuid,
        hangout_id: Uuid,
        author_user_id: UserId,
        note_text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        let note_text = note_text.into();
        let trimmed = note_text.trim();
        if trimmed.is_empty() {
            return Err(NoteValidationError::EmptyText);
        }
        if trimmed.chars().count() > NOTE_TEXT_MAX {
            return Err(NoteValidationError::TextTooLong { max: NOTE_TEXT_MAX });
        }
        Ok(Self {
            id,
            hangout_id,
            author_user_id,
            note_text: trimmed.to_owned(),
            created_at,
        })
    }

    /// Stable note identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The hangout this note belongs to.
    pub const fn hangout_id(&self) -> Uuid {
        self.hangout_id
    }

    /// Who wrote the note.
    pub const fn author_user_id(&self) -> UserId {
        self.author_user_id
    }

    /// The note body.
    pub fn note_text(&self) -> &str {
        self.note_text.as_str()
    }

    /// When the note was written.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
