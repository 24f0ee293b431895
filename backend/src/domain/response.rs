//! Hangout response data model.
//!
//! Records a friend's yes/no reply to an open invite. The reply is
//! independent of the assignment transition: saying yes does not attach the
//! friend to the hangout.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Validation errors returned by response constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseValidationError {
    /// The answer string named no known answer.
    UnknownAnswer {
        /// The rejected input value.
        value: String,
    },
}

impl fmt::Display for ResponseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAnswer { value } => {
                write!(f, "response must be yes or no, got {value}")
            }
        }
    }
}

impl std::error::Error for ResponseValidationError {}

/// A friend's yes/no answer to an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseAnswer {
    /// The friend can take the slot.
    Yes,
    /// The friend cannot take the slot.
    No,
}

impl ResponseAnswer {
    /// Stable lowercase representation used in storage and links.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Parse the stable lowercase representation.
    pub fn parse(value: &str) -> Result<Self, ResponseValidationError> {
        match value {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            other => Err(ResponseValidationError::UnknownAnswer {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ResponseAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded reply, unique per (`hangout_id`, `responder_user_id`).
///
/// Repeated replies update `answer` and `responded_at` in place rather than
/// creating further rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct HangoutResponse {
    hangout_id: Uuid,
    responder_user_id: UserId,
    answer: ResponseAnswer,
    responded_at: DateTime<Utc>,
}

impl HangoutResponse {
    /// Build a reply record.
    pub fn new(
        hangout_id: Uuid,
        responder_user_id: UserId,
        answer: ResponseAnswer,
        responded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            hangout_id,
            responder_user_id,
            answer,
            responded_at,
        }
    }

    /// The hangout replied to.
    pub const fn hangout_id(&self) -> Uuid {
        self.hangout_id
    }

    /// The replying friend.
    pub const fn responder_user_id(&self) -> UserId {
        self.responder_user_id
    }

    /// The recorded answer.
    pub const fn answer(&self) -> ResponseAnswer {
        self.answer
    }

    /// When the latest reply was recorded.
    pub const fn responded_at(&self) -> DateTime<Utc> {
        self.responded_at
    }
}
