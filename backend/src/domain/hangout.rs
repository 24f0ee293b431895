//! Hangout data model and status machine.
//!
//! A hangout is a scheduled care slot for a pup. Its lifecycle is
//! `open → assigned → open` (via unassignment), with `completed` and
//! `cancelled` as terminal states that no operation currently reaches.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Validation errors returned by hangout constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HangoutValidationError {
    /// The window ended before it started.
    WindowInverted,
    /// `assigned_friend_user_id` did not match the status: it must be
    /// present exactly when the status is `assigned`.
    AssigneeStatusMismatch,
    /// The status string named no known status.
    UnknownStatus {
        /// The rejected input value.
        value: String,
    },
}

impl fmt::Display for HangoutValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowInverted => write!(f, "hangout end must not precede its start"),
            Self::AssigneeStatusMismatch => write!(
                f,
                "assigned friend must be present exactly when status is assigned",
            ),
            Self::UnknownStatus { value } => {
                write!(f, "unknown hangout status: {value}")
            }
        }
    }
}

impl std::error::Error for HangoutValidationError {}

/// Inclusive start / exclusive end of a care slot.
///
/// ## Invariants
/// - `end >= start`.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use dogcal_backend::domain::TimeWindow;
///
/// let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
/// let window = TimeWindow::new(start, end).expect("valid window");
/// assert_eq!(window.start_at(), start);
/// assert!(TimeWindow::new(end, start).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct TimeWindow {
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
}

impl TimeWindow {
    /// Validate and construct a [`TimeWindow`].
    pub fn new(
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Self, HangoutValidationError> {
        if end_at < start_at {
            return Err(HangoutValidationError::WindowInverted);
        }
        Ok(Self { start_at, end_at })
    }

    /// Window start.
    pub const fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    /// Window end.
    pub const fn end_at(&self) -> DateTime<Utc> {
        self.end_at
    }
}

/// Lifecycle state of a hangout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangoutStatus {
    /// Created by an owner and waiting for a friend.
    Open,
    /// A qualifying friend is attached.
    Assigned,
    /// Terminal: the hangout took place.
    Completed,
    /// Terminal: the hangout was called off.
    Cancelled,
}

impl HangoutStatus {
    /// Stable lowercase representation used in storage and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the stable lowercase representation.
    pub fn parse(value: &str) -> Result<Self, HangoutValidationError> {
        match value {
            "open" => Ok(Self::Open),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(HangoutValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for HangoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field bundle for constructing a [`Hangout`].
#[derive(Debug, Clone)]
pub struct HangoutDraft {
    /// Stable identifier.
    pub id: Uuid,
    /// Pup this slot cares for.
    pub pup_id: Uuid,
    /// Care window.
    pub window: TimeWindow,
    /// Lifecycle state.
    pub status: HangoutStatus,
    /// Friend attached while status is `assigned`.
    pub assigned_friend_user_id: Option<UserId>,
    /// Owner who created the slot.
    pub created_by_owner_id: UserId,
    /// Optional notes from the owner.
    pub owner_notes: Option<String>,
    /// Optional custom name shown in calendars and messages.
    pub event_name: Option<String>,
}

/// A scheduled care slot for a pup.
///
/// ## Invariants
/// - `window.end >= window.start`.
/// - `assigned_friend_user_id` is non-null iff `status == assigned`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "HangoutDto", into = "HangoutDto")]
pub struct Hangout {
    id: Uuid,
    pup_id: Uuid,
    window: TimeWindow,
    status: HangoutStatus,
    assigned_friend_user_id: Option<UserId>,
    created_by_owner_id: UserId,
    owner_notes: Option<String>,
    event_name: Option<String>,
}

impl Hangout {
    /// Build a [`Hangout`], enforcing the assignee/status invariant.
    pub fn new(draft: HangoutDraft) -> Result<Self, HangoutValidationError> {
        let assigned = draft.status == HangoutStatus::Assigned;
        if assigned != draft.assigned_friend_user_id.is_some() {
            return Err(HangoutValidationError::AssigneeStatusMismatch);
        }
        let HangoutDraft {
            id,
            pup_id,
            window,
            status,
            assigned_friend_user_id,
            created_by_owner_id,
            owner_notes,
            event_name,
        } = draft;
        Ok(Self {
            id,
            pup_id,
            window,
            status,
            assigned_friend_user_id,
            created_by_owner_id,
            owner_notes,
            event_name,
        })
    }

    /// Build a freshly created open hangout.
    pub fn open(
        id: Uuid,
        pup_id: Uuid,
        window: TimeWindow,
        created_by_owner_id: UserId,
        owner_notes: Option<String>,
        event_name: Option<String>,
    ) -> Self {
        Self {
            id,
            pup_id,
            window,
            status: HangoutStatus::Open,
            assigned_friend_user_id: None,
            created_by_owner_id,
            owner_notes,
            event_name,
        }
    }

    /// Stable hangout identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Pup this slot cares for.
    pub const fn pup_id(&self) -> Uuid {
        self.pup_id
    }

    /// Care window.
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// Lifecycle state.
    pub const fn status(&self) -> HangoutStatus {
        self.status
    }

    /// Friend attached while status is `assigned`.
    pub const fn assigned_friend_user_id(&self) -> Option<UserId> {
        self.assigned_friend_user_id
    }

    /// Owner who created the slot.
    pub const fn created_by_owner_id(&self) -> UserId {
        self.created_by_owner_id
    }

    /// Optional notes from the owner.
    pub fn owner_notes(&self) -> Option<&str> {
        self.owner_notes.as_deref()
    }

    /// Optional custom name shown in calendars and messages.
    pub fn event_name(&self) -> Option<&str> {
        self.event_name.as_deref()
    }

    /// Copy of this hangout with the friend attached and status `assigned`.
    pub fn assigned_to(&self, friend: UserId) -> Self {
        let mut next = self.clone();
        next.status = HangoutStatus::Assigned;
        next.assigned_friend_user_id = Some(friend);
        next
    }

    /// Copy of this hangout with the assignment cleared and status `open`.
    pub fn unassigned(&self) -> Self {
        let mut next = self.clone();
        next.status = HangoutStatus::Open;
        next.assigned_friend_user_id = None;
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HangoutDto {
    id: Uuid,
    pup_id: Uuid,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    status: HangoutStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_friend_user_id: Option<UserId>,
    created_by_owner_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_name: Option<String>,
}

impl From<Hangout> for HangoutDto {
    fn from(value: Hangout) -> Self {
        Self {
            id: value.id,
            pup_id: value.pup_id,
            start_at: value.window.start_at(),
            end_at: value.window.end_at(),
            status: value.status,
            assigned_friend_user_id: value.assigned_friend_user_id,
            created_by_owner_id: value.created_by_owner_id,
            owner_notes: value.owner_notes,
            event_name: value.event_name,
        }
    }
}

impl TryFrom<HangoutDto> for Hangout {
    type Error = HangoutValidationError;

    fn try_from(value: HangoutDto) -> Result<Self, Self::Error> {
        Hangout::new(HangoutDraft {
            id: value.id,
            pup_id: value.pup_id,
            window: TimeWindow::new(value.start_at, value.end_at)?,
            status: value.status,
            assigned_friend_user_id: value.assigned_friend_user_id,
            created_by_owner_id: value.created_by_owner_id,
            owner_notes: value.owner_notes,
            event_name: value.event_name,
        })
    }
}
