//! Hangout suggestion data model.
//!
//! A suggestion is a friend-proposed hangout time awaiting an owner
//! decision. It terminates at `approved` or `rejected` and is never
//! revisited afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::hangout::TimeWindow;
use crate::domain::user::UserId;

/// Validation errors returned by suggestion constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionValidationError {
    /// The status string named no known status.
    UnknownStatus {
        /// The rejected input value.
        value: String,
    },
}

impl fmt::Display for SuggestionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStatus { value } => {
                write!(f, "unknown suggestion status: {value}")
            }
        }
    }
}

impl std::error::Error for SuggestionValidationError {}

/// Decision state of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    /// Submitted and awaiting an owner decision.
    Pending,
    /// Accepted; a hangout was materialised.
    Approved,
    /// Declined; no hangout exists for it.
    Rejected,
}

impl SuggestionStatus {
    /// Stable lowercase representation used in storage and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the stable lowercase representation.
    pub fn parse(value: &str) -> Result<Self, SuggestionValidationError> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(SuggestionValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A friend-proposed hangout time awaiting owner approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HangoutSuggestion {
    id: Uuid,
    pup_id: Uuid,
    suggested_by_friend_user_id: UserId,
    #[serde(flatten)]
    window: TimeWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    friend_comment: Option<String>,
    status: SuggestionStatus,
}

impl HangoutSuggestion {
    /// Build a suggestion in its initial pending state.
    pub fn pending(
        id: Uuid,
        pup_id: Uuid,
        suggested_by_friend_user_id: UserId,
        window: TimeWindow,
        friend_comment: Option<String>,
    ) -> Self {
        Self {
            id,
            pup_id,
            suggested_by_friend_user_id,
            window,
            friend_comment,
            status: SuggestionStatus::Pending,
        }
    }

    /// Rehydrate a suggestion from storage.
    pub fn from_parts(
        id: Uuid,
        pup_id: Uuid,
        suggested_by_friend_user_id: UserId,
        window: TimeWindow,
        friend_comment: Option<String>,
        status: SuggestionStatus,
    ) -> Self {
        Self {
            id,
            pup_id,
            suggested_by_friend_user_id,
            window,
            friend_comment,
            status,
        }
    }

    /// Stable suggestion identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Pup the proposal is for.
    pub const fn pup_id(&self) -> Uuid {
        self.pup_id
    }

    /// The proposing friend.
    pub const fn suggested_by_friend_user_id(&self) -> UserId {
        self.suggested_by_friend_user_id
    }

    /// Proposed care window.
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// Optional comment from the proposing friend.
    pub fn friend_comment(&self) -> Option<&str> {
        self.friend_comment.as_deref()
    }

    /// Decision state.
    pub const fn status(&self) -> SuggestionStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn window() -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).single().expect("valid start");
        let end = Utc.with_ymd_and_hms(2024, 6, 2, 11, 0, 0).single().expect("valid end");
        TimeWindow::new(start, end).expect("valid window")
    }

    #[rstest]
    #[case("pending", SuggestionStatus::Pending)]
    #[case("approved", SuggestionStatus::Approved)]
    #[case("rejected", SuggestionStatus::Rejected)]
    fn statuses_round_trip(#[case] raw: &str, #[case] expected: SuggestionStatus) {
        let status = SuggestionStatus::parse(raw).expect("known status");
        assert_eq!(status, expected);
        assert_eq!(status.as_str(), raw);
    }

    #[test]
    fn unknown_statuses_are_rejected() {
        let err = SuggestionStatus::parse("maybe").expect_err("unknown status");
        assert!(matches!(err, SuggestionValidationError::UnknownStatus { .. }));
    }

    #[test]
    fn new_suggestions_start_pending() {
        let suggestion = HangoutSuggestion::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserId::random(),
            window(),
            Some("Saturday works better for me".to_owned()),
        );
        assert_eq!(suggestion.status(), SuggestionStatus::Pending);
        assert_eq!(
            suggestion.friend_comment(),
            Some("Saturday works better for me")
        );
    }

    #[test]
    fn suggestion_serialises_with_flattened_window() {
        let suggestion = HangoutSuggestion::pending(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserId::random(),
            window(),
            None,
        );
        let value = serde_json::to_value(&suggestion).expect("suggestion serialises");
        assert_eq!(value["status"], "pending");
        assert!(value.get("startAt").is_some());
        assert!(value.get("endAt").is_some());
    }
}
