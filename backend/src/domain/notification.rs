//! Notification formatting and delivery outcome types.
//!
//! The dispatcher is pure formatting plus best-effort delivery: it never
//! fails the operation that triggered it. Outcomes distinguish a
//! data-quality problem (`skipped`, for example a missing or invalid phone
//! number) from a delivery failure (`failed`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::hangout::TimeWindow;
use crate::domain::user::{PhoneNumber, User, UserId};

/// Lifecycle event a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangoutEventKind {
    /// A friend attached themselves to an open slot.
    Assigned,
    /// The assigned friend stepped back; the slot is open again.
    Unassigned,
    /// The recipient was chosen for the slot.
    Confirmed,
    /// The slot was filled by someone else.
    Closed,
}

impl HangoutEventKind {
    /// Stable lowercase representation used in logs and provider templates.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::Confirmed => "confirmed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for HangoutEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variables substituted into message bodies and provider templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateVars {
    /// Display name of the pup's owner.
    pub owner_name: String,
    /// Display name of the friend the event concerns.
    pub friend_name: String,
    /// Name of the pup.
    pub pup_name: String,
    /// Care window of the hangout.
    pub window: TimeWindow,
    /// Optional custom event name chosen by the owner.
    pub event_name: Option<String>,
}

impl TemplateVars {
    /// Human-readable rendering of the care window.
    pub fn window_text(&self) -> String {
        format!(
            "{} to {} UTC",
            self.window.start_at().format("%Y-%m-%d %H:%M"),
            self.window.end_at().format("%H:%M"),
        )
    }

    /// The slot's display label: custom event name or the pup's name.
    pub fn slot_label(&self) -> &str {
        self.event_name.as_deref().unwrap_or(self.pup_name.as_str())
    }
}

/// A formatted outbound message ready for a sender adapter.
///
/// Adapters decide the wire shape: a templated provider send uses `kind` and
/// `vars`, a freeform send uses the pre-rendered `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    /// Event the message announces.
    pub kind: HangoutEventKind,
    /// Freeform rendering of the event.
    pub body: String,
    /// Variables for template-based channels.
    pub vars: TemplateVars,
}

impl NotificationMessage {
    /// Render the freeform body for an event.
    pub fn render(kind: HangoutEventKind, vars: TemplateVars) -> Self {
        let window = vars.window_text();
        let body = match kind {
            HangoutEventKind::Assigned => format!(
                "{} signed up to hang out with {} ({window}).",
                vars.friend_name, vars.pup_name,
            ),
            HangoutEventKind::Unassigned => format!(
                "{} can no longer make the hangout with {} ({window}). The slot is open again.",
                vars.friend_name, vars.pup_name,
            ),
            HangoutEventKind::Confirmed => format!(
                "You're confirmed for {} ({window}). {} will share the details.",
                vars.slot_label(),
                vars.owner_name,
            ),
            HangoutEventKind::Closed => format!(
                "The hangout with {} ({window}) has been filled. Thanks for offering!",
                vars.pup_name,
            ),
        };
        Self { kind, body, vars }
    }
}

/// Per-recipient delivery outcome, returned to callers as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "status", content = "reason")]
pub enum DeliveryOutcome {
    /// The provider accepted the message.
    Sent,
    /// Delivery was not attempted; the reason names a data-quality or
    /// configuration gap, not a provider fault.
    Skipped(String),
    /// Delivery was attempted and failed after retries.
    Failed(String),
}

/// Delivery outcome for one recipient of a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// The user the message was addressed to.
    pub recipient_user_id: UserId,
    /// Display name at dispatch time, for log readability.
    pub recipient_name: String,
    /// What happened.
    pub outcome: DeliveryOutcome,
}

/// Addressing details for one notification recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    /// The user to notify.
    pub user_id: UserId,
    /// Display name used in reports.
    pub display_name: String,
    /// Phone number, if the user recorded one.
    pub phone_number: Option<PhoneNumber>,
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id(),
            display_name: user.display_name().as_ref().to_owned(),
            phone_number: user.phone_number().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn vars(event_name: Option<&str>) -> TemplateVars {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).single().expect("valid start");
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid end");
        TemplateVars {
            owner_name: "Edi".to_owned(),
            friend_name: "Sam".to_owned(),
            pup_name: "Fido".to_owned(),
            window: TimeWindow::new(start, end).expect("valid window"),
            event_name: event_name.map(str::to_owned),
        }
    }

    #[test]
    fn window_text_is_compact_utc() {
        assert_eq!(vars(None).window_text(), "2024-06-01 10:00 to 12:00 UTC");
    }

    #[rstest]
    #[case(HangoutEventKind::Assigned, "Sam signed up")]
    #[case(HangoutEventKind::Unassigned, "open again")]
    #[case(HangoutEventKind::Confirmed, "You're confirmed")]
    #[case(HangoutEventKind::Closed, "has been filled")]
    fn bodies_mention_the_event(#[case] kind: HangoutEventKind, #[case] needle: &str) {
        let message = NotificationMessage::render(kind, vars(None));
        assert!(
            message.body.contains(needle),
            "body {:?} should contain {needle:?}",
            message.body
        );
    }

    #[test]
    fn confirmed_body_prefers_the_event_name() {
        let message =
            NotificationMessage::render(HangoutEventKind::Confirmed, vars(Some("Fido's birthday")));
        assert!(message.body.contains("Fido's birthday"));
    }

    #[test]
    fn outcomes_serialise_with_status_tag() {
        let sent = serde_json::to_value(DeliveryOutcome::Sent).expect("serialise");
        assert_eq!(sent["status"], "sent");

        let skipped = serde_json::to_value(DeliveryOutcome::Skipped("no phone number".to_owned()))
            .expect("serialise");
        assert_eq!(skipped["status"], "skipped");
        assert_eq!(skipped["reason"], "no phone number");

        let failed = serde_json::to_value(DeliveryOutcome::Failed("provider timeout".to_owned()))
            .expect("serialise");
        assert_eq!(failed["status"], "failed");
    }
}
