//! Pup friendship data model.
//!
//! A friendship is the authorization relation permitting a friend to
//! interact with a specific pup's hangouts. Most authorization decisions in
//! the lifecycle workflows gate on the existence of this row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Link between a pup and a friend user.
///
/// ## Invariants
/// - The (`pup_id`, `friend_user_id`) pair is unique.
/// - `friend_user_id` references a user with role `friend`; a pup's owner
///   cannot also be its friend. Both rules are enforced at creation by the
///   friendship workflow, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct PupFriendship {
    id: Uuid,
    pup_id: Uuid,
    friend_user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    history_with_pup: Option<String>,
}

impl PupFriendship {
    /// Build a new [`PupFriendship`].
    pub fn new(
        id: Uuid,
        pup_id: Uuid,
        friend_user_id: UserId,
        history_with_pup: Option<String>,
    ) -> Self {
        Self {
            id,
            pup_id,
            friend_user_id,
            history_with_pup,
        }
    }

    /// Stable friendship identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The pup this friendship grants access to.
    pub const fn pup_id(&self) -> Uuid {
        self.pup_id
    }

    /// The befriended user.
    pub const fn friend_user_id(&self) -> UserId {
        self.friend_user_id
    }

    /// Free-text history the friend has with this pup.
    pub fn history_with_pup(&self) -> Option<&str> {
        self.history_with_pup.as_deref()
    }

    /// Replace the free-text history.
    pub fn set_history_with_pup(&mut self, history: Option<String>) {
        self.history_with_pup = history;
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn friendship_serialises_to_camel_case() {
        let friendship = PupFriendship::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            UserId::random(),
            Some("Walked Fido last summer".to_owned()),
        );
        let value = serde_json::to_value(&friendship).expect("friendship serialises");
        assert!(value.get("pupId").is_some());
        assert!(value.get("friendUserId").is_some());
        assert_eq!(value["historyWithPup"], "Walked Fido last summer");
    }

    #[test]
    fn history_can_be_replaced() {
        let mut friendship =
            PupFriendship::new(Uuid::new_v4(), Uuid::new_v4(), UserId::random(), None);
        assert!(friendship.history_with_pup().is_none());
        friendship.set_history_with_pup(Some("Fed him once".to_owned()));
        assert_eq!(friendship.history_with_pup(), Some("Fed him once"));
    }
}
