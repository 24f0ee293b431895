//! Pup data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Validation errors returned by pup constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PupValidationError {
    /// The pup name was missing or blank once trimmed.
    EmptyName,
    /// The pup name exceeded the maximum length.
    NameTooLong {
        /// Maximum number of characters allowed.
        max: usize,
    },
}

impl fmt::Display for PupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "pup name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "pup name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for PupValidationError {}

/// Maximum allowed length for a pup name.
pub const PUP_NAME_MAX: usize = 64;

/// Name of a pup as shown in schedules and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PupName(String);

impl PupName {
    /// Validate and construct a [`PupName`].
    pub fn new(name: impl Into<String>) -> Result<Self, PupValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PupValidationError::EmptyName);
        }
        if trimmed.chars().count() > PUP_NAME_MAX {
            return Err(PupValidationError::NameTooLong { max: PUP_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PupName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PupName> for String {
    fn from(value: PupName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PupName {
    type Error = PupValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A dog cared for through the scheduling workflows.
///
/// ## Invariants
/// - Exactly one owning user, immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Pup {
    id: Uuid,
    name: PupName,
    owner_user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    care_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_photo_url: Option<String>,
}

impl Pup {
    /// Build a new [`Pup`] from validated components.
    pub fn new(
        id: Uuid,
        name: PupName,
        owner_user_id: UserId,
        care_instructions: Option<String>,
        profile_photo_url: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            owner_user_id,
            care_instructions,
            profile_photo_url,
        }
    }

    /// Stable pup identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Name shown in schedules and notifications.
    pub fn name(&self) -> &PupName {
        &self.name
    }

    /// Identifier of the owning user.
    pub const fn owner_user_id(&self) -> UserId {
        self.owner_user_id
    }

    /// Free-text care instructions for sitters.
    pub fn care_instructions(&self) -> Option<&str> {
        self.care_instructions.as_deref()
    }

    /// Profile photo location, if uploaded.
    pub fn profile_photo_url(&self) -> Option<&str> {
        self.profile_photo_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_pup_names_are_rejected(#[case] raw: &str) {
        let err = PupName::new(raw).expect_err("blank name must fail");
        assert_eq!(err, PupValidationError::EmptyName);
    }

    #[test]
    fn over_long_pup_names_are_rejected() {
        let raw = "x".repeat(PUP_NAME_MAX + 1);
        let err = PupName::new(raw).expect_err("over-long name must fail");
        assert_eq!(err, PupValidationError::NameTooLong { max: PUP_NAME_MAX });
    }

    #[test]
    fn pup_names_are_trimmed() {
        let name = PupName::new("  Fido  ").expect("valid name");
        assert_eq!(name.as_ref(), "Fido");
    }

    #[test]
    fn pup_serialises_to_camel_case() {
        let pup = Pup::new(
            Uuid::new_v4(),
            PupName::new("Fido").expect("valid name"),
            UserId::random(),
            Some("Two walks a day".to_owned()),
            None,
        );
        let value = serde_json::to_value(&pup).expect("pup serialises");
        assert_eq!(value["name"], "Fido");
        assert_eq!(value["careInstructions"], "Two walks a day");
        assert!(value.get("profilePhotoUrl").is_none());
        assert!(value.get("ownerUserId").is_some());
    }
}
