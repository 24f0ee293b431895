//! User data model: identity, role, and contact details.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id string was not a valid UUID.
    InvalidId,
    /// The display name was missing or blank once trimmed.
    EmptyDisplayName,
    /// The display name exceeded the maximum length.
    DisplayNameTooLong {
        /// Maximum number of characters allowed.
        max: usize,
    },
    /// The role string named no known role.
    UnknownRole {
        /// The rejected input value.
        value: String,
    },
    /// The phone number did not look like a dialable number.
    InvalidPhoneNumber,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::UnknownRole { value } => {
                write!(f, "role must be owner or friend, got {value}")
            }
            Self::InvalidPhoneNumber => write!(
                f,
                "phone number must be an optional + followed by 7 to 15 digits",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role a user plays in the scheduling workflows. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Owns pups, creates hangouts, decides on suggestions.
    Owner,
    /// May be linked to pups via friendships and assigned to hangouts.
    Friend,
}

impl UserRole {
    /// Stable lowercase representation used in storage and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Friend => "friend",
        }
    }

    /// Parse the stable lowercase representation.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "owner" => Ok(Self::Owner),
            "friend" => Ok(Self::Friend),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dialable phone number in a loosely E.164 shape.
///
/// ## Invariants
/// - After stripping spaces and dashes the value is an optional `+` followed
///   by 7 to 15 ASCII digits.
///
/// # Examples
/// ```
/// use dogcal_backend::domain::PhoneNumber;
///
/// let phone = PhoneNumber::new("+44 7700 900123").expect("valid number");
/// assert_eq!(phone.as_ref(), "+447700900123");
/// assert!(PhoneNumber::new("not a number").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 7;
    const MAX_DIGITS: usize = 15;

    /// Validate and construct a [`PhoneNumber`], normalising separators away.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let compact: String = raw
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        let digits = compact.strip_prefix('+').unwrap_or(compact.as_str());
        let digit_count = digits.chars().count();
        if digit_count < Self::MIN_DIGITS || digit_count > Self::MAX_DIGITS {
            return Err(UserValidationError::InvalidPhoneNumber);
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::InvalidPhoneNumber);
        }

        Ok(Self(compact))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        let trimmed = display_name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` is a valid UUID.
/// - `display_name` is non-empty once trimmed.
/// - `role` never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    display_name: DisplayName,
    role: UserRole,
    phone_number: Option<PhoneNumber>,
    profile_photo_url: Option<String>,
    address_text: Option<String>,
}

/// Field bundle for constructing a [`User`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    /// Stable identifier.
    pub id: UserId,
    /// Display name shown to other users.
    pub display_name: DisplayName,
    /// Immutable role.
    pub role: UserRole,
    /// Optional dialable phone number for notifications.
    pub phone_number: Option<PhoneNumber>,
    /// Optional profile photo location.
    pub profile_photo_url: Option<String>,
    /// Optional free-text address.
    pub address_text: Option<String>,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            display_name,
            role,
            phone_number,
            profile_photo_url,
            address_text,
        } = draft;
        Self {
            id,
            display_name,
            role,
            phone_number,
            profile_photo_url,
            address_text,
        }
    }

    /// Stable user identifier.
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Display name shown to other users.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Immutable role assigned at creation.
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Phone number used for notification delivery, if recorded.
    pub fn phone_number(&self) -> Option<&PhoneNumber> {
        self.phone_number.as_ref()
    }

    /// Profile photo location, if uploaded.
    pub fn profile_photo_url(&self) -> Option<&str> {
        self.profile_photo_url.as_deref()
    }

    /// Free-text address, if recorded.
    pub fn address_text(&self) -> Option<&str> {
        self.address_text.as_deref()
    }
}

/// Immutable acting-user identity resolved once per request.
///
/// Handlers resolve the session's user id into this value and pass it
/// explicitly to domain services; no service reads ambient auth state.
#[derive(Debug, Clone, PartialEq)]
pub struct ActingUser {
    /// Resolved user id.
    pub id: UserId,
    /// Resolved role, used for precondition checks.
    pub role: UserRole,
    /// Display name, used when formatting notifications.
    pub display_name: DisplayName,
}

impl ActingUser {
    /// Build the acting-user context from a resolved [`User`].
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id(),
            role: user.role(),
            display_name: user.display_name().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: UserId,
    display_name: String,
    role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_text: Option<String>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            display_name: value.display_name.into(),
            role: value.role,
            phone_number: value.phone_number.map(String::from),
            profile_photo_url: value.profile_photo_url,
            address_text: value.address_text,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let phone_number = value.phone_number.map(PhoneNumber::new).transpose()?;
        Ok(User::new(UserDraft {
            id: value.id,
            display_name: DisplayName::new(value.display_name)?,
            role: value.role,
            phone_number,
            profile_photo_url: value.profile_photo_url,
            address_text: value.address_text,
        }))
    }
}
