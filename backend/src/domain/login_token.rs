//! Login token data model.
//!
//! A login token is an opaque credential mapping to a user id and an
//! optional redirect destination. The raw secret is returned exactly once at
//! issue time; only its SHA-256 digest is persisted, so a storage dump never
//! yields usable credentials.

use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::user::UserId;

const SECRET_BYTES: usize = 32;

/// Raw token secret as embedded in login links.
///
/// Held in a zeroizing buffer so the secret does not linger in memory after
/// the issuing response is built.
#[derive(Debug, Clone)]
pub struct TokenSecret(Zeroizing<String>);

impl TokenSecret {
    /// Generate a fresh random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Wrap a secret received from a login link.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// The secret as embedded in links.
    pub fn reveal(&self) -> &str {
        self.0.as_str()
    }

    /// Hex-encoded SHA-256 digest persisted in place of the secret.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Persisted token record keyed by the secret's digest.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginToken {
    /// Hex-encoded SHA-256 digest of the secret.
    pub digest: String,
    /// User the token authenticates as.
    pub user_id: UserId,
    /// Optional post-login redirect destination.
    pub destination: Option<String>,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// Optional hard expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the first successful validation consumes the token.
    pub single_use: bool,
    /// Set once a single-use token has been redeemed.
    pub consumed_at: Option<DateTime<Utc>>,
}

impl LoginToken {
    /// Whether the token can still authenticate at `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        if self.single_use && self.consumed_at.is_some() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn token(single_use: bool, expires_in: Option<i64>, consumed: bool) -> LoginToken {
        let now = Utc::now();
        LoginToken {
            digest: TokenSecret::generate().digest(),
            user_id: UserId::random(),
            destination: None,
            issued_at: now,
            expires_at: expires_in.map(|minutes| now + Duration::minutes(minutes)),
            single_use,
            consumed_at: consumed.then(|| now),
        }
    }

    #[test]
    fn secrets_are_unique_and_hex() {
        let a = TokenSecret::generate();
        let b = TokenSecret::generate();
        assert_ne!(a.reveal(), b.reveal());
        assert_eq!(a.reveal().len(), SECRET_BYTES * 2);
        assert!(a.reveal().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_is_stable_for_a_secret() {
        let secret = TokenSecret::generate();
        let reparsed = TokenSecret::from_raw(secret.reveal());
        assert_eq!(secret.digest(), reparsed.digest());
        assert_ne!(secret.digest(), secret.reveal());
    }

    #[rstest]
    #[case(false, None, false, true)]
    #[case(true, None, false, true)]
    #[case(true, None, true, false)]
    #[case(false, Some(10), false, true)]
    #[case(false, Some(-10), false, false)]
    fn usability_reflects_consumption_and_expiry(
        #[case] single_use: bool,
        #[case] expires_in: Option<i64>,
        #[case] consumed: bool,
        #[case] expected: bool,
    ) {
        let token = token(single_use, expires_in, consumed);
        assert_eq!(token.is_usable(Utc::now()), expected);
    }
}
