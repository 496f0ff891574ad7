//! Data structures and helpers shared across the API and feed binaries.

mod moderation;
mod pricing;

use chrono::{DateTime, Utc};
use hex::encode as hex_encode;
use sha3::{Digest, Sha3_256};
use thiserror::Error;

pub use moderation::BannedWordFilter;
pub use pricing::{quote_message, DEFAULT_PRICE_PER_CHAR};

/// Required length (in hex characters) for record identifiers.
pub const ID_LENGTH: usize = 32;

/// Errors emitted when externally supplied identifiers fail validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdFormatError {
    #[error("identifier must be exactly {ID_LENGTH} hex characters")]
    WrongLength,
    #[error("identifier contains non-hex characters")]
    NonHex,
}

/// Validates that the supplied identifier matches the 32 hex-character contract.
pub fn validate_id(id: &str) -> Result<(), IdFormatError> {
    if id.len() != ID_LENGTH {
        return Err(IdFormatError::WrongLength);
    }

    if !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(IdFormatError::NonHex);
    }

    Ok(())
}

/// Fills `N` bytes from the OS RNG and hex-encodes them.
pub fn random_hex<const N: usize>() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; N];
    getrandom::fill(&mut bytes)?;
    Ok(hex_encode(bytes))
}

/// Deterministic SHA3-256 fingerprint used to key secrets (session tokens,
/// OAuth states) without keeping the raw value around.
pub fn fingerprint(secret: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(secret.as_bytes());
    hex_encode(hasher.finalize())
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                let mut owned = value.into();
                owned.make_ascii_lowercase();
                Self(owned)
            }

            pub fn parse(id: &str) -> Result<Self, IdFormatError> {
                validate_id(id)?;
                Ok(Self::new(id))
            }

            pub fn generate() -> Result<Self, getrandom::Error> {
                random_hex::<{ ID_LENGTH / 2 }>().map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

hex_id!(
    /// Internal identifier of a signed-in DJ.
    UserId
);
hex_id!(
    /// Identifier of a single live show.
    ShowId
);
hex_id!(
    /// Identifier of an audience message.
    MessageId
);

/// Profile returned by the identity provider after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-DJ pricing and moderation knobs. Amounts are in cents.
///
/// The reaction prices (`star_price`, `kiss_price`, `heart_price`) are stored
/// for the dashboard but are not part of any payment computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DjSettings {
    pub user_id: UserId,
    pub artist_name: Option<String>,
    pub price_per_char: i64,
    pub star_price: i64,
    pub kiss_price: i64,
    pub heart_price: i64,
    pub auto_moderate: bool,
    pub payout_email: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub user_id: UserId,
    pub artist_name: Option<String>,
    pub price_per_char: i64,
    pub star_price: i64,
    pub kiss_price: i64,
    pub heart_price: i64,
    pub auto_moderate: bool,
    pub payout_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRecord {
    pub id: ShowId,
    pub user_id: UserId,
    pub title: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_earnings: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShow {
    pub id: ShowId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// An ended show together with its message count, as listed on the stats
/// dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowSummary {
    pub show: ShowRecord,
    pub message_count: u64,
}

/// Inclusive creation-time window used when listing past shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.until.map_or(true, |until| at <= until)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: MessageId,
    pub show_id: ShowId,
    pub display_name: String,
    pub content: String,
    pub payment: i64,
    pub paid: bool,
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub id: MessageId,
    pub show_id: ShowId,
    pub display_name: String,
    pub content: String,
    pub payment: i64,
    pub paid: bool,
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filters applied when polling a show's messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    pub paid_only: bool,
    pub since: Option<DateTime<Utc>>,
}

/// Sums message payments, saturating instead of wrapping.
pub fn total_payments<'a>(messages: impl IntoIterator<Item = &'a MessageRecord>) -> i64 {
    messages
        .into_iter()
        .fold(0_i64, |acc, message| acc.saturating_add(message.payment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const VALID_ID: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn id_validation_rejects_invalid_inputs() {
        assert_eq!(validate_id("deadbeef"), Err(IdFormatError::WrongLength));
        assert_eq!(
            validate_id(&"z".repeat(ID_LENGTH)),
            Err(IdFormatError::NonHex)
        );
        assert!(validate_id(VALID_ID).is_ok());
    }

    #[test]
    fn show_id_canonicalizes_case() {
        let id = ShowId::parse(&"ABCDEF01".repeat(4)).unwrap();
        assert_eq!(id.as_str(), "abcdef01".repeat(4));
    }

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = MessageId::generate().unwrap();
        let b = MessageId::generate().unwrap();
        assert!(validate_id(a.as_str()).is_ok());
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let left = fingerprint("abcd");
        assert_eq!(left, fingerprint("abcd"));
        assert_ne!(left, fingerprint("abce"));
        assert_eq!(left.len(), 64);
    }

    #[test]
    fn date_range_is_inclusive() {
        let from = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();
        let range = DateRange {
            from: Some(from),
            until: Some(until),
        };
        assert!(range.contains(from));
        assert!(range.contains(until));
        assert!(!range.contains(until + chrono::Duration::seconds(1)));
        assert!(DateRange::default().contains(from));
    }

    #[test]
    fn total_payments_saturates() {
        let message = |payment| MessageRecord {
            id: MessageId::new(VALID_ID),
            show_id: ShowId::new(VALID_ID),
            display_name: "a".into(),
            content: "b".into(),
            payment,
            paid: true,
            payment_ref: None,
            created_at: Utc::now(),
        };
        let messages = [message(120), message(30)];
        assert_eq!(total_payments(&messages), 150);
        let huge = [message(i64::MAX), message(1)];
        assert_eq!(total_payments(&huge), i64::MAX);
    }
}
