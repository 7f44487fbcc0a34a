//! Person identifiers.
//!
//! An identifier is minted once when a person is first created and then
//! survives every Contact/Lead conversion unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix shared by every generated identifier.
pub const PERSON_ID_PREFIX: &str = "ps-";

const HASH_CHARS: usize = 12;

/// Stable identifier of a person across both collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

/// Error returned for malformed identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid person id '{value}': {reason}")]
pub struct InvalidPersonId {
    pub value: String,
    pub reason: &'static str,
}

impl PersonId {
    /// Mint a fresh identifier.
    ///
    /// The hash input mixes wall-clock nanoseconds, the process id and a
    /// process-wide counter, so two calls never collide inside one process.
    #[must_use]
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        let seed = format!("{nanos}:{}:{seq}", std::process::id());
        let digest = blake3::hash(seed.as_bytes()).to_hex();
        Self(format!("{PERSON_ID_PREFIX}{}", &digest[..HASH_CHARS]))
    }

    /// Validate user-supplied identifier text.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPersonId`] when the value is blank or contains
    /// whitespace.
    pub fn parse(raw: &str) -> Result<Self, InvalidPersonId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidPersonId {
                value: raw.to_string(),
                reason: "identifier is empty",
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidPersonId {
                value: raw.to_string(),
                reason: "identifier contains whitespace",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wrap an identifier read back from storage without validation.
    #[must_use]
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PersonId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
