//! Duplicate detection inside a company scope.
//!
//! [`index::DuplicateIndex`] is derived state: it is rebuilt from the store
//! for every write that needs it and never cached. [`guard::DuplicateGuard`]
//! probes it for the first identity clash.

pub mod guard;
pub mod index;

use serde::Serialize;
use std::fmt;

use crate::model::{Category, PersonId};

pub use guard::DuplicateGuard;
pub use index::{DuplicateIndex, build_index, normalize_email};

/// Who already holds a phone variant or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerDescriptor {
    /// Collection the match lives in.
    pub category: Category,
    /// User that owns the matching record.
    pub owner_id: String,
    pub person_id: PersonId,
    pub first_name: String,
    pub last_name: String,
    pub is_lead: bool,
}

impl OwnerDescriptor {
    #[must_use]
    pub fn person_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// The identity key that clashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MatchedKey {
    Phone(String),
    Email(String),
}

impl fmt::Display for MatchedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phone(v) => write!(f, "phone {v}"),
            Self::Email(v) => write!(f, "email {v}"),
        }
    }
}

/// A duplicate found by the guard, with attribution for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub matched: MatchedKey,
    pub owner: OwnerDescriptor,
    /// Display name of the owning user, when it could be looked up.
    pub owner_name: Option<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} already exists as {} '{}' ({})",
            self.matched,
            self.owner.category,
            self.owner.person_name(),
            self.owner.person_id
        )?;
        match &self.owner_name {
            Some(name) => write!(f, ", owned by {name}"),
            None => write!(f, ", owned by user {}", self.owner.owner_id),
        }
    }
}
