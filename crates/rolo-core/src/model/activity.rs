use serde::{Deserialize, Serialize};
use std::fmt;

use super::id::PersonId;

/// What happened to a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    StatusChanged,
    Converted,
}

impl ActivityAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Converted => "converted",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload handed to the activity sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub action: ActivityAction,
    /// Category of the record after the action (`contact` / `lead`).
    pub kind: String,
    pub title: String,
    pub description: String,
    pub actor_id: String,
}

/// A stored activity-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub entry_id: i64,
    pub person_id: PersonId,
    pub action: String,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub actor_id: String,
    pub created_at_us: i64,
}
