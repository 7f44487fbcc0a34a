//! Append-only audit trail of Lead status transitions.
//!
//! One entry is written per transition and none is ever updated or deleted;
//! the funnel view is rebuilt from this log. The contract deliberately has
//! no mutation besides [`PipelineStore::append`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::PersonId;

/// A recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub entry_id: i64,
    pub lead_id: PersonId,
    pub previous_status: Option<String>,
    pub current_status: String,
    pub changed_by: String,
    pub note: Option<String>,
    pub created_at_us: i64,
}

/// Transition about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPipelineEntry<'a> {
    pub lead_id: &'a PersonId,
    pub previous_status: Option<&'a str>,
    pub current_status: &'a str,
    pub changed_by: &'a str,
    pub note: Option<&'a str>,
}

impl NewPipelineEntry<'_> {
    /// Empty previous statuses (neutral Contacts) are recorded as absent.
    #[must_use]
    pub fn previous(&self) -> Option<&str> {
        self.previous_status.filter(|s| !s.is_empty())
    }
}

pub trait PipelineStore {
    /// Record one transition and return the stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be written.
    fn append(&self, entry: &NewPipelineEntry<'_>) -> Result<PipelineEntry>;

    /// Every entry for `lead_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    fn history(&self, lead_id: &PersonId) -> Result<Vec<PipelineEntry>>;
}
