//! Company-configured status vocabularies.
//!
//! Statuses are data, not an enum: every company defines its own list per
//! category. The only value the engine treats structurally is
//! [`INTERESTED`], which always promotes a Contact to a Lead.

use serde::{Deserialize, Serialize};

use super::person::Category;

/// Status that triggers Contact -> Lead promotion and seeds new Leads.
pub const INTERESTED: &str = "interested";

/// One permitted status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    pub value: String,
    pub label: String,
    /// Funnel/kanban column for Lead statuses. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl StatusOption {
    #[must_use]
    pub fn new(value: &str, label: &str, group: Option<&str>) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            group: group.map(str::to_string),
        }
    }
}

/// The ordered status list a company uses for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVocabulary {
    pub category: Category,
    pub options: Vec<StatusOption>,
}

impl StatusVocabulary {
    #[must_use]
    pub const fn new(category: Category, options: Vec<StatusOption>) -> Self {
        Self { category, options }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    #[must_use]
    pub fn get(&self, value: &str) -> Option<&StatusOption> {
        self.options.iter().find(|o| o.value == value)
    }

    #[must_use]
    pub fn group_of(&self, value: &str) -> Option<&str> {
        self.get(value).and_then(|o| o.group.as_deref())
    }

    /// Whether `value` may be stored as the status of a record in this
    /// vocabulary's category.
    ///
    /// - `interested` is always accepted.
    /// - Contacts accept the empty (neutral) status.
    /// - An unconfigured (empty) vocabulary accepts any non-empty value.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        if value == INTERESTED {
            return true;
        }
        if value.is_empty() {
            return self.category == Category::Contact;
        }
        self.options.is_empty() || self.contains(value)
    }
}

/// Built-in contact statuses used when neither the company nor the config
/// file provides any.
#[must_use]
pub fn default_contact_statuses() -> Vec<StatusOption> {
    vec![
        StatusOption::new("new", "New", None),
        StatusOption::new("contacted", "Contacted", None),
        StatusOption::new("not_interested", "Not interested", None),
        StatusOption::new("unreachable", "Unreachable", None),
    ]
}

/// Built-in lead statuses, grouped for the funnel view.
#[must_use]
pub fn default_lead_statuses() -> Vec<StatusOption> {
    vec![
        StatusOption::new(INTERESTED, "Interested", Some("open")),
        StatusOption::new("followup", "Follow up", Some("open")),
        StatusOption::new("proposal", "Proposal sent", Some("negotiation")),
        StatusOption::new("win", "Won", Some("closed")),
        StatusOption::new("lost", "Lost", Some("closed")),
    ]
}
