use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dedup::normalize_email;
use crate::error::{LifecycleError, LifecycleResult};
use crate::model::{Attachment, Meeting, Person, PersonDetails, Phone, Tag, Task};
use crate::phone::{self, PhoneInput};

/// Fields for a new person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDraft {
    pub first_name: String,
    pub last_name: String,
    pub emails: Vec<String>,
    pub phones: Vec<PhoneInput>,
    pub details: PersonDetails,
    /// Requested status. Leads default to `interested`, Contacts to neutral.
    pub status: Option<String>,
    pub is_favourite: bool,
    pub tags: Vec<Tag>,
    pub tasks: Vec<Task>,
    pub meetings: Vec<Meeting>,
    pub attachments: Vec<Attachment>,
}

/// Partial update. Only `Some` fields overwrite; list fields are replaced
/// wholesale when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonPatch {
    /// Explicit Contact/Lead switch.
    pub category: Option<crate::model::Category>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub emails: Option<Vec<String>>,
    pub phones: Option<Vec<PhoneInput>>,
    pub details: Option<PersonDetails>,
    pub status: Option<String>,
    pub is_favourite: Option<bool>,
    pub tags: Option<Vec<Tag>>,
    pub tasks: Option<Vec<Task>>,
    pub meetings: Option<Vec<Meeting>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl PersonPatch {
    /// Whether the patch touches any identity field.
    #[must_use]
    pub const fn touches_identity(&self) -> bool {
        self.emails.is_some() || self.phones.is_some()
    }

    /// Overwrite everything except identity fields, status and category.
    pub(crate) fn apply_descriptive(&self, person: &mut Person) {
        if let Some(first) = &self.first_name {
            person.first_name = first.trim().to_string();
        }
        if let Some(last) = &self.last_name {
            person.last_name = last.trim().to_string();
        }
        if let Some(details) = &self.details {
            person.details = details.clone();
        }
        if let Some(fav) = self.is_favourite {
            person.is_favourite = fav;
        }
        if let Some(tags) = &self.tags {
            person.tags = tags.clone();
        }
        if let Some(tasks) = &self.tasks {
            person.tasks = tasks.clone();
        }
        if let Some(meetings) = &self.meetings {
            person.meetings = meetings.clone();
        }
        if let Some(attachments) = &self.attachments {
            person.attachments = attachments.clone();
        }
    }
}

/// Trimmed, lower-cased, de-duplicated emails with blanks removed.
#[must_use]
pub fn clean_emails(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for key in raw.iter().filter_map(|e| normalize_email(e)) {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}

/// Normalize supplied phones.
///
/// Unparsable phones are dropped with a warning. When phones were supplied
/// but none survive and there is no email either, the record would have no
/// identity at all, so the first rejection is returned as an error.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidPhone`] in the case described above.
pub fn clean_phones(inputs: &[PhoneInput], emails: &[String]) -> LifecycleResult<Vec<Phone>> {
    let (phones, rejected) = phone::normalize_all(inputs);
    if phones.is_empty() && emails.is_empty() {
        if let Some(first) = rejected.into_iter().next() {
            return Err(LifecycleError::InvalidPhone(first));
        }
        return Ok(phones);
    }
    for err in &rejected {
        warn!(input = %err.input, "dropping unparsable phone");
    }
    Ok(phones)
}

pub(crate) fn clean_status(raw: &str) -> String {
    raw.trim().to_string()
}
