use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use super::id::PersonId;

/// The two mutually exclusive materializations of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Contact,
    Lead,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Lead => "lead",
        }
    }

    /// The other materialization.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Contact => Self::Lead,
            Self::Lead => Self::Contact,
        }
    }

    /// Name of the backing collection (table) for this category.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::Lead => "leads",
        }
    }
}

/// Canonical phone pair. Both fields are digit-only; `country_code` may be
/// empty for historical records stored without a calling code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone {
    pub country_code: String,
    pub number: String,
}

impl Phone {
    #[must_use]
    pub fn new(country_code: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            number: number.into(),
        }
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country_code.is_empty() {
            f.write_str(&self.number)
        } else {
            write!(f, "+{} {}", self.country_code, self.number)
        }
    }
}

/// Free-form descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonDetails {
    pub company: Option<String>,
    pub designation: Option<String>,
    pub website: Option<String>,
    /// Social profile links keyed by network (`linkedin`, `twitter`, ...).
    pub social: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at_us: Option<i64>,
    #[serde(default)]
    pub done: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub starts_at_us: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at_us: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Reference to a stored file; the bytes live in external object storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Every persisted field of a person, shared by both materializations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub owner_id: String,
    pub first_name: String,
    pub last_name: String,
    pub emails: Vec<String>,
    pub phones: Vec<Phone>,
    pub details: PersonDetails,
    pub status: String,
    pub is_favourite: bool,
    pub tags: Vec<Tag>,
    pub tasks: Vec<Task>,
    pub meetings: Vec<Meeting>,
    pub attachments: Vec<Attachment>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

impl Person {
    /// `"First Last"`, trimmed.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A person as it is currently materialized: exactly one of Contact or Lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum PersonRecord {
    Contact(Person),
    Lead(Person),
}

impl PersonRecord {
    #[must_use]
    pub const fn new(category: Category, person: Person) -> Self {
        match category {
            Category::Contact => Self::Contact(person),
            Category::Lead => Self::Lead(person),
        }
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Contact(_) => Category::Contact,
            Self::Lead(_) => Category::Lead,
        }
    }

    #[must_use]
    pub const fn is_lead(&self) -> bool {
        matches!(self, Self::Lead(_))
    }

    #[must_use]
    pub const fn person(&self) -> &Person {
        match self {
            Self::Contact(p) | Self::Lead(p) => p,
        }
    }

    pub const fn person_mut(&mut self) -> &mut Person {
        match self {
            Self::Contact(p) | Self::Lead(p) => p,
        }
    }

    #[must_use]
    pub fn into_person(self) -> Person {
        match self {
            Self::Contact(p) | Self::Lead(p) => p,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &PersonId {
        &self.person().id
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.person().status
    }

    /// Re-materialize this person as `target` with `status`.
    ///
    /// Identifier, owner and every sub-document carry over untouched; only
    /// the variant, `status` and `updated_at_us` change.
    #[must_use]
    pub fn converted(self, target: Category, status: impl Into<String>, now_us: i64) -> Self {
        let mut person = self.into_person();
        person.status = status.into();
        person.updated_at_us = now_us;
        Self::new(target, person)
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "contact" => Ok(Self::Contact),
            "lead" => Ok(Self::Lead),
            _ => Err(ParseEnumError {
                expected: "category",
                got: s.to_string(),
            }),
        }
    }
}
