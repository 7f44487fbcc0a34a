//! Narrow contracts between the engine and its collaborators.
//!
//! The engine never talks to a database directly. It sees two person
//! collections, a user directory, an activity sink, the pipeline log and
//! the status catalog through these traits; [`crate::db::SqliteStore`]
//! implements all of them.

use anyhow::Result;

use crate::model::{
    ActivityEntry, ActivityEvent, Category, PersonId, PersonRecord, Phone, StatusVocabulary,
    UserRecord,
};

/// Identity-bearing projection of a person row. Carries no sub-documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRow {
    pub category: Category,
    pub id: PersonId,
    pub owner_id: String,
    pub first_name: String,
    pub last_name: String,
    pub emails: Vec<String>,
    pub phones: Vec<Phone>,
}

/// The Contact and Lead collections.
pub trait RecordStore {
    /// Identity rows owned by any of `owner_ids`: every contact first, then
    /// every lead, each in insertion order. At most `limit` rows are read.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    fn identities_owned_by(&self, owner_ids: &[String], limit: usize)
    -> Result<Vec<IdentityRow>>;

    /// Point lookup across both collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    fn find(&self, id: &PersonId) -> Result<Option<PersonRecord>>;

    /// Insert into the collection matching the record's category.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a primary-key clash).
    fn insert(&self, record: &PersonRecord) -> Result<()>;

    /// Overwrite an existing row in the record's collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or no row matched.
    fn replace(&self, record: &PersonRecord) -> Result<()>;

    /// Delete `id` from one collection. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn remove(&self, category: Category, id: &PersonId) -> Result<bool>;

    /// Run `f` as one exclusive write unit. Any `Err` rolls back every write
    /// made inside it.
    ///
    /// # Errors
    ///
    /// Propagates `f`'s error, or a store error if begin/commit fails.
    fn write_txn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<anyhow::Error>;
}

/// Owner attribution lookups.
pub trait UserDirectory {
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn user(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Ids of every user whose creator is `admin_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn agents_of(&self, admin_id: &str) -> Result<Vec<String>>;
}

/// Best-effort activity log. Failures are logged by the engine, never
/// surfaced.
pub trait ActivitySink {
    /// # Errors
    ///
    /// Returns an error if the entry could not be recorded.
    fn append(&self, person_id: &PersonId, event: &ActivityEvent) -> Result<()>;

    /// Entries for one person, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    fn entries(&self, person_id: &PersonId) -> Result<Vec<ActivityEntry>>;
}

/// Per-company status vocabularies.
pub trait StatusCatalog {
    /// The company's configured options, empty when it configured none.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn vocabulary(&self, company_admin_id: &str, category: Category) -> Result<StatusVocabulary>;

    /// Replace the company's options for `vocabulary.category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_vocabulary(&self, company_admin_id: &str, vocabulary: &StatusVocabulary) -> Result<()>;
}
