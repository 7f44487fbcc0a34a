use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use super::query;
use crate::model::{
    ActivityEntry, ActivityEvent, Category, PersonId, PersonRecord, StatusVocabulary, UserRecord,
};
use crate::pipeline::{NewPipelineEntry, PipelineEntry, PipelineStore};
use crate::store::{ActivitySink, IdentityRow, RecordStore, StatusCatalog, UserDirectory};

/// One SQLite connection implementing every store contract.
///
/// Not `Sync`: give each thread (or request) its own store. Writers in
/// other connections are serialized by `BEGIN IMMEDIATE`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        Ok(Self {
            conn: super::open_store(path, busy_timeout)?,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: super::open_in_memory()?,
        })
    }

    /// Wrap a connection that is already configured and migrated.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Provision a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or the creator does not exist.
    pub fn insert_user(&self, user: &UserRecord) -> Result<()> {
        query::insert_user(&self.conn, user, now_us())
    }

    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn users(&self) -> Result<Vec<UserRecord>> {
        query::list_users(&self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the count query fails.
    pub fn count(&self, category: Category) -> Result<u64> {
        query::count_people(&self.conn, category)
    }
}

impl RecordStore for SqliteStore {
    fn identities_owned_by(&self, owner_ids: &[String], limit: usize) -> Result<Vec<IdentityRow>> {
        query::identity_rows(&self.conn, owner_ids, limit)
    }

    fn find(&self, id: &PersonId) -> Result<Option<PersonRecord>> {
        query::get_person(&self.conn, id.as_str())
    }

    fn insert(&self, record: &PersonRecord) -> Result<()> {
        query::insert_person(&self.conn, record)
    }

    fn replace(&self, record: &PersonRecord) -> Result<()> {
        query::update_person(&self.conn, record)
    }

    fn remove(&self, category: Category, id: &PersonId) -> Result<bool> {
        query::delete_person(&self.conn, category, id.as_str())
    }

    fn write_txn<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        // Already inside a write unit: join it.
        if !self.conn.is_autocommit() {
            return f();
        }

        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .context("begin write transaction")?;

        match f() {
            Ok(value) => {
                if let Err(err) = self.conn.execute_batch("COMMIT") {
                    rollback(&self.conn);
                    return Err(anyhow!(err).context("commit write transaction").into());
                }
                Ok(value)
            }
            Err(err) => {
                rollback(&self.conn);
                Err(err)
            }
        }
    }
}

fn rollback(conn: &Connection) {
    if conn.is_autocommit() {
        return;
    }
    if let Err(err) = conn.execute_batch("ROLLBACK") {
        warn!(error = %err, "rollback of write transaction failed");
    }
}

impl UserDirectory for SqliteStore {
    fn user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        query::get_user(&self.conn, user_id)
    }

    fn agents_of(&self, admin_id: &str) -> Result<Vec<String>> {
        query::list_agents(&self.conn, admin_id)
    }
}

impl PipelineStore for SqliteStore {
    fn append(&self, entry: &NewPipelineEntry<'_>) -> Result<PipelineEntry> {
        query::append_pipeline_entry(&self.conn, entry, now_us())
    }

    fn history(&self, lead_id: &PersonId) -> Result<Vec<PipelineEntry>> {
        query::pipeline_history(&self.conn, lead_id.as_str())
    }
}

impl ActivitySink for SqliteStore {
    fn append(&self, person_id: &PersonId, event: &ActivityEvent) -> Result<()> {
        query::append_activity(&self.conn, person_id, event, now_us()).map(|_| ())
    }

    fn entries(&self, person_id: &PersonId) -> Result<Vec<ActivityEntry>> {
        query::activity_entries(&self.conn, person_id.as_str())
    }
}

impl StatusCatalog for SqliteStore {
    fn vocabulary(&self, company_admin_id: &str, category: Category) -> Result<StatusVocabulary> {
        let options = query::status_options(&self.conn, company_admin_id, category)?;
        Ok(StatusVocabulary::new(category, options))
    }

    fn set_vocabulary(&self, company_admin_id: &str, vocabulary: &StatusVocabulary) -> Result<()> {
        self.write_txn(|| query::replace_status_options(&self.conn, company_admin_id, vocabulary))
    }
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
