//! `SQLite` query helpers for the rolo store.
//!
//! Every function takes a shared `&Connection` and returns `anyhow::Result`
//! with typed values (never raw rows). None of them open transactions; the
//! caller decides the write unit.

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::{Serialize, de::DeserializeOwned};

use crate::model::{
    ActivityEntry, ActivityEvent, Category, Person, PersonId, PersonRecord, Phone, Role,
    StatusOption, StatusVocabulary, UserRecord,
};
use crate::pipeline::{NewPipelineEntry, PipelineEntry};
use crate::store::IdentityRow;

const PERSON_COLUMNS: &str = "person_id, owner_id, first_name, last_name, emails_json, \
     phones_json, details_json, status, is_favourite, tags_json, tasks_json, \
     meetings_json, attachments_json, created_at_us, updated_at_us";

// ---------------------------------------------------------------------------
// Persons
// ---------------------------------------------------------------------------

/// A person row before its JSON columns are decoded.
struct PersonRow {
    person_id: String,
    owner_id: String,
    first_name: String,
    last_name: String,
    emails_json: String,
    phones_json: String,
    details_json: String,
    status: String,
    is_favourite: bool,
    tags_json: String,
    tasks_json: String,
    meetings_json: String,
    attachments_json: String,
    created_at_us: i64,
    updated_at_us: i64,
}

fn row_to_person_row(row: &Row<'_>) -> rusqlite::Result<PersonRow> {
    Ok(PersonRow {
        person_id: row.get(0)?,
        owner_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        emails_json: row.get(4)?,
        phones_json: row.get(5)?,
        details_json: row.get(6)?,
        status: row.get(7)?,
        is_favourite: row.get::<_, i64>(8)? != 0,
        tags_json: row.get(9)?,
        tasks_json: row.get(10)?,
        meetings_json: row.get(11)?,
        attachments_json: row.get(12)?,
        created_at_us: row.get(13)?,
        updated_at_us: row.get(14)?,
    })
}

impl PersonRow {
    fn decode(self) -> Result<Person> {
        let id = self.person_id;
        Ok(Person {
            emails: from_json(&self.emails_json, "emails", &id)?,
            phones: from_json(&self.phones_json, "phones", &id)?,
            details: from_json(&self.details_json, "details", &id)?,
            tags: from_json(&self.tags_json, "tags", &id)?,
            tasks: from_json(&self.tasks_json, "tasks", &id)?,
            meetings: from_json(&self.meetings_json, "meetings", &id)?,
            attachments: from_json(&self.attachments_json, "attachments", &id)?,
            owner_id: self.owner_id,
            first_name: self.first_name,
            last_name: self.last_name,
            status: self.status,
            is_favourite: self.is_favourite,
            created_at_us: self.created_at_us,
            updated_at_us: self.updated_at_us,
            id: PersonId::new_unchecked(id),
        })
    }
}

fn from_json<T: DeserializeOwned>(raw: &str, column: &str, person_id: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("decode {column} of '{person_id}'"))
}

fn to_json<T: Serialize + ?Sized>(value: &T, column: &str) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("encode {column}"))
}

/// Fetch one person from a single collection.
///
/// # Errors
///
/// Returns an error if the query fails or a JSON column cannot be decoded.
pub fn get_person_in(
    conn: &Connection,
    category: Category,
    person_id: &str,
) -> Result<Option<PersonRecord>> {
    let sql = format!(
        "SELECT {PERSON_COLUMNS} FROM {} WHERE person_id = ?1",
        category.collection()
    );
    let mut stmt = conn
        .prepare_cached(&sql)
        .with_context(|| format!("prepare get_person_in {category}"))?;

    let result = stmt.query_row(params![person_id], row_to_person_row);
    match result {
        Ok(row) => Ok(Some(PersonRecord::new(category, row.decode()?))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_person_in {category} for '{person_id}'")),
    }
}

/// Fetch one person from whichever collection holds it.
///
/// # Errors
///
/// Returns an error if either lookup fails.
pub fn get_person(conn: &Connection, person_id: &str) -> Result<Option<PersonRecord>> {
    if let Some(record) = get_person_in(conn, Category::Contact, person_id)? {
        return Ok(Some(record));
    }
    get_person_in(conn, Category::Lead, person_id)
}

/// Insert a record into its category's collection.
///
/// # Errors
///
/// Returns an error on encoding failure or if the insert is rejected
/// (for example a duplicate `person_id`).
pub fn insert_person(conn: &Connection, record: &PersonRecord) -> Result<()> {
    let category = record.category();
    let p = record.person();
    let sql = format!(
        "INSERT INTO {} ({PERSON_COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        category.collection()
    );
    conn.execute(
        &sql,
        params![
            p.id.as_str(),
            p.owner_id,
            p.first_name,
            p.last_name,
            to_json(&p.emails, "emails")?,
            to_json(&p.phones, "phones")?,
            to_json(&p.details, "details")?,
            p.status,
            i64::from(p.is_favourite),
            to_json(&p.tags, "tags")?,
            to_json(&p.tasks, "tasks")?,
            to_json(&p.meetings, "meetings")?,
            to_json(&p.attachments, "attachments")?,
            p.created_at_us,
            p.updated_at_us,
        ],
    )
    .with_context(|| format!("insert {category} '{}'", p.id))?;
    Ok(())
}

/// Overwrite every mutable column of an existing row.
///
/// # Errors
///
/// Returns an error if the update fails or no row in the record's
/// collection carries its id.
pub fn update_person(conn: &Connection, record: &PersonRecord) -> Result<()> {
    let category = record.category();
    let p = record.person();
    let sql = format!(
        "UPDATE {} SET owner_id = ?2, first_name = ?3, last_name = ?4, emails_json = ?5, \
         phones_json = ?6, details_json = ?7, status = ?8, is_favourite = ?9, tags_json = ?10, \
         tasks_json = ?11, meetings_json = ?12, attachments_json = ?13, updated_at_us = ?14 \
         WHERE person_id = ?1",
        category.collection()
    );
    let changed = conn
        .execute(
            &sql,
            params![
                p.id.as_str(),
                p.owner_id,
                p.first_name,
                p.last_name,
                to_json(&p.emails, "emails")?,
                to_json(&p.phones, "phones")?,
                to_json(&p.details, "details")?,
                p.status,
                i64::from(p.is_favourite),
                to_json(&p.tags, "tags")?,
                to_json(&p.tasks, "tasks")?,
                to_json(&p.meetings, "meetings")?,
                to_json(&p.attachments, "attachments")?,
                p.updated_at_us,
            ],
        )
        .with_context(|| format!("update {category} '{}'", p.id))?;
    if changed == 0 {
        bail!("no {category} '{}' to update", p.id);
    }
    Ok(())
}

/// Delete from one collection. Returns whether a row went away.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_person(conn: &Connection, category: Category, person_id: &str) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE person_id = ?1", category.collection());
    let changed = conn
        .execute(&sql, params![person_id])
        .with_context(|| format!("delete {category} '{person_id}'"))?;
    Ok(changed > 0)
}

/// Identity projection of every contact, then every lead, owned by
/// `owner_ids`, in insertion order. Reads at most `limit` rows in total.
///
/// # Errors
///
/// Returns an error if a query fails or an identity column is malformed.
pub fn identity_rows(
    conn: &Connection,
    owner_ids: &[String],
    limit: usize,
) -> Result<Vec<IdentityRow>> {
    let mut rows = Vec::new();
    if owner_ids.is_empty() || limit == 0 {
        return Ok(rows);
    }

    let placeholders = (1..=owner_ids.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    for category in [Category::Contact, Category::Lead] {
        let remaining = limit - rows.len();
        if remaining == 0 {
            break;
        }
        let sql = format!(
            "SELECT person_id, owner_id, first_name, last_name, emails_json, phones_json \
             FROM {} WHERE owner_id IN ({placeholders}) ORDER BY rowid LIMIT {remaining}",
            category.collection()
        );
        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("prepare identity scan of {category}"))?;
        let mapped = stmt
            .query_map(params_from_iter(owner_ids.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .with_context(|| format!("execute identity scan of {category}"))?;

        for row in mapped {
            let (id, owner_id, first_name, last_name, emails_json, phones_json) =
                row.context("read identity row")?;
            let emails: Vec<String> = from_json(&emails_json, "emails", &id)?;
            let phones: Vec<Phone> = from_json(&phones_json, "phones", &id)?;
            rows.push(IdentityRow {
                category,
                id: PersonId::new_unchecked(id),
                owner_id,
                first_name,
                last_name,
                emails,
                phones,
            });
        }
    }
    Ok(rows)
}

/// Number of people held in one collection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_people(conn: &Connection, category: Category) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", category.collection());
    let count: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("count {category}"))?;
    Ok(u64::try_from(count).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<(String, String, String, Option<String>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_user(raw: (String, String, String, Option<String>)) -> Result<UserRecord> {
    let (id, display_name, role, created_by) = raw;
    let role = role
        .parse::<Role>()
        .with_context(|| format!("decode role of user '{id}'"))?;
    Ok(UserRecord {
        id,
        display_name,
        role,
        created_by,
    })
}

/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
pub fn get_user(conn: &Connection, user_id: &str) -> Result<Option<UserRecord>> {
    let raw = conn
        .query_row(
            "SELECT user_id, display_name, role, created_by FROM users WHERE user_id = ?1",
            params![user_id],
            row_to_user,
        )
        .optional()
        .with_context(|| format!("get_user for '{user_id}'"))?;
    raw.map(decode_user).transpose()
}

/// Ids of users provisioned by `admin_id`, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_agents(conn: &Connection, admin_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT user_id FROM users WHERE created_by = ?1 ORDER BY created_at_us, rowid",
        )
        .context("prepare list_agents")?;
    let rows = stmt
        .query_map(params![admin_id], |row| row.get(0))
        .context("execute list_agents")?;

    let mut agents = Vec::new();
    for row in rows {
        agents.push(row.context("read agent row")?);
    }
    Ok(agents)
}

/// Every user, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored role is unknown.
pub fn list_users(conn: &Connection) -> Result<Vec<UserRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT user_id, display_name, role, created_by FROM users \
             ORDER BY created_at_us, rowid",
        )
        .context("prepare list_users")?;
    let rows = stmt.query_map([], row_to_user).context("execute list_users")?;

    let mut users = Vec::new();
    for row in rows {
        users.push(decode_user(row.context("read user row")?)?);
    }
    Ok(users)
}

/// # Errors
///
/// Returns an error if the id is taken or `created_by` names no user.
pub fn insert_user(conn: &Connection, user: &UserRecord, now_us: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, display_name, role, created_by, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id,
            user.display_name,
            user.role.as_str(),
            user.created_by,
            now_us
        ],
    )
    .with_context(|| format!("insert user '{}'", user.id))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Pipeline log
// ---------------------------------------------------------------------------

fn row_to_pipeline_entry(row: &Row<'_>) -> rusqlite::Result<PipelineEntry> {
    Ok(PipelineEntry {
        entry_id: row.get(0)?,
        lead_id: PersonId::new_unchecked(row.get::<_, String>(1)?),
        previous_status: row.get(2)?,
        current_status: row.get(3)?,
        changed_by: row.get(4)?,
        note: row.get(5)?,
        created_at_us: row.get(6)?,
    })
}

/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_pipeline_entry(
    conn: &Connection,
    entry: &NewPipelineEntry<'_>,
    now_us: i64,
) -> Result<PipelineEntry> {
    conn.execute(
        "INSERT INTO pipeline_entries
            (lead_id, previous_status, current_status, changed_by, note, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.lead_id.as_str(),
            entry.previous(),
            entry.current_status,
            entry.changed_by,
            entry.note,
            now_us
        ],
    )
    .with_context(|| format!("append pipeline entry for '{}'", entry.lead_id))?;

    Ok(PipelineEntry {
        entry_id: conn.last_insert_rowid(),
        lead_id: entry.lead_id.clone(),
        previous_status: entry.previous().map(str::to_string),
        current_status: entry.current_status.to_string(),
        changed_by: entry.changed_by.to_string(),
        note: entry.note.map(str::to_string),
        created_at_us: now_us,
    })
}

/// Entries for one lead in the order they were appended.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn pipeline_history(conn: &Connection, lead_id: &str) -> Result<Vec<PipelineEntry>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entry_id, lead_id, previous_status, current_status, changed_by, note, \
             created_at_us FROM pipeline_entries WHERE lead_id = ?1 ORDER BY entry_id",
        )
        .context("prepare pipeline_history")?;
    let rows = stmt
        .query_map(params![lead_id], row_to_pipeline_entry)
        .context("execute pipeline_history")?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row.context("read pipeline row")?);
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_activity(
    conn: &Connection,
    person_id: &PersonId,
    event: &ActivityEvent,
    now_us: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO activity_log
            (person_id, action, kind, title, description, actor_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            person_id.as_str(),
            event.action.as_str(),
            event.kind,
            event.title,
            event.description,
            event.actor_id,
            now_us
        ],
    )
    .with_context(|| format!("append activity for '{person_id}'"))?;
    Ok(conn.last_insert_rowid())
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn activity_entries(conn: &Connection, person_id: &str) -> Result<Vec<ActivityEntry>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entry_id, person_id, action, kind, title, description, actor_id, \
             created_at_us FROM activity_log WHERE person_id = ?1 ORDER BY entry_id",
        )
        .context("prepare activity_entries")?;
    let rows = stmt
        .query_map(params![person_id], |row| {
            Ok(ActivityEntry {
                entry_id: row.get(0)?,
                person_id: PersonId::new_unchecked(row.get::<_, String>(1)?),
                action: row.get(2)?,
                kind: row.get(3)?,
                title: row.get(4)?,
                description: row.get(5)?,
                actor_id: row.get(6)?,
                created_at_us: row.get(7)?,
            })
        })
        .context("execute activity_entries")?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row.context("read activity row")?);
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Status vocabularies
// ---------------------------------------------------------------------------

/// A company's options for one category, in configured order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn status_options(
    conn: &Connection,
    company_admin_id: &str,
    category: Category,
) -> Result<Vec<StatusOption>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT value, label, status_group FROM status_options \
             WHERE company_admin_id = ?1 AND category = ?2 ORDER BY position",
        )
        .context("prepare status_options")?;
    let rows = stmt
        .query_map(params![company_admin_id, category.as_str()], |row| {
            Ok(StatusOption {
                value: row.get(0)?,
                label: row.get(1)?,
                group: row.get(2)?,
            })
        })
        .context("execute status_options")?;

    let mut options = Vec::new();
    for row in rows {
        options.push(row.context("read status option row")?);
    }
    Ok(options)
}

/// Delete a company's options for the vocabulary's category and insert the
/// new list in order.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn replace_status_options(
    conn: &Connection,
    company_admin_id: &str,
    vocabulary: &StatusVocabulary,
) -> Result<()> {
    let category = vocabulary.category.as_str();
    conn.execute(
        "DELETE FROM status_options WHERE company_admin_id = ?1 AND category = ?2",
        params![company_admin_id, category],
    )
    .context("clear status options")?;

    let mut insert = conn
        .prepare_cached(
            "INSERT INTO status_options
                (company_admin_id, category, value, label, status_group, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .context("prepare status option insert")?;
    for (position, option) in (0_i64..).zip(&vocabulary.options) {
        insert
            .execute(params![
                company_admin_id,
                category,
                option.value.trim(),
                option.label,
                option.group,
                position
            ])
            .with_context(|| format!("insert status option '{}'", option.value))?;
    }
    Ok(())
}
