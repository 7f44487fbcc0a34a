//! Canonical SQLite schema for rolo.
//!
//! - `users` is the owner directory; `created_by` links agents to the
//!   company admin that provisioned them
//! - `contacts` and `leads` share one shape so a conversion is a plain
//!   insert into the other table plus a delete
//! - sub-documents live in JSON columns and are copied verbatim
//! - `pipeline_entries` and `activity_log` are append-only and keyed by
//!   person id, without a foreign key, so they survive conversions
//! - `status_options` holds per-company vocabularies

/// Migration v1: directory, person collections and the two logs.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY CHECK (length(trim(user_id)) > 0),
    display_name TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('company_admin', 'agent', 'user')),
    created_by TEXT REFERENCES users(user_id) ON DELETE SET NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    person_id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    emails_json TEXT NOT NULL DEFAULT '[]',
    phones_json TEXT NOT NULL DEFAULT '[]',
    details_json TEXT NOT NULL DEFAULT '{}',
    status TEXT NOT NULL DEFAULT '',
    is_favourite INTEGER NOT NULL DEFAULT 0 CHECK (is_favourite IN (0, 1)),
    tags_json TEXT NOT NULL DEFAULT '[]',
    tasks_json TEXT NOT NULL DEFAULT '[]',
    meetings_json TEXT NOT NULL DEFAULT '[]',
    attachments_json TEXT NOT NULL DEFAULT '[]',
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (person_id LIKE 'ps-%')
);

CREATE TABLE IF NOT EXISTS leads (
    person_id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    emails_json TEXT NOT NULL DEFAULT '[]',
    phones_json TEXT NOT NULL DEFAULT '[]',
    details_json TEXT NOT NULL DEFAULT '{}',
    status TEXT NOT NULL CHECK (length(status) > 0),
    is_favourite INTEGER NOT NULL DEFAULT 0 CHECK (is_favourite IN (0, 1)),
    tags_json TEXT NOT NULL DEFAULT '[]',
    tasks_json TEXT NOT NULL DEFAULT '[]',
    meetings_json TEXT NOT NULL DEFAULT '[]',
    attachments_json TEXT NOT NULL DEFAULT '[]',
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (person_id LIKE 'ps-%')
);

CREATE TABLE IF NOT EXISTS pipeline_entries (
    entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
    lead_id TEXT NOT NULL,
    previous_status TEXT,
    current_status TEXT NOT NULL,
    changed_by TEXT NOT NULL,
    note TEXT,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_log (
    entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
    person_id TEXT NOT NULL,
    action TEXT NOT NULL,
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    actor_id TEXT NOT NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);

CREATE INDEX IF NOT EXISTS idx_users_created_by
    ON users(created_by);

CREATE INDEX IF NOT EXISTS idx_contacts_owner
    ON contacts(owner_id);

CREATE INDEX IF NOT EXISTS idx_leads_owner
    ON leads(owner_id);

CREATE INDEX IF NOT EXISTS idx_leads_status
    ON leads(status);

CREATE INDEX IF NOT EXISTS idx_pipeline_lead
    ON pipeline_entries(lead_id, entry_id);

CREATE INDEX IF NOT EXISTS idx_activity_person
    ON activity_log(person_id, entry_id);
";

/// Migration v2: per-company status vocabularies.
pub const MIGRATION_V2_SQL: &str = r"
CREATE TABLE IF NOT EXISTS status_options (
    company_admin_id TEXT NOT NULL,
    category TEXT NOT NULL CHECK (category IN ('contact', 'lead')),
    value TEXT NOT NULL CHECK (length(trim(value)) > 0),
    label TEXT NOT NULL,
    status_group TEXT,
    position INTEGER NOT NULL,
    PRIMARY KEY (company_admin_id, category, value)
);

CREATE INDEX IF NOT EXISTS idx_status_options_order
    ON status_options(company_admin_id, category, position);
";

/// Indexes expected by the dedup scan and log reads.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_users_created_by",
    "idx_contacts_owner",
    "idx_leads_owner",
    "idx_leads_status",
    "idx_pipeline_lead",
    "idx_activity_person",
    "idx_status_options_order",
];
