//! Shared setup for rolo-core integration tests.
//!
//! Two companies:
//! - `admin` with agents `u1` and `u2`
//! - `rival` with agent `r1`

#![allow(dead_code)]

use rolo_core::db::SqliteStore;
use rolo_core::model::{Role, UserRecord};
use rolo_core::phone::PhoneInput;
use rolo_core::{EngineConfig, LifecycleEngine, PersonDraft};

pub fn user(id: &str, name: &str, role: Role, created_by: Option<&str>) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        display_name: name.to_string(),
        role,
        created_by: created_by.map(str::to_string),
    }
}

pub fn seed_users(store: &SqliteStore) {
    for u in [
        user("admin", "Ada Admin", Role::CompanyAdmin, None),
        user("u1", "Jane Doe", Role::Agent, Some("admin")),
        user("u2", "John Roe", Role::Agent, Some("admin")),
        user("rival", "Rita Rival", Role::CompanyAdmin, None),
        user("r1", "Rob Rival", Role::Agent, Some("rival")),
    ] {
        store.insert_user(&u).expect("insert user");
    }
}

pub fn company_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().expect("open in-memory store");
    seed_users(&store);
    store
}

pub fn engine(store: &SqliteStore) -> LifecycleEngine<'_, SqliteStore> {
    LifecycleEngine::new(store, EngineConfig::default())
}

pub fn draft(first_name: &str, phones: &[&str], emails: &[&str]) -> PersonDraft {
    PersonDraft {
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        phones: phones.iter().map(|p| PhoneInput::combined(*p)).collect(),
        emails: emails.iter().map(|e| (*e).to_string()).collect(),
        ..PersonDraft::default()
    }
}
