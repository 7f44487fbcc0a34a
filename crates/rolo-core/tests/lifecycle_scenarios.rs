//! End-to-end lifecycle behavior against the SQLite store.
//!
//! Covers duplicate attribution across agents of one company, promotion
//! and explicit conversion, pipeline bookkeeping, delete scoping and the
//! failure paths that must leave the store untouched.

use std::collections::BTreeMap;

use anyhow::anyhow;
use rolo_core::dedup::MatchedKey;
use rolo_core::model::{
    ActivityEntry, ActivityEvent, Attachment, Category, Meeting, PersonId, PersonRecord,
    StatusOption, StatusVocabulary, Tag, Task,
};
use rolo_core::phone::PhoneInput;
use rolo_core::pipeline::PipelineStore;
use rolo_core::store::{ActivitySink, RecordStore};
use rolo_core::{EngineConfig, ErrorCode, LifecycleEngine, LifecycleError, PersonPatch};

#[path = "fixtures.rs"]
mod fixtures;
use fixtures::*;

fn lead_history(store: &rolo_core::db::SqliteStore, id: &PersonId) -> Vec<(Option<String>, String)> {
    store
        .history(id)
        .expect("read history")
        .into_iter()
        .map(|e| (e.previous_status, e.current_status))
        .collect()
}

// ---------------------------------------------------------------------------
// Duplicate detection
// ---------------------------------------------------------------------------

#[test]
fn bare_national_number_conflicts_with_international_record() {
    let store = company_store();
    let engine = engine(&store);

    let a = engine
        .create("u1", Category::Contact, draft("Alice", &["+971501234567"], &[]))
        .expect("create A");

    let err = engine
        .create("u2", Category::Contact, draft("Other", &["501234567"], &[]))
        .expect_err("duplicate must be rejected");

    assert_eq!(err.code(), ErrorCode::DuplicateConflict);
    let conflict = err.conflict().expect("conflict descriptor");
    assert_eq!(&conflict.owner.person_id, a.id());
    assert_eq!(conflict.owner.owner_id, "u1");
    assert_eq!(conflict.owner.category, Category::Contact);
    assert!(!conflict.owner.is_lead);
    assert_eq!(conflict.owner_name.as_deref(), Some("Jane Doe"));
    assert_eq!(conflict.matched, MatchedKey::Phone("501234567".to_string()));
    assert!(err.to_string().contains("owned by Jane Doe"));
    assert_eq!(store.count(Category::Contact).expect("count"), 1);
}

#[test]
fn sequential_creates_with_same_email_admit_one() {
    let store = company_store();
    let engine = engine(&store);

    engine
        .create("u1", Category::Contact, draft("First", &[], &["a@b.com"]))
        .expect("first create");
    let err = engine
        .create("u2", Category::Lead, draft("Second", &[], &["A@B.com "]))
        .expect_err("second create must conflict");
    assert!(matches!(err, LifecycleError::DuplicateConflict(_)));
    assert_eq!(store.count(Category::Lead).expect("count"), 0);
}

#[test]
fn other_companies_never_conflict() {
    let store = company_store();
    let engine = engine(&store);

    engine
        .create("u1", Category::Contact, draft("Mine", &["+971501234567"], &["a@b.com"]))
        .expect("create in first company");
    engine
        .create("r1", Category::Contact, draft("Theirs", &["+971501234567"], &["a@b.com"]))
        .expect("same identity in another company");
}

#[test]
fn leads_block_contacts_and_vice_versa() {
    let store = company_store();
    let engine = engine(&store);

    let lead = engine
        .create("admin", Category::Lead, draft("Lead", &["+14155550100"], &[]))
        .expect("create lead");
    let err = engine
        .create("u1", Category::Contact, draft("Contact", &["14155550100"], &[]))
        .expect_err("lead phone is taken");
    let conflict = err.conflict().expect("conflict");
    assert!(conflict.owner.is_lead);
    assert_eq!(&conflict.owner.person_id, lead.id());
    assert_eq!(conflict.owner_name.as_deref(), Some("Ada Admin"));
}

#[test]
fn updating_with_own_identity_is_not_a_conflict() {
    let store = company_store();
    let engine = engine(&store);

    let d = engine
        .create("u1", Category::Contact, draft("Dee", &["+971501234567"], &["old@x.com"]))
        .expect("create D");

    let patch = PersonPatch {
        emails: Some(vec!["old@x.com".to_string()]),
        phones: Some(vec![PhoneInput::combined("+971 50 123 4567")]),
        ..PersonPatch::default()
    };
    let updated = engine.update("u1", d.id(), &patch).expect("self match is ignored");
    assert_eq!(updated.person().emails, vec!["old@x.com"]);
    assert_eq!(updated.person().phones, d.person().phones);
}

#[test]
fn update_into_someone_elses_email_conflicts() {
    let store = company_store();
    let engine = engine(&store);

    engine
        .create("u1", Category::Contact, draft("One", &[], &["one@x.com"]))
        .expect("create one");
    let two = engine
        .create("u2", Category::Contact, draft("Two", &[], &["two@x.com"]))
        .expect("create two");

    let patch = PersonPatch {
        emails: Some(vec!["two@x.com".to_string(), "one@x.com".to_string()]),
        ..PersonPatch::default()
    };
    let err = engine.update("u2", two.id(), &patch).expect_err("conflict");
    assert_eq!(
        err.conflict().map(|c| c.matched.clone()),
        Some(MatchedKey::Email("one@x.com".to_string()))
    );

    let unchanged = engine.get("u2", two.id()).expect("still there");
    assert_eq!(unchanged.person().emails, vec!["two@x.com"]);
}

#[test]
fn check_duplicates_reports_without_writing() {
    let store = company_store();
    let engine = engine(&store);

    let a = engine
        .create("u1", Category::Contact, draft("Alice", &[], &["alice@x.com"]))
        .expect("create");

    let hit = engine
        .check_duplicates("u2", &[], &["ALICE@x.com".to_string()], None)
        .expect("check")
        .expect("conflict found");
    assert_eq!(&hit.owner.person_id, a.id());
    assert_eq!(hit.owner_name.as_deref(), Some("Jane Doe"));

    assert!(
        engine
            .check_duplicates("u2", &[], &["alice@x.com".to_string()], Some(a.id()))
            .expect("check")
            .is_none()
    );
}

// ---------------------------------------------------------------------------
// Promotion and status changes
// ---------------------------------------------------------------------------

#[test]
fn interested_promotes_contact_to_lead() {
    let store = company_store();
    let engine = engine(&store);

    let mut d = draft("Bea", &["+447700900123"], &["bea@x.com"]);
    d.status = Some("contacted".to_string());
    let b = engine.create("u1", Category::Contact, d).expect("create B");
    assert!(lead_history(&store, b.id()).is_empty());

    let promoted = engine
        .change_status("u1", b.id(), "interested", Some("asked for pricing"))
        .expect("promote");

    assert!(promoted.is_lead());
    assert_eq!(promoted.id(), b.id());
    assert_eq!(promoted.status(), "interested");

    let found = store.find(b.id()).expect("find").expect("exists");
    assert_eq!(found.category(), Category::Lead);
    assert_eq!(store.count(Category::Contact).expect("count"), 0);

    let history = store.history(b.id()).expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].previous_status.as_deref(), Some("contacted"));
    assert_eq!(history[0].current_status, "interested");
    assert_eq!(history[0].changed_by, "u1");
    assert_eq!(history[0].note.as_deref(), Some("asked for pricing"));
}

#[test]
fn lead_transitions_append_one_entry_each() {
    let store = company_store();
    let engine = engine(&store);

    let c = engine
        .create("u1", Category::Lead, draft("Cal", &[], &["cal@x.com"]))
        .expect("create C");
    engine
        .change_status("u1", c.id(), "followup", None)
        .expect("followup");
    assert_eq!(lead_history(&store, c.id()).len(), 2);

    let won = engine.change_status("u2", c.id(), "win", None).expect("win");
    assert_eq!(won.status(), "win");

    let history = lead_history(&store, c.id());
    assert_eq!(
        history,
        vec![
            (None, "interested".to_string()),
            (Some("interested".to_string()), "followup".to_string()),
            (Some("followup".to_string()), "win".to_string()),
        ]
    );
}

#[test]
fn contact_status_change_writes_no_pipeline_entry() {
    let store = company_store();
    let engine = engine(&store);

    let c = engine
        .create("u1", Category::Contact, draft("Cora", &[], &["cora@x.com"]))
        .expect("create");
    assert_eq!(c.status(), "");

    let updated = engine
        .change_status("u1", c.id(), "unreachable", None)
        .expect("status");
    assert_eq!(updated.category(), Category::Contact);
    assert_eq!(updated.status(), "unreachable");
    assert!(lead_history(&store, c.id()).is_empty());
}

#[test]
fn same_status_still_records_a_transition() {
    let store = company_store();
    let engine = engine(&store);

    let lead = engine
        .create("u1", Category::Lead, draft("Sam", &[], &["sam@x.com"]))
        .expect("create");
    engine
        .change_status("u1", lead.id(), "interested", None)
        .expect("same status");
    assert_eq!(
        lead_history(&store, lead.id()).last(),
        Some(&(Some("interested".to_string()), "interested".to_string()))
    );
}

#[test]
fn statuses_outside_the_vocabulary_are_rejected() {
    let store = company_store();
    let engine = engine(&store);

    let contact = engine
        .create("u1", Category::Contact, draft("Val", &[], &["val@x.com"]))
        .expect("create contact");
    let err = engine
        .change_status("u1", contact.id(), "win", None)
        .expect_err("lead status on a contact");
    assert!(matches!(
        err,
        LifecycleError::InvalidStatus { category: Category::Contact, .. }
    ));

    let lead = engine
        .create("u1", Category::Lead, draft("Lee", &[], &["lee@x.com"]))
        .expect("create lead");
    let err = engine
        .change_status("u1", lead.id(), "", None)
        .expect_err("leads need a status");
    assert_eq!(err.code(), ErrorCode::InvalidStatus);
    assert_eq!(lead_history(&store, lead.id()).len(), 1);
}

#[test]
fn company_vocabulary_overrides_defaults() {
    let store = company_store();
    let engine = engine(&store);

    let vocab = StatusVocabulary::new(
        Category::Lead,
        vec![
            StatusOption::new("hot", "Hot", Some("open")),
            StatusOption::new("cold", "Cold", Some("closed")),
        ],
    );
    let err = engine.set_vocabulary("u1", &vocab).expect_err("agents cannot");
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    engine.set_vocabulary("admin", &vocab).expect("admin can");

    let lead = engine
        .create("u2", Category::Lead, draft("Hal", &[], &["hal@x.com"]))
        .expect("interested is always allowed");
    assert_eq!(lead.status(), "interested");
    engine.change_status("u2", lead.id(), "hot", None).expect("custom status");
    assert!(engine.change_status("u2", lead.id(), "win", None).is_err());

    let rival_lead = engine
        .create("r1", Category::Lead, draft("Ray", &[], &["ray@x.com"]))
        .expect("rival create");
    engine
        .change_status("r1", rival_lead.id(), "win", None)
        .expect("rival keeps defaults");

    assert_eq!(
        engine.vocabulary("u1", Category::Lead).expect("vocab"),
        vocab
    );
}

#[test]
fn retired_status_does_not_block_field_edits() {
    let store = company_store();
    let engine = engine(&store);

    let mut d = draft("Val", &[], &["val@x.com"]);
    d.status = Some("contacted".to_string());
    let rec = engine.create("u1", Category::Contact, d).expect("create");

    let vocab = StatusVocabulary::new(
        Category::Contact,
        vec![StatusOption::new("cold", "Cold", None)],
    );
    engine.set_vocabulary("admin", &vocab).expect("admin can");

    let patch = PersonPatch {
        first_name: Some("Valerie".to_string()),
        ..PersonPatch::default()
    };
    let updated = engine.update("u1", rec.id(), &patch).expect("name-only edit");
    assert_eq!(updated.person().first_name, "Valerie");
    assert_eq!(updated.status(), "contacted");

    let restated = PersonPatch {
        status: Some("contacted".to_string()),
        ..PersonPatch::default()
    };
    let err = engine
        .update("u1", rec.id(), &restated)
        .expect_err("explicit status is still validated");
    assert_eq!(err.code(), ErrorCode::InvalidStatus);
}

#[test]
fn blank_status_on_a_new_lead_means_interested() {
    let store = company_store();
    let engine = engine(&store);

    let mut d = draft("Bly", &[], &["bly@x.com"]);
    d.status = Some("  ".to_string());
    let lead = engine.create("u1", Category::Lead, d).expect("create lead");
    assert_eq!(lead.status(), "interested");
    assert_eq!(
        lead_history(&store, lead.id()),
        vec![(None, "interested".to_string())]
    );
}

#[test]
fn creating_contact_as_interested_materializes_a_lead() {
    let store = company_store();
    let engine = engine(&store);

    let mut d = draft("Ivy", &[], &["ivy@x.com"]);
    d.status = Some("interested".to_string());
    let record = engine.create("u1", Category::Contact, d).expect("create");
    assert!(record.is_lead());
    assert_eq!(lead_history(&store, record.id()), vec![(None, "interested".to_string())]);
}

// ---------------------------------------------------------------------------
// Explicit conversion
// ---------------------------------------------------------------------------

fn rich_draft() -> rolo_core::PersonDraft {
    let mut d = draft("Rich", &["+33612345678"], &["rich@x.com"]);
    d.status = Some("contacted".to_string());
    d.tags = vec![
        Tag {
            name: "vip".to_string(),
            color: Some("gold".to_string()),
            extra: BTreeMap::new(),
        },
        Tag {
            name: "expo".to_string(),
            color: None,
            extra: BTreeMap::from([("booth".to_string(), serde_json::json!(42))]),
        },
    ];
    d.tasks = vec![Task {
        id: "t1".to_string(),
        title: "Send deck".to_string(),
        due_at_us: Some(1_700_000_000_000_000),
        done: false,
        extra: BTreeMap::new(),
    }];
    d.meetings = vec![Meeting {
        id: "m1".to_string(),
        title: "Intro".to_string(),
        starts_at_us: 1_700_000_000_000_000,
        ends_at_us: None,
        location: Some("Dubai".to_string()),
        extra: BTreeMap::new(),
    }];
    d.attachments = vec![Attachment {
        id: "a1".to_string(),
        file_name: "card.png".to_string(),
        url: "https://files.example/card.png".to_string(),
        size_bytes: Some(1024),
        extra: BTreeMap::new(),
    }];
    d
}

#[test]
fn category_switch_round_trip_preserves_sub_documents() {
    let store = company_store();
    let engine = engine(&store);

    let original = engine
        .create("u1", Category::Contact, rich_draft())
        .expect("create");

    let to_lead = PersonPatch {
        category: Some(Category::Lead),
        ..PersonPatch::default()
    };
    let lead = engine.update("u1", original.id(), &to_lead).expect("to lead");
    assert!(lead.is_lead());
    assert_eq!(lead.status(), "interested");
    assert_eq!(
        lead_history(&store, original.id()),
        vec![(Some("contacted".to_string()), "interested".to_string())]
    );

    let to_contact = PersonPatch {
        category: Some(Category::Contact),
        ..PersonPatch::default()
    };
    let back = engine.update("admin", original.id(), &to_contact).expect("to contact");
    assert_eq!(back.category(), Category::Contact);
    assert_eq!(back.status(), "");

    let (before, after) = (original.person(), back.person());
    assert_eq!(after.id, before.id);
    assert_eq!(after.owner_id, before.owner_id);
    assert_eq!(after.tags, before.tags);
    assert_eq!(after.tasks, before.tasks);
    assert_eq!(after.meetings, before.meetings);
    assert_eq!(after.attachments, before.attachments);
    assert_eq!(after.emails, before.emails);
    assert_eq!(after.phones, before.phones);
    assert_eq!(after.created_at_us, before.created_at_us);

    let actions: Vec<String> = engine
        .activity("u1", original.id())
        .expect("activity")
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["created", "converted", "converted"]);

    // The lead's pipeline trail is kept after demotion.
    assert_eq!(lead_history(&store, original.id()).len(), 1);
}

#[test]
fn explicit_contact_with_interested_is_contradictory() {
    let store = company_store();
    let engine = engine(&store);

    let lead = engine
        .create("u1", Category::Lead, draft("Lena", &[], &["lena@x.com"]))
        .expect("create");
    let patch = PersonPatch {
        category: Some(Category::Contact),
        status: Some("interested".to_string()),
        ..PersonPatch::default()
    };
    let err = engine.update("u1", lead.id(), &patch).expect_err("contradiction");
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert!(store.find(lead.id()).expect("find").is_some_and(|r| r.is_lead()));
}

#[test]
fn status_via_update_on_lead_is_tracked() {
    let store = company_store();
    let engine = engine(&store);

    let lead = engine
        .create("u1", Category::Lead, draft("Uma", &[], &["uma@x.com"]))
        .expect("create");
    let patch = PersonPatch {
        status: Some("proposal".to_string()),
        first_name: Some("Uma B".to_string()),
        ..PersonPatch::default()
    };
    let updated = engine.update("u1", lead.id(), &patch).expect("update");
    assert_eq!(updated.status(), "proposal");
    assert_eq!(updated.person().first_name, "Uma B");
    assert_eq!(
        lead_history(&store, lead.id()).last(),
        Some(&(Some("interested".to_string()), "proposal".to_string()))
    );

    let rename_only = PersonPatch {
        last_name: Some("Bee".to_string()),
        ..PersonPatch::default()
    };
    engine.update("u1", lead.id(), &rename_only).expect("rename");
    assert_eq!(lead_history(&store, lead.id()).len(), 2);
}

#[test]
fn failed_promotion_leaves_contact_untouched() {
    let store = company_store();
    let engine = engine(&store);

    let mut d = draft("Fay", &[], &["fay@x.com"]);
    d.status = Some("contacted".to_string());
    let contact = engine.create("u1", Category::Contact, d).expect("create");

    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER freeze_leads BEFORE INSERT ON leads
             BEGIN SELECT RAISE(ABORT, 'leads are frozen'); END;",
        )
        .expect("install trigger");

    let err = engine
        .change_status("u1", contact.id(), "interested", None)
        .expect_err("insert into leads fails");
    assert!(matches!(
        err,
        LifecycleError::ConversionFailure {
            from: Category::Contact,
            to: Category::Lead,
            ..
        }
    ));
    assert_eq!(err.code(), ErrorCode::ConversionFailure);

    let still = store.find(contact.id()).expect("find").expect("exists");
    assert_eq!(still, contact);
    assert!(lead_history(&store, contact.id()).is_empty());
    assert!(store.connection().is_autocommit());
}

// ---------------------------------------------------------------------------
// Scoping and deletes
// ---------------------------------------------------------------------------

#[test]
fn delete_is_limited_to_management_scope() {
    let store = company_store();
    let engine = engine(&store);

    let rec = engine
        .create("u1", Category::Contact, draft("Del", &[], &["del@x.com"]))
        .expect("create");

    let err = engine.delete("u2", rec.id()).expect_err("peer agent cannot delete");
    assert_eq!(err.code(), ErrorCode::RecordNotFound);
    assert!(engine.delete("rival", rec.id()).is_err());

    let removed = engine.delete("admin", rec.id()).expect("admin deletes agent record");
    assert_eq!(removed.id(), rec.id());
    assert!(store.find(rec.id()).expect("find").is_none());
    assert!(engine.delete("admin", rec.id()).is_err());
}

#[test]
fn other_companies_cannot_see_or_change_records() {
    let store = company_store();
    let engine = engine(&store);

    let rec = engine
        .create("u1", Category::Lead, draft("Hid", &[], &["hid@x.com"]))
        .expect("create");

    assert!(matches!(
        engine.get("r1", rec.id()),
        Err(LifecycleError::RecordNotFound { .. })
    ));
    assert!(engine.change_status("rival", rec.id(), "win", None).is_err());
    assert!(engine.history("r1", rec.id()).is_err());
    assert_eq!(engine.history("u2", rec.id()).expect("same company").len(), 1);
}

#[test]
fn unknown_actor_cannot_write() {
    let store = company_store();
    let engine = engine(&store);
    let err = engine
        .create("ghost", Category::Contact, draft("Nobody", &[], &["n@x.com"]))
        .expect_err("no such user");
    assert_eq!(err.code(), ErrorCode::ScopeResolution);
}

#[test]
fn oversized_company_refuses_duplicate_scan() {
    let store = company_store();
    let engine = LifecycleEngine::new(
        &store,
        EngineConfig {
            max_company_records: 1,
            ..EngineConfig::default()
        },
    );

    engine
        .create("u1", Category::Contact, draft("One", &[], &["one@x.com"]))
        .expect("first fits");
    engine
        .create("u1", Category::Contact, draft("Two", &[], &["two@x.com"]))
        .expect("scan of one record is within the ceiling");
    let err = engine
        .create("u2", Category::Contact, draft("Three", &[], &["three@x.com"]))
        .expect_err("two records exceed the ceiling");
    assert_eq!(err.code(), ErrorCode::ScopeTooLarge);
}

// ---------------------------------------------------------------------------
// Input handling
// ---------------------------------------------------------------------------

#[test]
fn phone_only_identity_must_parse() {
    let store = company_store();
    let engine = engine(&store);

    let err = engine
        .create("u1", Category::Contact, draft("Pat", &["call me"], &[]))
        .expect_err("no usable identity");
    assert_eq!(err.code(), ErrorCode::InvalidPhoneFormat);

    let ok = engine
        .create("u1", Category::Contact, draft("Pat", &["call me"], &["pat@x.com"]))
        .expect("email keeps the record identifiable");
    assert!(ok.person().phones.is_empty());
}

#[test]
fn names_are_required() {
    let store = company_store();
    let engine = engine(&store);

    let mut blank = draft("  ", &[], &["blank@x.com"]);
    blank.last_name = String::new();
    let err = engine
        .create("u1", Category::Contact, blank)
        .expect_err("blank names");
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    let mut last_only = draft("", &[], &["last@x.com"]);
    last_only.last_name = " Solo ".to_string();
    let rec = engine
        .create("u1", Category::Contact, last_only)
        .expect("a last name is enough");
    assert_eq!(rec.person().last_name, "Solo");
}

// ---------------------------------------------------------------------------
// Activity sink failures
// ---------------------------------------------------------------------------

struct BrokenSink;

impl ActivitySink for BrokenSink {
    fn append(&self, _person_id: &PersonId, _event: &ActivityEvent) -> anyhow::Result<()> {
        Err(anyhow!("activity backend offline"))
    }

    fn entries(&self, _person_id: &PersonId) -> anyhow::Result<Vec<ActivityEntry>> {
        Ok(Vec::new())
    }
}

#[test]
fn activity_failures_do_not_fail_operations() {
    let store = company_store();
    let sink = BrokenSink;
    let engine = LifecycleEngine::with_activity(&store, &sink, EngineConfig::default());

    let rec = engine
        .create("u1", Category::Contact, draft("Ann", &[], &["ann@x.com"]))
        .expect("create despite sink failure");
    let promoted = engine
        .change_status("u1", rec.id(), "interested", None)
        .expect("promote despite sink failure");
    assert!(matches!(promoted, PersonRecord::Lead(_)));
    assert!(engine.activity("u1", rec.id()).expect("activity").is_empty());
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_creates_with_same_email_admit_one() {
    use rolo_core::db::{DEFAULT_BUSY_TIMEOUT, SqliteStore};
    use std::sync::{Arc, Barrier};

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rolo.sqlite3");
    {
        let store = SqliteStore::open(&path, DEFAULT_BUSY_TIMEOUT).expect("open");
        seed_users(&store);
    }

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["u1", "u2"]
        .into_iter()
        .map(|actor| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let store = SqliteStore::open(&path, DEFAULT_BUSY_TIMEOUT).expect("open");
                let engine = LifecycleEngine::new(&store, EngineConfig::default());
                barrier.wait();
                engine
                    .create(actor, Category::Contact, draft(actor, &[], &["a@b.com"]))
                    .map(|_| ())
                    .map_err(|e| e.code())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();
    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1, "results: {results:?}");
    assert!(results.contains(&Err(ErrorCode::DuplicateConflict)));

    let store = SqliteStore::open(&path, DEFAULT_BUSY_TIMEOUT).expect("reopen");
    assert_eq!(store.count(Category::Contact).expect("count"), 1);
}
