//! The Contact/Lead lifecycle.
//!
//! [`LifecycleEngine`] owns every mutation of a person record. Each write
//! resolves the actor's company, runs the duplicate guard against a fresh
//! index and performs the mutation inside one store write unit, so the
//! check and the write cannot interleave with another writer.
//!
//! Conversion between Contact and Lead is create-then-delete inside that
//! unit. Activity-log entries are appended after commit and never fail the
//! operation.

pub mod input;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::dedup::{Conflict, DuplicateGuard, build_index};
use crate::error::{LifecycleError, LifecycleResult};
use crate::model::{
    ActivityAction, ActivityEntry, ActivityEvent, Category, INTERESTED, Person, PersonId,
    PersonRecord, Phone, StatusOption, StatusVocabulary,
    status::{default_contact_statuses, default_lead_statuses},
};
use crate::phone::PhoneInput;
use crate::pipeline::{NewPipelineEntry, PipelineEntry, PipelineStore};
use crate::scope::{CompanyScope, management_scope, resolve_company};
use crate::store::{ActivitySink, RecordStore, StatusCatalog, UserDirectory};

pub use input::{PersonDraft, PersonPatch, clean_emails, clean_phones};
use input::clean_status;

/// Default ceiling on records scanned per company by the duplicate index.
pub const DEFAULT_MAX_COMPANY_RECORDS: usize = 50_000;

/// Everything the engine needs from persistent storage.
pub trait LifecycleStore: RecordStore + UserDirectory + PipelineStore + StatusCatalog {}

impl<T> LifecycleStore for T where T: RecordStore + UserDirectory + PipelineStore + StatusCatalog {}

/// Engine tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_company_records: usize,
    /// Used for companies that configured no contact statuses.
    pub contact_statuses: Vec<StatusOption>,
    /// Used for companies that configured no lead statuses.
    pub lead_statuses: Vec<StatusOption>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_company_records: DEFAULT_MAX_COMPANY_RECORDS,
            contact_statuses: default_contact_statuses(),
            lead_statuses: default_lead_statuses(),
        }
    }
}

pub struct LifecycleEngine<'a, S, A = S> {
    store: &'a S,
    activity: &'a A,
    config: EngineConfig,
}

impl<'a, S> LifecycleEngine<'a, S, S>
where
    S: LifecycleStore + ActivitySink,
{
    /// Engine whose store also keeps the activity log.
    #[must_use]
    pub const fn new(store: &'a S, config: EngineConfig) -> Self {
        Self {
            store,
            activity: store,
            config,
        }
    }
}

impl<'a, S, A> LifecycleEngine<'a, S, A>
where
    S: LifecycleStore,
    A: ActivitySink,
{
    #[must_use]
    pub const fn with_activity(store: &'a S, activity: &'a A, config: EngineConfig) -> Self {
        Self {
            store,
            activity,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a Contact or Lead owned by `actor_id`.
    ///
    /// A Contact requested with status `interested` is created as a Lead.
    /// Every new Lead gets an initial pipeline entry.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::DuplicateConflict`] if a phone or email
    /// is already held inside the company, plus the scope, status, phone
    /// and storage failures described on [`LifecycleError`].
    pub fn create(
        &self,
        actor_id: &str,
        category: Category,
        draft: PersonDraft,
    ) -> LifecycleResult<PersonRecord> {
        let scope = resolve_company(self.store, actor_id)?;

        let first_name = draft.first_name.trim().to_string();
        let last_name = draft.last_name.trim().to_string();
        if first_name.is_empty() && last_name.is_empty() {
            return Err(LifecycleError::InvalidInput(
                "a first or last name is required".to_string(),
            ));
        }
        let emails = clean_emails(&draft.emails);
        let phones = clean_phones(&draft.phones, &emails)?;

        let requested = draft
            .status
            .as_deref()
            .map(clean_status)
            .filter(|s| !s.is_empty());
        let (category, status) = match (category, requested) {
            (Category::Contact, Some(s)) if s == INTERESTED => (Category::Lead, s),
            (Category::Lead, None) => (Category::Lead, INTERESTED.to_string()),
            (category, status) => (category, status.unwrap_or_default()),
        };
        self.ensure_status(&scope.admin_id, category, &status)?;

        let now = now_us();
        let record = PersonRecord::new(
            category,
            Person {
                id: PersonId::generate(),
                owner_id: actor_id.to_string(),
                first_name,
                last_name,
                emails,
                phones,
                details: draft.details,
                status,
                is_favourite: draft.is_favourite,
                tags: draft.tags,
                tasks: draft.tasks,
                meetings: draft.meetings,
                attachments: draft.attachments,
                created_at_us: now,
                updated_at_us: now,
            },
        );

        self.store.write_txn(|| -> LifecycleResult<()> {
            let person = record.person();
            self.guard_identity(&scope, &person.phones, &person.emails, None)?;
            self.store.insert(&record)?;
            if record.is_lead() {
                self.log_transition(record.id(), None, record.status(), actor_id, None)?;
            }
            Ok(())
        })?;

        info!(
            person_id = %record.id(),
            category = %record.category(),
            owner_id = actor_id,
            "created person"
        );
        self.record_activity(
            record.id(),
            ActivityEvent {
                action: ActivityAction::Created,
                kind: record.category().as_str().to_string(),
                title: format!("{} created", title_case(record.category())),
                description: format!("{} added by {actor_id}", record.person().display_name()),
                actor_id: actor_id.to_string(),
            },
        );
        Ok(record)
    }

    /// Apply a partial update, converting when the category changes.
    ///
    /// The duplicate guard runs (excluding the record itself) whenever the
    /// patch carries emails or phones. A status supplied for a Lead records
    /// a pipeline entry even when it equals the current status.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::RecordNotFound`] if `id` is not held by
    /// anyone in the actor's company, [`LifecycleError::DuplicateConflict`]
    /// on an identity clash and [`LifecycleError::ConversionFailure`] if a
    /// category switch cannot be written.
    pub fn update(
        &self,
        actor_id: &str,
        id: &PersonId,
        patch: &PersonPatch,
    ) -> LifecycleResult<PersonRecord> {
        let scope = resolve_company(self.store, actor_id)?;
        let now = now_us();

        let (record, event) =
            self.store
                .write_txn(|| -> LifecycleResult<(PersonRecord, ActivityEvent)> {
                    let current = self.find_owned(id, actor_id, &scope.members)?;
                    let from = current.category();
                    let mut person = current.into_person();

                    if let Some(emails) = &patch.emails {
                        person.emails = clean_emails(emails);
                    }
                    if let Some(phones) = &patch.phones {
                        person.phones = clean_phones(phones, &person.emails)?;
                    }
                    if patch.touches_identity() {
                        self.guard_identity(&scope, &person.phones, &person.emails, Some(id))?;
                    }
                    patch.apply_descriptive(&mut person);
                    person.updated_at_us = now;

                    let requested = patch.status.as_deref().map(clean_status);
                    let target = target_category(from, patch.category, requested.as_deref())?;
                    let status = match &requested {
                        Some(status) => status.clone(),
                        None if target == from => person.status.clone(),
                        None => default_status(target),
                    };
                    if requested.is_some() || target != from {
                        self.ensure_status(&scope.admin_id, target, &status)?;
                    }

                    let previous = std::mem::replace(&mut person.status, status);
                    if target == from {
                        let record = PersonRecord::new(target, person);
                        self.store.replace(&record)?;
                        if record.is_lead() && requested.is_some() {
                            self.log_transition(id, Some(&previous), record.status(), actor_id, None)?;
                        }
                        let event = ActivityEvent {
                            action: ActivityAction::Updated,
                            kind: target.as_str().to_string(),
                            title: format!("{} updated", title_case(target)),
                            description: format!(
                                "{} updated by {actor_id}",
                                record.person().display_name()
                            ),
                            actor_id: actor_id.to_string(),
                        };
                        return Ok((record, event));
                    }

                    let record = PersonRecord::new(target, person);
                    self.convert_in_place(from, &record)?;
                    if record.is_lead() {
                        self.log_transition(id, Some(&previous), record.status(), actor_id, None)?;
                    }
                    let event = conversion_event(from, &record, actor_id);
                    Ok((record, event))
                })?;

        info!(person_id = %id, category = %record.category(), actor_id, "updated person");
        self.record_activity(id, event);
        Ok(record)
    }

    /// Move a record to `new_status`.
    ///
    /// A Contact moving to `interested` is promoted to a Lead. Every Lead
    /// transition appends one pipeline entry.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::RecordNotFound`] if `id` is not held by
    /// anyone in the actor's company, [`LifecycleError::InvalidStatus`] if
    /// the status is outside the company vocabulary and
    /// [`LifecycleError::ConversionFailure`] if a promotion cannot be
    /// written.
    pub fn change_status(
        &self,
        actor_id: &str,
        id: &PersonId,
        new_status: &str,
        note: Option<&str>,
    ) -> LifecycleResult<PersonRecord> {
        let scope = resolve_company(self.store, actor_id)?;
        let new_status = clean_status(new_status);
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        let now = now_us();

        let (record, event) =
            self.store
                .write_txn(|| -> LifecycleResult<(PersonRecord, ActivityEvent)> {
                    let current = self.find_owned(id, actor_id, &scope.members)?;
                    let from = current.category();
                    let previous = current.status().to_string();

                    if from == Category::Contact && new_status == INTERESTED {
                        let record = current.converted(Category::Lead, INTERESTED, now);
                        self.convert_in_place(from, &record)?;
                        self.log_transition(id, Some(&previous), INTERESTED, actor_id, note)?;
                        let event = conversion_event(from, &record, actor_id);
                        return Ok((record, event));
                    }

                    self.ensure_status(&scope.admin_id, from, &new_status)?;
                    let mut record = current;
                    let person = record.person_mut();
                    person.status.clone_from(&new_status);
                    person.updated_at_us = now;
                    self.store.replace(&record)?;
                    if record.is_lead() {
                        self.log_transition(id, Some(&previous), &new_status, actor_id, note)?;
                    }
                    let event = ActivityEvent {
                        action: ActivityAction::StatusChanged,
                        kind: from.as_str().to_string(),
                        title: "Status changed".to_string(),
                        description: format!(
                            "{} -> {}",
                            display_status(&previous),
                            display_status(&new_status)
                        ),
                        actor_id: actor_id.to_string(),
                    };
                    Ok((record, event))
                })?;

        info!(
            person_id = %id,
            category = %record.category(),
            status = record.status(),
            actor_id,
            "changed status"
        );
        self.record_activity(id, event);
        Ok(record)
    }

    /// Delete a record owned by the actor, or by one of its agents when the
    /// actor is a company admin. Returns the removed record.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::RecordNotFound`] if no such record is
    /// within the actor's management scope.
    pub fn delete(&self, actor_id: &str, id: &PersonId) -> LifecycleResult<PersonRecord> {
        let owners = management_scope(self.store, actor_id)?;
        let record = self.store.write_txn(|| -> LifecycleResult<PersonRecord> {
            let record = self.find_owned(id, actor_id, &owners)?;
            if !self.store.remove(record.category(), id)? {
                return Err(not_found(id, actor_id));
            }
            Ok(record)
        })?;
        info!(person_id = %id, category = %record.category(), actor_id, "deleted person");
        Ok(record)
    }

    /// Fetch a record held by anyone in the actor's company.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::RecordNotFound`] if it is not visible.
    pub fn get(&self, actor_id: &str, id: &PersonId) -> LifecycleResult<PersonRecord> {
        let scope = resolve_company(self.store, actor_id)?;
        self.find_owned(id, actor_id, &scope.members)
    }

    /// Pipeline entries for a visible record, oldest first.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::RecordNotFound`] if it is not visible.
    pub fn history(&self, actor_id: &str, id: &PersonId) -> LifecycleResult<Vec<PipelineEntry>> {
        self.get(actor_id, id)?;
        Ok(self.store.history(id)?)
    }

    /// Activity log for a visible record, oldest first.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::RecordNotFound`] if it is not visible.
    pub fn activity(&self, actor_id: &str, id: &PersonId) -> LifecycleResult<Vec<ActivityEntry>> {
        self.get(actor_id, id)?;
        Ok(self.activity.entries(id)?)
    }

    /// Run the duplicate guard without writing anything.
    ///
    /// # Errors
    ///
    /// Fails if the company cannot be resolved or scanned.
    pub fn check_duplicates(
        &self,
        actor_id: &str,
        phones: &[PhoneInput],
        emails: &[String],
        exclude: Option<&PersonId>,
    ) -> LifecycleResult<Option<Conflict>> {
        let scope = resolve_company(self.store, actor_id)?;
        let index = build_index(self.store, &scope, self.config.max_company_records)?;
        let emails = clean_emails(emails);
        Ok(DuplicateGuard::new(&index)
            .find_conflict_in_inputs(phones, &emails, exclude)
            .map(|c| self.attribute(c)))
    }

    /// Effective status vocabulary for the actor's company.
    ///
    /// # Errors
    ///
    /// Fails if the company cannot be resolved or the catalog read fails.
    pub fn vocabulary(&self, actor_id: &str, category: Category) -> LifecycleResult<StatusVocabulary> {
        let scope = resolve_company(self.store, actor_id)?;
        self.vocabulary_for(&scope.admin_id, category)
    }

    /// Replace the company's statuses for one category. Only the company's
    /// root user may do this.
    ///
    /// # Errors
    ///
    /// Fails with [`LifecycleError::InvalidInput`] if the actor is not the
    /// company root or the vocabulary has blank or repeated values.
    pub fn set_vocabulary(
        &self,
        actor_id: &str,
        vocabulary: &StatusVocabulary,
    ) -> LifecycleResult<()> {
        let scope = resolve_company(self.store, actor_id)?;
        if scope.admin_id != actor_id {
            return Err(LifecycleError::InvalidInput(format!(
                "only '{}' can change this company's statuses",
                scope.admin_id
            )));
        }
        let mut seen = Vec::with_capacity(vocabulary.options.len());
        for option in &vocabulary.options {
            let value = option.value.trim();
            if value.is_empty() || seen.contains(&value) {
                return Err(LifecycleError::InvalidInput(format!(
                    "status value '{value}' is blank or repeated"
                )));
            }
            seen.push(value);
        }
        self.store.set_vocabulary(&scope.admin_id, vocabulary)?;
        info!(
            admin_id = %scope.admin_id,
            category = %vocabulary.category,
            options = vocabulary.options.len(),
            "replaced status vocabulary"
        );
        Ok(())
    }

    fn find_owned(
        &self,
        id: &PersonId,
        actor_id: &str,
        owners: &[String],
    ) -> LifecycleResult<PersonRecord> {
        self.store
            .find(id)?
            .filter(|r| owners.iter().any(|o| *o == r.person().owner_id))
            .ok_or_else(|| not_found(id, actor_id))
    }

    fn guard_identity(
        &self,
        scope: &CompanyScope,
        phones: &[Phone],
        emails: &[String],
        exclude: Option<&PersonId>,
    ) -> LifecycleResult<()> {
        if phones.is_empty() && emails.is_empty() {
            return Ok(());
        }
        let index = build_index(self.store, scope, self.config.max_company_records)?;
        match DuplicateGuard::new(&index).find_conflict(phones, emails, exclude) {
            Some(conflict) => Err(LifecycleError::DuplicateConflict(Box::new(
                self.attribute(conflict),
            ))),
            None => Ok(()),
        }
    }

    fn attribute(&self, mut conflict: Conflict) -> Conflict {
        match self.store.user(&conflict.owner.owner_id) {
            Ok(user) => conflict.owner_name = user.map(|u| u.display_name),
            Err(err) => warn!(
                owner_id = %conflict.owner.owner_id,
                error = %format!("{err:#}"),
                "owner lookup failed; conflict left unattributed"
            ),
        }
        conflict
    }

    /// Insert `record` (already in its target category), then delete the
    /// `from` row carrying the same id.
    fn convert_in_place(&self, from: Category, record: &PersonRecord) -> LifecycleResult<()> {
        let id = record.id();
        let to = record.category();
        let fail = |source: anyhow::Error| LifecycleError::ConversionFailure {
            id: id.clone(),
            from,
            to,
            source,
        };

        self.store.insert(record).map_err(fail)?;
        let removed = self.store.remove(from, id).map_err(fail)?;
        if !removed {
            return Err(fail(anyhow!("{from} row disappeared during conversion")));
        }
        debug!(person_id = %id, %from, %to, "converted person");
        Ok(())
    }

    fn log_transition(
        &self,
        lead_id: &PersonId,
        previous_status: Option<&str>,
        current_status: &str,
        changed_by: &str,
        note: Option<&str>,
    ) -> LifecycleResult<PipelineEntry> {
        let entry = NewPipelineEntry {
            lead_id,
            previous_status,
            current_status,
            changed_by,
            note,
        };
        let stored = PipelineStore::append(self.store, &entry)?;
        debug!(
            lead_id = %lead_id,
            previous = ?stored.previous_status,
            current = %stored.current_status,
            "appended pipeline entry"
        );
        Ok(stored)
    }

    fn ensure_status(
        &self,
        admin_id: &str,
        category: Category,
        status: &str,
    ) -> LifecycleResult<()> {
        if self.vocabulary_for(admin_id, category)?.accepts(status) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidStatus {
                status: status.to_string(),
                category,
            })
        }
    }

    fn vocabulary_for(&self, admin_id: &str, category: Category) -> LifecycleResult<StatusVocabulary> {
        let configured = self.store.vocabulary(admin_id, category)?;
        if !configured.options.is_empty() {
            return Ok(configured);
        }
        let defaults = match category {
            Category::Contact => &self.config.contact_statuses,
            Category::Lead => &self.config.lead_statuses,
        };
        Ok(StatusVocabulary::new(category, defaults.clone()))
    }

    fn record_activity(&self, person_id: &PersonId, event: ActivityEvent) {
        if let Err(err) = self.activity.append(person_id, &event) {
            warn!(
                person_id = %person_id,
                action = %event.action,
                error = %format!("{err:#}"),
                "activity log append failed"
            );
        }
    }
}

/// Category a record ends up in after an update.
///
/// `interested` promotes a Contact unless the caller explicitly asked for
/// a Contact, which is contradictory.
fn target_category(
    from: Category,
    requested: Option<Category>,
    status: Option<&str>,
) -> LifecycleResult<Category> {
    let target = requested.unwrap_or(from);
    if target == Category::Contact && status == Some(INTERESTED) {
        if requested == Some(Category::Contact) {
            return Err(LifecycleError::InvalidInput(format!(
                "status '{INTERESTED}' always promotes to a lead; it cannot be set on a contact"
            )));
        }
        return Ok(Category::Lead);
    }
    Ok(target)
}

fn default_status(category: Category) -> String {
    match category {
        Category::Contact => String::new(),
        Category::Lead => INTERESTED.to_string(),
    }
}

fn conversion_event(from: Category, record: &PersonRecord, actor_id: &str) -> ActivityEvent {
    let to = record.category();
    ActivityEvent {
        action: ActivityAction::Converted,
        kind: to.as_str().to_string(),
        title: format!("Converted to {to}"),
        description: format!("{from} -> {to} (status: {})", display_status(record.status())),
        actor_id: actor_id.to_string(),
    }
}

const fn title_case(category: Category) -> &'static str {
    match category {
        Category::Contact => "Contact",
        Category::Lead => "Lead",
    }
}

fn display_status(status: &str) -> &str {
    if status.is_empty() { "(none)" } else { status }
}

fn not_found(id: &PersonId, actor_id: &str) -> LifecycleError {
    LifecycleError::RecordNotFound {
        id: id.clone(),
        actor_id: actor_id.to_string(),
    }
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
