use std::collections::HashMap;
use tracing::debug;

use super::OwnerDescriptor;
use crate::error::{LifecycleError, LifecycleResult};
use crate::model::Category;
use crate::phone;
use crate::scope::CompanyScope;
use crate::store::{IdentityRow, RecordStore};

/// Phone-variant and email lookups over one company's records.
#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    owners: Vec<OwnerDescriptor>,
    phones: HashMap<String, usize>,
    emails: HashMap<String, usize>,
}

impl DuplicateIndex {
    /// Build from a snapshot of identity rows.
    ///
    /// Rows are registered in the order given; on a key collision the first
    /// writer keeps the key. Collisions only happen when the store already
    /// holds a duplicate, so the tie-break just has to be deterministic.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = IdentityRow>) -> Self {
        let mut index = Self::default();
        for row in rows {
            let slot = index.owners.len();
            for phone in &row.phones {
                if !phone.number.chars().any(|c| c.is_ascii_digit()) {
                    continue;
                }
                for variant in phone::variants(phone) {
                    index.phones.entry(variant).or_insert(slot);
                }
            }
            for email in &row.emails {
                if let Some(key) = normalize_email(email) {
                    index.emails.entry(key).or_insert(slot);
                }
            }
            index.owners.push(OwnerDescriptor {
                category: row.category,
                owner_id: row.owner_id,
                is_lead: row.category == Category::Lead,
                person_id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
            });
        }
        index
    }

    /// Owner registered for an exact phone variant.
    #[must_use]
    pub fn phone_owner(&self, variant: &str) -> Option<&OwnerDescriptor> {
        self.phones.get(variant).map(|slot| &self.owners[*slot])
    }

    /// Owner registered for an email; the probe is normalized first.
    #[must_use]
    pub fn email_owner(&self, email: &str) -> Option<&OwnerDescriptor> {
        let key = normalize_email(email)?;
        self.emails.get(&key).map(|slot| &self.owners[*slot])
    }

    /// Number of person rows indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    #[must_use]
    pub fn phone_keys(&self) -> usize {
        self.phones.len()
    }

    #[must_use]
    pub fn email_keys(&self) -> usize {
        self.emails.len()
    }
}

/// Lower-cased, trimmed email; `None` for blanks.
#[must_use]
pub fn normalize_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Scan every record owned inside `scope` and index it.
///
/// # Errors
///
/// Returns [`LifecycleError::ScopeTooLarge`] when the company holds more
/// than `max_records` records, or a storage error if the scan fails.
pub fn build_index<S: RecordStore + ?Sized>(
    store: &S,
    scope: &CompanyScope,
    max_records: usize,
) -> LifecycleResult<DuplicateIndex> {
    let rows = store.identities_owned_by(&scope.members, max_records.saturating_add(1))?;
    if rows.len() > max_records {
        return Err(LifecycleError::ScopeTooLarge {
            admin_id: scope.admin_id.clone(),
            limit: max_records,
        });
    }

    let index = DuplicateIndex::from_rows(rows);
    debug!(
        admin_id = %scope.admin_id,
        records = index.len(),
        phone_keys = index.phone_keys(),
        email_keys = index.email_keys(),
        "built duplicate index"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PersonId, Phone};

    fn row(
        category: Category,
        id: &str,
        owner: &str,
        phones: Vec<Phone>,
        emails: &[&str],
    ) -> IdentityRow {
        IdentityRow {
            category,
            id: PersonId::new_unchecked(id),
            owner_id: owner.to_string(),
            first_name: format!("First {id}"),
            last_name: "Last".to_string(),
            emails: emails.iter().map(|e| (*e).to_string()).collect(),
            phones,
        }
    }

    #[test]
    fn every_variant_maps_to_owner() {
        let index = DuplicateIndex::from_rows([row(
            Category::Contact,
            "ps-a",
            "u1",
            vec![Phone::new("971", "501234567")],
            &[],
        )]);
        for key in ["+971501234567", "971501234567", "501234567"] {
            let owner = index.phone_owner(key).expect("variant registered");
            assert_eq!(owner.person_id.as_str(), "ps-a");
        }
    }

    #[test]
    fn first_writer_wins() {
        let index = DuplicateIndex::from_rows([
            row(Category::Contact, "ps-c", "u1", vec![Phone::new("", "5551234")], &["x@y.io"]),
            row(Category::Lead, "ps-l", "u2", vec![Phone::new("", "5551234")], &["X@Y.io"]),
        ]);
        assert_eq!(index.phone_owner("5551234").unwrap().person_id.as_str(), "ps-c");
        assert_eq!(index.email_owner("x@y.io").unwrap().person_id.as_str(), "ps-c");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn emails_are_case_and_space_insensitive() {
        let index = DuplicateIndex::from_rows([row(
            Category::Lead,
            "ps-l",
            "u1",
            Vec::new(),
            &[" Jane@Example.COM "],
        )]);
        let owner = index.email_owner("jane@example.com").unwrap();
        assert!(owner.is_lead);
        assert_eq!(owner.category, Category::Lead);
        assert!(index.email_owner("   ").is_none());
    }

    #[test]
    fn blank_phones_register_nothing() {
        let index = DuplicateIndex::from_rows([row(
            Category::Contact,
            "ps-a",
            "u1",
            vec![Phone::new("", ""), Phone::new("971", "")],
            &[],
        )]);
        assert_eq!(index.phone_keys(), 0);
    }
}
