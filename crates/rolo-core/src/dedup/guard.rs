use tracing::{debug, warn};

use super::{Conflict, DuplicateIndex, MatchedKey, OwnerDescriptor};
use crate::model::{PersonId, Phone};
use crate::phone::{self, PhoneInput};

/// Probes a [`DuplicateIndex`] for the first identity clash.
///
/// Phones are checked before emails, and the first non-self hit wins.
/// A clean result only holds for the snapshot the index was built from.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateGuard<'a> {
    index: &'a DuplicateIndex,
}

impl<'a> DuplicateGuard<'a> {
    #[must_use]
    pub const fn new(index: &'a DuplicateIndex) -> Self {
        Self { index }
    }

    /// Check already-normalized phones and raw emails.
    ///
    /// A hit on `exclude` (the record being updated) is ignored.
    #[must_use]
    pub fn find_conflict(
        &self,
        phones: &[Phone],
        emails: &[String],
        exclude: Option<&PersonId>,
    ) -> Option<Conflict> {
        let is_other = |owner: &OwnerDescriptor| exclude != Some(&owner.person_id);

        for phone in phones {
            for variant in phone::variants(phone) {
                if let Some(owner) = self.index.phone_owner(&variant).filter(|o| is_other(o)) {
                    debug!(variant = %variant, person_id = %owner.person_id, "phone collision");
                    return Some(conflict(MatchedKey::Phone(variant), owner));
                }
            }
        }

        for email in emails {
            if let Some(owner) = self.index.email_owner(email).filter(|o| is_other(o)) {
                debug!(email = %email, person_id = %owner.person_id, "email collision");
                let key = super::normalize_email(email).unwrap_or_default();
                return Some(conflict(MatchedKey::Email(key), owner));
            }
        }

        None
    }

    /// Normalize raw phone inputs, then check.
    ///
    /// Inputs that do not normalize are skipped: an unparsable phone has
    /// nothing to match against.
    #[must_use]
    pub fn find_conflict_in_inputs(
        &self,
        phones: &[PhoneInput],
        emails: &[String],
        exclude: Option<&PersonId>,
    ) -> Option<Conflict> {
        let (normalized, rejected) = phone::normalize_all(phones);
        for err in &rejected {
            warn!(input = %err.input, "skipping unparsable phone in duplicate check");
        }
        self.find_conflict(&normalized, emails, exclude)
    }
}

fn conflict(matched: MatchedKey, owner: &OwnerDescriptor) -> Conflict {
    Conflict {
        matched,
        owner: owner.clone(),
        owner_name: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::store::IdentityRow;

    fn index() -> DuplicateIndex {
        DuplicateIndex::from_rows([
            IdentityRow {
                category: Category::Contact,
                id: PersonId::new_unchecked("ps-a"),
                owner_id: "u1".to_string(),
                first_name: "Ann".to_string(),
                last_name: "A".to_string(),
                emails: vec!["ann@a.io".to_string()],
                phones: vec![Phone::new("971", "501234567")],
            },
            IdentityRow {
                category: Category::Lead,
                id: PersonId::new_unchecked("ps-b"),
                owner_id: "u2".to_string(),
                first_name: "Bob".to_string(),
                last_name: "B".to_string(),
                emails: vec!["bob@b.io".to_string()],
                phones: vec![Phone::new("1", "4155550100")],
            },
        ])
    }

    #[test]
    fn bare_national_number_matches_international_record() {
        let index = index();
        let guard = DuplicateGuard::new(&index);
        let hit = guard
            .find_conflict_in_inputs(&[PhoneInput::combined("501234567")], &[], None)
            .expect("conflict");
        assert_eq!(hit.owner.person_id.as_str(), "ps-a");
        assert_eq!(hit.matched, MatchedKey::Phone("501234567".to_string()));
    }

    #[test]
    fn phone_hit_beats_email_hit() {
        let index = index();
        let guard = DuplicateGuard::new(&index);
        let hit = guard
            .find_conflict(
                &[Phone::new("1", "4155550100")],
                &["ann@a.io".to_string()],
                None,
            )
            .expect("conflict");
        assert_eq!(hit.owner.person_id.as_str(), "ps-b");
    }

    #[test]
    fn self_hits_are_ignored() {
        let index = index();
        let guard = DuplicateGuard::new(&index);
        let me = PersonId::new_unchecked("ps-a");
        assert!(
            guard
                .find_conflict(
                    &[Phone::new("971", "501234567")],
                    &["ANN@a.io".to_string()],
                    Some(&me),
                )
                .is_none()
        );
    }

    #[test]
    fn self_exclusion_does_not_hide_other_owners() {
        let index = index();
        let guard = DuplicateGuard::new(&index);
        let me = PersonId::new_unchecked("ps-a");
        let hit = guard
            .find_conflict(&[], &["ann@a.io".to_string(), "bob@b.io".to_string()], Some(&me))
            .expect("conflict");
        assert_eq!(hit.owner.person_id.as_str(), "ps-b");
        assert_eq!(hit.matched, MatchedKey::Email("bob@b.io".to_string()));
    }

    #[test]
    fn unparsable_phones_are_skipped() {
        let index = index();
        let guard = DuplicateGuard::new(&index);
        assert!(
            guard
                .find_conflict_in_inputs(&[PhoneInput::combined("---")], &[], None)
                .is_none()
        );
    }

    #[test]
    fn conflict_message_names_owner() {
        let index = index();
        let guard = DuplicateGuard::new(&index);
        let mut hit = guard
            .find_conflict(&[], &["bob@b.io".to_string()], None)
            .expect("conflict");
        assert!(hit.to_string().contains("owned by user u2"));
        hit.owner_name = Some("Jane Doe".to_string());
        assert_eq!(
            hit.to_string(),
            "email bob@b.io already exists as lead 'Bob B' (ps-b), owned by Jane Doe"
        );
    }
}
