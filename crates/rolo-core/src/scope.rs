//! Company scope resolution.
//!
//! A company is one admin plus every agent that admin provisioned. It is
//! the only boundary inside which duplicates are detected; nothing ever
//! matches across companies.

use serde::Serialize;
use tracing::debug;

use crate::error::{LifecycleError, LifecycleResult};
use crate::model::UserRecord;
use crate::store::UserDirectory;

/// The users whose records count as one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyScope {
    pub admin_id: String,
    /// The admin first, then agents in directory order.
    pub members: Vec<String>,
}

impl CompanyScope {
    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Resolve the company that `user_id` belongs to.
///
/// - a company admin roots its own scope
/// - otherwise the recorded creator-admin is the root
/// - an orphaned user roots a scope of its own
///
/// # Errors
///
/// Returns [`LifecycleError::ScopeResolution`] if the user, or the admin it
/// points at, does not exist.
pub fn resolve_company<D: UserDirectory + ?Sized>(
    directory: &D,
    user_id: &str,
) -> LifecycleResult<CompanyScope> {
    let user = require_user(directory, user_id)?;

    let admin_id = match (&user.created_by, user.is_company_admin()) {
        (_, true) | (None, false) => user.id.clone(),
        (Some(creator), false) => {
            if directory.user(creator)?.is_none() {
                return Err(LifecycleError::ScopeResolution {
                    user_id: user_id.to_string(),
                    reason: format!("company admin '{creator}' does not exist"),
                });
            }
            creator.clone()
        }
    };

    let mut members = vec![admin_id.clone()];
    for agent in directory.agents_of(&admin_id)? {
        if !members.contains(&agent) {
            members.push(agent);
        }
    }

    debug!(user_id, admin_id = %admin_id, members = members.len(), "resolved company scope");
    Ok(CompanyScope { admin_id, members })
}

/// Owners whose records `actor_id` may delete: itself, plus its agents when
/// it is a company admin.
///
/// # Errors
///
/// Returns [`LifecycleError::ScopeResolution`] if the actor does not exist.
pub fn management_scope<D: UserDirectory + ?Sized>(
    directory: &D,
    actor_id: &str,
) -> LifecycleResult<Vec<String>> {
    let actor = require_user(directory, actor_id)?;
    let mut owners = vec![actor.id.clone()];
    if actor.is_company_admin() {
        owners.extend(
            directory
                .agents_of(&actor.id)?
                .into_iter()
                .filter(|a| *a != actor.id),
        );
    }
    Ok(owners)
}

fn require_user<D: UserDirectory + ?Sized>(
    directory: &D,
    user_id: &str,
) -> LifecycleResult<UserRecord> {
    directory
        .user(user_id)?
        .ok_or_else(|| LifecycleError::ScopeResolution {
            user_id: user_id.to_string(),
            reason: "user does not exist".to_string(),
        })
}
