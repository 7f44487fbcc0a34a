use std::fmt;

use crate::dedup::Conflict;
use crate::model::{Category, PersonId};
use crate::phone::InvalidPhoneFormat;

/// Machine-readable error codes for callers that branch on failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    InvalidPhoneFormat,
    DuplicateConflict,
    RecordNotFound,
    InvalidStatus,
    InvalidInput,
    ScopeResolution,
    ScopeTooLarge,
    ConversionFailure,
    StoreFailure,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InvalidPhoneFormat => "E2001",
            Self::DuplicateConflict => "E2002",
            Self::RecordNotFound => "E2003",
            Self::InvalidStatus => "E2004",
            Self::InvalidInput => "E2005",
            Self::ScopeResolution => "E3001",
            Self::ScopeTooLarge => "E3002",
            Self::ConversionFailure => "E4001",
            Self::StoreFailure => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Workspace not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidPhoneFormat => "Invalid phone format",
            Self::DuplicateConflict => "Phone or email already exists in this company",
            Self::RecordNotFound => "Contact or lead not found",
            Self::InvalidStatus => "Status not in the company vocabulary",
            Self::InvalidInput => "Invalid input",
            Self::ScopeResolution => "Company scope could not be resolved",
            Self::ScopeTooLarge => "Company too large for duplicate scan",
            Self::ConversionFailure => "Contact/lead conversion failed",
            Self::StoreFailure => "Record store failure",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `rolo init` to create the workspace."),
            Self::ConfigParseError => Some("Fix syntax in .rolo/config.toml and retry."),
            Self::InvalidPhoneFormat => {
                Some("Supply digits, optionally with a leading + and calling code.")
            }
            Self::DuplicateConflict => {
                Some("Update the existing record instead of creating another one.")
            }
            Self::RecordNotFound | Self::InvalidInput => None,
            Self::InvalidStatus => Some("Use `rolo vocab show` to list permitted statuses."),
            Self::ScopeResolution => {
                Some("Check that the acting user and its company admin exist.")
            }
            Self::ScopeTooLarge => Some("Raise dedup.max_company_records in the config."),
            Self::ConversionFailure => {
                Some("The original record is unchanged. Retry once the store is healthy.")
            }
            Self::StoreFailure => Some("Check disk space and database permissions."),
            Self::LockContention => Some("Retry after the other writer finishes."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Structured failures returned by every lifecycle operation.
///
/// None of these are retried internally: duplicates and missing records
/// are business outcomes, not transient faults.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    InvalidPhone(#[from] InvalidPhoneFormat),

    #[error("{0}")]
    DuplicateConflict(Box<Conflict>),

    #[error("cannot resolve company scope for user '{user_id}': {reason}")]
    ScopeResolution { user_id: String, reason: String },

    #[error(
        "company of '{admin_id}' holds more than {limit} records; duplicate scan refused"
    )]
    ScopeTooLarge { admin_id: String, limit: usize },

    #[error("no contact or lead '{id}' within reach of user '{actor_id}'")]
    RecordNotFound { id: PersonId, actor_id: String },

    #[error("status '{status}' is not valid for a {category}")]
    InvalidStatus { status: String, category: Category },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("converting '{id}' from {from} to {to} failed; original left untouched: {source}")]
    ConversionFailure {
        id: PersonId,
        from: Category,
        to: Category,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LifecycleError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPhone(_) => ErrorCode::InvalidPhoneFormat,
            Self::DuplicateConflict(_) => ErrorCode::DuplicateConflict,
            Self::ScopeResolution { .. } => ErrorCode::ScopeResolution,
            Self::ScopeTooLarge { .. } => ErrorCode::ScopeTooLarge,
            Self::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            Self::InvalidStatus { .. } => ErrorCode::InvalidStatus,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::ConversionFailure { .. } => ErrorCode::ConversionFailure,
            Self::Storage(err) => storage_code(err),
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// The conflicting owner, when this is a duplicate failure.
    #[must_use]
    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            Self::DuplicateConflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

fn storage_code(err: &anyhow::Error) -> ErrorCode {
    let busy = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
        )
    });
    if busy {
        ErrorCode::LockContention
    } else {
        ErrorCode::StoreFailure
    }
}

/// Shorthand used throughout the engine.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
