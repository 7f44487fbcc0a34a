use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::person::{ParseEnumError, normalize};

/// Account role as far as company scoping is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Root of a company scope.
    CompanyAdmin,
    /// User provisioned by a company admin.
    Agent,
    /// Self-registered user with no company.
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompanyAdmin => "company_admin",
            Self::Agent => "agent",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).replace('-', "_").as_str() {
            "company_admin" | "admin" => Ok(Self::CompanyAdmin),
            "agent" => Ok(Self::Agent),
            "user" => Ok(Self::User),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

/// Owner attribution as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    /// The company admin that provisioned this user, if any.
    pub created_by: Option<String>,
}

impl UserRecord {
    #[must_use]
    pub const fn is_company_admin(&self) -> bool {
        matches!(self.role, Role::CompanyAdmin)
    }
}
