//! Global, app-independent roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A coarse role attached to a user account.
///
/// Roles gate whether an account may hold a session at all and whether the
/// admin fallback applies during resolution. Per-app access is the job of
/// [`Grant`](crate::grant::Grant)s, not roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Baseline role required to hold an interactive session.
    User,
    /// Global administrator. Resolves to [`Level::Admin`](crate::Level) for
    /// any app without an explicit grant.
    Admin,
    /// Credentialed reporting client. Authenticates for report submission
    /// but never passes the baseline gate.
    Reporter,
}

impl Role {
    /// The stored name of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Reporter => "reporter",
        }
    }

    /// All roles, in storage order.
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Reporter];
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "reporter" => Ok(Self::Reporter),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
