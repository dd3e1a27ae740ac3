//! Error types for authentication and access control.

use thiserror::Error;

use faultline_core::{AppId, Level, Role};
use faultline_store::StoreError;

/// The one message shown for any credential or role failure at login.
pub const GENERIC_LOGIN_MESSAGE: &str = "unknown username/password combination";

/// Failures at the login boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. The two causes share one variant
    /// and are not distinguishable from the outside.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credentials verified but the baseline role is missing.
    #[error("missing required role: {role}")]
    InsufficientRole { role: Role },

    /// The identity store could not answer the lookup. Never folded into
    /// [`AuthError::InvalidCredentials`].
    #[error("identity store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl AuthError {
    /// The message to surface to the end user.
    ///
    /// Credential and role failures share [`GENERIC_LOGIN_MESSAGE`]; only
    /// logs carry the distinction. Store outages get their own line since
    /// retrying with the same credentials may succeed.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials | AuthError::InsufficientRole { .. } => {
                GENERIC_LOGIN_MESSAGE
            }
            AuthError::StoreUnavailable(_) => "login is temporarily unavailable",
        }
    }
}

/// Denial outcomes at guarded entry points.
///
/// Denials are normal control flow for requests that arrive without the
/// needed level, not program failures.
#[derive(Debug, Error)]
pub enum AccessDenied {
    /// The context holds less than `required` on `app`.
    #[error("requires {required} on app {app}")]
    Insufficient { app: AppId, required: Level },

    /// The guard could not determine which app the request targets.
    #[error("could not resolve target app")]
    UnresolvedApp,
}

/// Failures while producing a new credential hash.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}
