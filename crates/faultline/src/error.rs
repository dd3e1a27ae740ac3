//! Error types for the Gatekeeper.

use faultline_access::{AccessDenied, AuthError, CredentialError};
use faultline_core::Username;
use faultline_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Gatekeeper operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// Login failure. Surface [`AuthError::user_message`] to the user.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Permission denial at a guarded entry point.
    #[error("access denied: {0}")]
    Denied(#[from] AccessDenied),

    /// Credential hashing error.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// No account under the given username.
    #[error("user not found: {0}")]
    UserNotFound(Username),

    /// An account under the given username already exists.
    #[error("user already exists: {0}")]
    UserExists(Username),
}

impl GateError {
    /// The line to show the end user, when one applies.
    ///
    /// Login failures map through [`AuthError::user_message`], which keeps
    /// unknown-user, wrong-password, and missing-role failures identical.
    /// The remaining variants are operator-facing and return `None`.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            GateError::Auth(e) => Some(e.user_message()),
            _ => None,
        }
    }
}

/// Result type for Gatekeeper operations.
pub type Result<T> = std::result::Result<T, GateError>;
