//! Error types for the Faultline core.

use thiserror::Error;

/// Errors from decoding stored access-control data.
///
/// Decoding is strict: an unknown role or level in stored data is an error,
/// never silently widened or skipped.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown role: {0}")]
    InvalidRole(String),

    #[error("unknown permission level ordinal: {0}")]
    InvalidLevel(u8),
}
