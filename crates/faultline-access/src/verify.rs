//! Credential hashing and verification.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::RngCore;

use crate::error::CredentialError;

/// Pluggable password hashing scheme.
///
/// The identity store holds PHC-format hash strings; implementations own
/// the algorithm and parameter choices.
pub trait CredentialScheme: Send + Sync {
    /// Verify a candidate password against a stored hash.
    ///
    /// Returns false on malformed stored hashes as well as mismatches.
    fn verify(&self, candidate: &str, stored_hash: &str) -> bool;

    /// Hash a new password into PHC string form.
    fn hash(&self, password: &str) -> Result<String, CredentialError>;
}

/// Argon2id with default parameters and a random per-password salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Scheme;

/// Generate a random password for operator-provisioned accounts.
///
/// 96 bits from the OS generator, hex-encoded.
pub fn generate_password() -> String {
    let mut bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl CredentialScheme for Argon2Scheme {
    fn verify(&self, candidate: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let mut salt_bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }
}
