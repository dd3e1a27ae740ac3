//! Credential checking and the baseline role gate.

use std::sync::Arc;

use faultline_core::{Identity, Role, Username};
use faultline_store::IdentityStore;

use crate::error::AuthError;
use crate::verify::CredentialScheme;

/// Verifies username/password pairs against the identity store.
pub struct Authenticator<S> {
    store: Arc<S>,
    scheme: Arc<dyn CredentialScheme>,
}

impl<S: IdentityStore> Authenticator<S> {
    /// Create an authenticator over a store and a credential scheme.
    pub fn new(store: Arc<S>, scheme: Arc<dyn CredentialScheme>) -> Self {
        Self { store, scheme }
    }

    /// Authenticate a username/password pair.
    ///
    /// The username is lowercased before lookup. Unknown usernames and
    /// wrong passwords both come back as [`AuthError::InvalidCredentials`].
    /// A store failure is [`AuthError::StoreUnavailable`] and is never
    /// reported as a bad credential.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let username = Username::new(username);

        let user = match self.store.find_user(&username).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(username = %username, error = %e, "identity store lookup failed");
                return Err(AuthError::StoreUnavailable(e));
            }
        };

        let Some(user) = user else {
            tracing::debug!(username = %username, "login rejected: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.scheme.verify(password, &user.password_hash) {
            tracing::debug!(username = %username, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity::from_user(&user))
    }
}

/// Require a baseline role on an authenticated identity.
///
/// Sits between credential verification and session establishment. On
/// failure the caller must leave its presented session exactly as it was.
pub fn require_role(identity: Identity, role: Role) -> Result<Identity, AuthError> {
    if identity.has_role(role) {
        Ok(identity)
    } else {
        tracing::debug!(username = %identity.username(), %role, "login rejected: missing role");
        Err(AuthError::InsufficientRole { role })
    }
}
