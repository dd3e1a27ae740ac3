//! Session lifecycle: issuance, rotation, validation, revocation.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use faultline_core::{Identity, Username};

use crate::context::RequestContext;

/// A 128-bit random session identifier.
///
/// A fresh identifier is generated on every successful login; identifiers
/// presented before authentication are never kept.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub [u8; 16]);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Encode as lowercase hex, the form handed to transport cookies.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from hex.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 16 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut id = [0u8; 16];
        id.copy_from_slice(&bytes);
        Ok(Self(id))
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", &self.to_hex()[..8])
    }
}

impl fmt::Display for SessionId {
    /// Shows a short prefix only. Full identifiers never reach logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..8])
    }
}

/// One server-side session.
///
/// `identity` is `None` for the anonymous pre-login session and `Some`
/// once a login has bound an authenticated identity. Timestamps are unix
/// milliseconds.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub identity: Option<Identity>,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl Session {
    /// Whether an authenticated identity is bound.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether the session has passed its expiry instant.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Lifecycle signals for the presentation layer.
///
/// `on_authenticated` fires after a login has bound a fresh session, the
/// point where a UI starts its server-push channel. `on_logged_out` fires
/// after a session is destroyed, the point where a UI drops client-held
/// state and reloads.
pub trait SessionHooks: Send + Sync {
    /// An authenticated session was established.
    fn on_authenticated(&self, identity: &Identity) {
        let _ = identity;
    }

    /// A session was logged out.
    fn on_logged_out(&self) {}
}

/// In-process session table with a fixed time-to-live.
///
/// Owned by whatever composes the access layer; there is no process-global
/// table. Expired entries are pruned when they are next presented.
pub struct SessionManager {
    ttl: Duration,
    inner: RwLock<SessionTable>,
}

struct SessionTable {
    sessions: HashMap<SessionId, Session>,
}

impl SessionManager {
    /// Create a manager whose sessions live for `ttl` after issuance.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(SessionTable {
                sessions: HashMap::new(),
            }),
        }
    }

    /// Open an anonymous session for a pre-login conversation.
    pub fn open_anonymous(&self) -> Session {
        let session = self.mint(None);
        let mut inner = self.inner.write().unwrap();
        inner.sessions.insert(session.id, session.clone());
        session
    }

    /// Establish an authenticated session for `identity`.
    ///
    /// Removal of the presented session and insertion of the new one happen
    /// under one write lock: at no instant are both the old and the new
    /// identifier valid.
    pub fn establish(&self, presented: Option<&SessionId>, identity: Identity) -> Session {
        let session = self.mint(Some(identity));
        let mut inner = self.inner.write().unwrap();
        if let Some(old) = presented {
            inner.sessions.remove(old);
        }
        inner.sessions.insert(session.id, session.clone());
        session
    }

    /// Look up a presented identifier.
    ///
    /// Returns `None` for unknown identifiers and for expired sessions;
    /// expired entries are removed on the spot.
    pub fn validate(&self, id: &SessionId) -> Option<Session> {
        let now = now_millis();
        let mut inner = self.inner.write().unwrap();
        match inner.sessions.get(id) {
            Some(session) if !session.is_expired(now) => return Some(session.clone()),
            Some(_) => {}
            None => return None,
        }
        inner.sessions.remove(id);
        None
    }

    /// Build the request context for a presented identifier, if any.
    pub fn context(&self, presented: Option<&SessionId>) -> RequestContext {
        match presented.and_then(|id| self.validate(id)) {
            Some(session) => RequestContext::for_session(session),
            None => RequestContext::anonymous(),
        }
    }

    /// Destroy a session. Safe to call repeatedly; only the first call for
    /// a given identifier returns true.
    pub fn logout(&self, id: &SessionId) -> bool {
        let mut inner = self.inner.write().unwrap();
        inner.sessions.remove(id).is_some()
    }

    /// Invalidate every session bound to `username`.
    ///
    /// Returns how many sessions were removed.
    pub fn revoke_user(&self, username: &Username) -> usize {
        self.revoke_user_except(username, None)
    }

    /// Invalidate a user's sessions, sparing `keep` when present.
    pub fn revoke_user_except(&self, username: &Username, keep: Option<&SessionId>) -> usize {
        let mut inner = self.inner.write().unwrap();
        let before = inner.sessions.len();
        inner.sessions.retain(|id, session| {
            if Some(id) == keep {
                return true;
            }
            session
                .identity
                .as_ref()
                .map(|identity| identity.username() != username)
                .unwrap_or(true)
        });
        before - inner.sessions.len()
    }

    fn mint(&self, identity: Option<Identity>) -> Session {
        let now = now_millis();
        Session {
            id: SessionId::generate(),
            identity,
            issued_at: now,
            expires_at: now + self.ttl.as_millis() as i64,
        }
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_core::{Role, User};

    const HOUR: Duration = Duration::from_secs(3600);

    fn identity_for(name: &str) -> Identity {
        Identity::from_user(&User::new(name, "$argon2id$stub").with_role(Role::User))
    }

    #[test]
    fn test_session_id_hex_roundtrip() {
        let id = SessionId::generate();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 32);
        assert_eq!(SessionId::from_hex(&hex).unwrap(), id);
        assert!(SessionId::from_hex("abcd").is_err());
    }

    #[test]
    fn test_display_truncates_id() {
        let id = SessionId([0xab; 16]);
        assert_eq!(format!("{id}"), "abababab");
        assert_eq!(format!("{id:?}"), "SessionId(abababab)");
    }

    #[test]
    fn test_login_rotates_session_id() {
        let manager = SessionManager::new(HOUR);
        let anon = manager.open_anonymous();
        assert!(!anon.is_authenticated());

        let session = manager.establish(Some(&anon.id), identity_for("alice"));
        assert_ne!(session.id, anon.id);
        assert!(session.is_authenticated());

        // The pre-login identifier no longer resolves.
        assert!(manager.validate(&anon.id).is_none());
        assert!(manager.validate(&session.id).is_some());
    }

    #[test]
    fn test_establish_without_presented_session() {
        let manager = SessionManager::new(HOUR);
        let session = manager.establish(None, identity_for("alice"));
        assert!(manager.validate(&session.id).is_some());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let manager = SessionManager::new(HOUR);
        let session = manager.establish(None, identity_for("alice"));
        assert!(manager.logout(&session.id));
        assert!(!manager.logout(&session.id));
        assert!(manager.validate(&session.id).is_none());
    }

    #[test]
    fn test_expired_session_is_pruned() {
        let manager = SessionManager::new(Duration::ZERO);
        let session = manager.establish(None, identity_for("alice"));
        assert!(manager.validate(&session.id).is_none());
        // Pruned on first presentation, still gone afterwards.
        assert!(!manager.logout(&session.id));
    }

    #[test]
    fn test_revoke_user_spares_kept_session() {
        let manager = SessionManager::new(HOUR);
        let first = manager.establish(None, identity_for("alice"));
        let second = manager.establish(None, identity_for("alice"));
        let other = manager.establish(None, identity_for("bob"));

        let removed = manager.revoke_user_except(&Username::new("alice"), Some(&second.id));
        assert_eq!(removed, 1);
        assert!(manager.validate(&first.id).is_none());
        assert!(manager.validate(&second.id).is_some());
        assert!(manager.validate(&other.id).is_some());
    }

    #[test]
    fn test_revoke_user_leaves_anonymous_sessions() {
        let manager = SessionManager::new(HOUR);
        let anon = manager.open_anonymous();
        manager.establish(None, identity_for("alice"));

        let removed = manager.revoke_user(&Username::new("alice"));
        assert_eq!(removed, 1);
        assert!(manager.validate(&anon.id).is_some());
    }

    #[test]
    fn test_context_for_unknown_id_is_anonymous() {
        let manager = SessionManager::new(HOUR);
        let ctx = manager.context(Some(&SessionId::generate()));
        assert!(!ctx.is_authenticated());
        assert!(ctx.session().is_none());
    }
}
