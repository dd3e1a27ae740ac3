//! Identities and the authorities they carry.
//!
//! A [`User`] is the persisted account record; an [`Identity`] is the
//! projection of that record bound to one session after a successful login.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::grant::{Grant, GrantSet};
use crate::level::Level;
use crate::resolve::resolve_level;
use crate::role::Role;
use crate::types::{AppId, Username};

/// One entry in an identity's authority set.
///
/// Roles and grants travel in one list; the discriminant keeps them apart
/// without runtime type inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    /// A global role.
    Role(Role),
    /// A per-app permission grant.
    Grant(Grant),
}

/// A persisted account record.
///
/// Owned by the identity store. Resolution only ever reads it; mutation goes
/// through administrative operations and grant issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key: unique, lowercase.
    pub username: Username,
    /// Credential hash in PHC string format.
    pub password_hash: String,
    /// Global roles.
    pub roles: BTreeSet<Role>,
    /// Per-app grants, at most one per app.
    pub grants: GrantSet,
}

impl User {
    /// Create a user with no roles and no grants.
    pub fn new(username: impl Into<Username>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            roles: BTreeSet::new(),
            grants: GrantSet::new(),
        }
    }

    /// Add a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Add a grant, replacing any existing grant for the same app.
    pub fn with_grant(mut self, grant: Grant) -> Self {
        self.grants.put(grant);
        self
    }

    /// Check for a role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Effective level for an app, resolved from the stored record.
    ///
    /// This is the explicit-record shape of resolution, used when one user
    /// (typically an admin) inspects another user's access without a live
    /// session for them.
    pub fn permission_for(&self, app: &AppId) -> Level {
        resolve_level(&self.grants, || self.has_role(Role::Admin), app)
    }
}

/// The authenticated principal bound to one session.
///
/// Created by the authenticator on success, immutable thereafter, and
/// discarded when the session ends (logout or expiry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    username: Username,
    authorities: Vec<Authority>,
}

impl Identity {
    /// Build an identity from an explicit authority list.
    pub fn new(username: impl Into<Username>, authorities: Vec<Authority>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    /// Project the identity a successful login produces for `user`.
    pub fn from_user(user: &User) -> Self {
        let mut authorities: Vec<Authority> =
            user.roles.iter().copied().map(Authority::Role).collect();
        authorities.extend(user.grants.iter().cloned().map(Authority::Grant));
        Self {
            username: user.username.clone(),
            authorities,
        }
    }

    /// The normalized login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// The full authority set.
    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    /// The roles carried by this identity.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.authorities.iter().filter_map(|authority| match authority {
            Authority::Role(role) => Some(*role),
            Authority::Grant(_) => None,
        })
    }

    /// The grants carried by this identity.
    pub fn grants(&self) -> impl Iterator<Item = &Grant> {
        self.authorities.iter().filter_map(|authority| match authority {
            Authority::Grant(grant) => Some(grant),
            Authority::Role(_) => None,
        })
    }

    /// Check for a role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles().any(|r| r == role)
    }

    /// Check for the global admin role.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Effective level for an app, resolved from the live authority set.
    pub fn permission_for(&self, app: &AppId) -> Level {
        resolve_level(self.grants(), || self.is_admin(), app)
    }
}
