//! Golden resolution vectors.
//!
//! Known account shapes with expected resolution outcomes. A change to the
//! precedence order (explicit grant, then admin fallback, then nothing)
//! shows up here first.

use faultline_core::{AppId, Grant, Identity, Level, Role, User};
use serde::Serialize;

/// A golden resolution vector.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Roles held by the account.
    pub roles: Vec<Role>,
    /// Grants held by the account, as (app, level) pairs.
    pub grants: Vec<(&'static str, Level)>,
    /// The app being resolved.
    pub app: &'static str,
    /// Expected effective level.
    pub expected: Level,
}

/// Get all golden resolution vectors.
pub fn all_vectors() -> Vec<ResolutionVector> {
    vec![
        ResolutionVector {
            name: "plain user, matching grant",
            roles: vec![Role::User],
            grants: vec![("demo", Level::Edit)],
            app: "demo",
            expected: Level::Edit,
        },
        ResolutionVector {
            name: "plain user, no grant for the app",
            roles: vec![Role::User],
            grants: vec![("demo", Level::Edit)],
            app: "other",
            expected: Level::None,
        },
        ResolutionVector {
            name: "admin, no grants at all",
            roles: vec![Role::User, Role::Admin],
            grants: vec![],
            app: "demo",
            expected: Level::Admin,
        },
        ResolutionVector {
            name: "admin capped by explicit view grant",
            roles: vec![Role::User, Role::Admin],
            grants: vec![("demo", Level::View)],
            app: "demo",
            expected: Level::View,
        },
        ResolutionVector {
            name: "admin locked out by explicit none grant",
            roles: vec![Role::Admin],
            grants: vec![("demo", Level::None)],
            app: "demo",
            expected: Level::None,
        },
        ResolutionVector {
            name: "admin falls back beside an unrelated grant",
            roles: vec![Role::Admin],
            grants: vec![("demo", Level::View)],
            app: "other",
            expected: Level::Admin,
        },
        ResolutionVector {
            name: "no roles, no grants",
            roles: vec![],
            grants: vec![],
            app: "demo",
            expected: Level::None,
        },
        ResolutionVector {
            name: "reporter role carries no fallback",
            roles: vec![Role::User, Role::Reporter],
            grants: vec![],
            app: "demo",
            expected: Level::None,
        },
    ]
}

/// Build the account a vector describes.
pub fn user_from_vector(vector: &ResolutionVector) -> User {
    let mut user = User::new("subject", "$argon2id$stub");
    for role in &vector.roles {
        user = user.with_role(*role);
    }
    for (app, level) in &vector.grants {
        user = user.with_grant(Grant::new(*app, *level));
    }
    user
}

/// Resolve every vector, reporting (name, passed, resolved level).
pub fn verify_all_vectors() -> Vec<(String, bool, Level)> {
    all_vectors()
        .iter()
        .map(|v| {
            let user = user_from_vector(v);
            let resolved = user.permission_for(&AppId::new(v.app));
            (v.name.to_string(), resolved == v.expected, resolved)
        })
        .collect()
}
