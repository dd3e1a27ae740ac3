//! Permission resolution.
//!
//! A pure function over already-fetched grants; all store access is the
//! caller's responsibility.

use crate::grant::Grant;
use crate::level::Level;
use crate::types::AppId;

/// Resolve the effective [`Level`] for `app` from a grant list and an admin
/// predicate.
///
/// The grant whose app equals `app` decides the outcome (at most one exists
/// per the grant-set invariant), even when it grants [`Level::None`]. Only
/// when no grant matches does the admin fallback apply: [`Level::Admin`] for
/// global admins, [`Level::None`] for everyone else.
///
/// `is_admin` is evaluated lazily, on the no-grant path only.
pub fn resolve_level<'a, I, F>(grants: I, is_admin: F, app: &AppId) -> Level
where
    I: IntoIterator<Item = &'a Grant>,
    F: FnOnce() -> bool,
{
    grants
        .into_iter()
        .find(|grant| grant.app == *app)
        .map(|grant| grant.level)
        .unwrap_or_else(|| if is_admin() { Level::Admin } else { Level::None })
}
