//! IdentityStore trait: the abstract interface for account persistence.
//!
//! This trait allows the access layer to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use faultline_core::{AppId, Grant, Level, Role, User, Username};

use crate::error::Result;

/// A page request: zero-indexed page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Zero-indexed page number.
    pub number: usize,
    /// Maximum items per page.
    pub size: usize,
}

impl Page {
    /// The first page of a given size.
    pub fn first(size: usize) -> Self {
        Self { number: 0, size }
    }

    /// The request for the page after this one.
    pub fn next(self) -> Self {
        Self {
            number: self.number + 1,
            ..self
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> usize {
        self.number * self.size
    }
}

/// One page of results plus a next-page probe.
///
/// Carries `has_next` instead of a total count; implementations fetch
/// `size + 1` rows and truncate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// The request that produced this page.
    pub page: Page,
    /// Whether at least one more item exists past this page.
    pub has_next: bool,
}

impl<T> Slice<T> {
    /// Build a slice from a probe fetch of up to `page.size + 1` items.
    pub fn from_probe(mut items: Vec<T>, page: Page) -> Self {
        let has_next = items.len() > page.size;
        items.truncate(page.size);
        Self {
            items,
            page,
            has_next,
        }
    }
}

/// The IdentityStore trait: async interface for account persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the
/// runtime.
///
/// # Design Notes
///
/// - **Exact-match lookups**: usernames are stored lowercase and looked up
///   by the normalized key; [`Username`] normalizes at construction.
/// - **Grant replacement**: `put_grant` upserts on (username, app), so at
///   most one grant per app can exist for a user.
/// - **Read-mostly**: resolution only reads; mutation is serialized by the
///   backend (one connection, one lock).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // User Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Look up a user by normalized username.
    ///
    /// Returns `None` for an unknown username; store failures are errors,
    /// never `None`.
    async fn find_user(&self, username: &Username) -> Result<Option<User>>;

    /// Insert or fully replace a user record, including roles and grants.
    async fn upsert_user(&self, user: &User) -> Result<()>;

    /// Replace a user's credential hash.
    async fn set_password_hash(&self, username: &Username, hash: &str) -> Result<()>;

    /// Count users carrying a role.
    async fn count_users_with_role(&self, role: Role) -> Result<u64>;

    /// List users carrying a role, ordered by username.
    async fn users_with_role(&self, role: Role, page: Page) -> Result<Slice<User>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a grant, replacing any existing grant for the same app.
    ///
    /// Returns the level that was replaced, if any. Fails with
    /// `UserNotFound` if the user does not exist.
    async fn put_grant(&self, username: &Username, grant: Grant) -> Result<Option<Level>>;

    /// Revoke the grant for an app, returning its level if one existed.
    async fn remove_grant(&self, username: &Username, app: &AppId) -> Result<Option<Level>>;
}
