//! In-memory implementation of the IdentityStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite but
//! keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use faultline_core::{AppId, Grant, Level, Role, User, Username};

use crate::error::{Result, StoreError};
use crate::traits::{IdentityStore, Page, Slice};

/// In-memory identity store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryIdentityStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Users indexed by normalized username.
    users: HashMap<Username, User>,
}

impl MemoryIdentityStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                users: HashMap::new(),
            }),
        }
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user(&self, username: &Username) -> Result<Option<User>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.get(username).cloned())
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn set_password_hash(&self, username: &Username, hash: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let user = inner
            .users
            .get_mut(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))?;
        user.password_hash = hash.to_string();
        Ok(())
    }

    async fn count_users_with_role(&self, role: Role) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.values().filter(|u| u.has_role(role)).count() as u64)
    }

    async fn users_with_role(&self, role: Role, page: Page) -> Result<Slice<User>> {
        let inner = self.inner.read().unwrap();

        let mut matching: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.has_role(role))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.username.cmp(&b.username));

        let probe: Vec<User> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.size + 1)
            .collect();

        Ok(Slice::from_probe(probe, page))
    }

    async fn put_grant(&self, username: &Username, grant: Grant) -> Result<Option<Level>> {
        let mut inner = self.inner.write().unwrap();
        let user = inner
            .users
            .get_mut(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))?;
        Ok(user.grants.put(grant))
    }

    async fn remove_grant(&self, username: &Username, app: &AppId) -> Result<Option<Level>> {
        let mut inner = self.inner.write().unwrap();
        let user = inner
            .users
            .get_mut(username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))?;
        Ok(user.grants.remove(app))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(name: &str, roles: &[Role]) -> User {
        let mut user = User::new(name, "$argon2id$stub");
        for &role in roles {
            user = user.with_role(role);
        }
        user
    }

    #[tokio::test]
    async fn test_find_and_upsert() {
        let store = MemoryIdentityStore::new();
        let user = make_user("alice", &[Role::User]);

        assert!(store.find_user(&user.username).await.unwrap().is_none());

        store.upsert_user(&user).await.unwrap();
        let found = store.find_user(&user.username).await.unwrap().unwrap();
        assert_eq!(found.username.as_str(), "alice");
        assert!(found.has_role(Role::User));
    }

    #[tokio::test]
    async fn test_put_grant_replaces() {
        let store = MemoryIdentityStore::new();
        let user = make_user("alice", &[Role::User]);
        let username = user.username.clone();
        store.upsert_user(&user).await.unwrap();

        let first = store
            .put_grant(&username, Grant::new("demo", Level::View))
            .await
            .unwrap();
        assert_eq!(first, None);

        let second = store
            .put_grant(&username, Grant::new("demo", Level::Edit))
            .await
            .unwrap();
        assert_eq!(second, Some(Level::View));

        let found = store.find_user(&username).await.unwrap().unwrap();
        assert_eq!(found.grants.len(), 1);
        assert_eq!(found.grants.level_for(&AppId::new("demo")), Some(Level::Edit));
    }

    #[tokio::test]
    async fn test_grant_unknown_user() {
        let store = MemoryIdentityStore::new();
        let err = store
            .put_grant(&Username::new("ghost"), Grant::new("demo", Level::View))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_role_counting_and_paging() {
        let store = MemoryIdentityStore::new();
        for name in ["alice", "bob", "carol"] {
            store
                .upsert_user(&make_user(name, &[Role::User]))
                .await
                .unwrap();
        }
        store
            .upsert_user(&make_user("reporter-1", &[Role::Reporter]))
            .await
            .unwrap();

        assert_eq!(store.count_users_with_role(Role::User).await.unwrap(), 3);
        assert_eq!(store.count_users_with_role(Role::Admin).await.unwrap(), 0);

        let page = store
            .users_with_role(Role::User, Page::first(2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].username.as_str(), "alice");
        assert!(page.has_next);

        let rest = store
            .users_with_role(Role::User, Page::first(2).next())
            .await
            .unwrap();
        assert_eq!(rest.items.len(), 1);
        assert_eq!(rest.items[0].username.as_str(), "carol");
        assert!(!rest.has_next);
    }

    #[tokio::test]
    async fn test_set_password_hash() {
        let store = MemoryIdentityStore::new();
        let user = make_user("alice", &[Role::User]);
        store.upsert_user(&user).await.unwrap();

        store
            .set_password_hash(&user.username, "$argon2id$new")
            .await
            .unwrap();
        let found = store.find_user(&user.username).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "$argon2id$new");
    }
}
