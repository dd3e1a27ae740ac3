//! SQLite implementation of the IdentityStore trait.
//!
//! This is the primary storage backend for Faultline. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use faultline_core::{AppId, Grant, GrantSet, Level, Role, User, Username};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{IdentityStore, Page, Slice};

/// SQLite-based identity store.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking to
/// avoid blocking the async runtime.
pub struct SqliteIdentityStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteIdentityStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Map a poisoned connection mutex to a store error.
fn poisoned_lock<T>(e: PoisonError<T>) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
        Some(format!("mutex poisoned: {}", e)),
    ))
}

/// Map a spawn_blocking join failure to a store error.
fn join_failed(e: tokio::task::JoinError) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
        Some(format!("spawn_blocking failed: {}", e)),
    ))
}

/// Decode a stored level ordinal, strictly.
fn decode_level(value: i64) -> Result<Level> {
    let ordinal = u8::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("level ordinal out of range: {}", value)))?;
    Ok(Level::try_from(ordinal)?)
}

/// Load a full user record: account row, then roles, then grants.
fn load_user(conn: &Connection, username: &Username) -> Result<Option<User>> {
    let hash: Option<String> = conn
        .query_row(
            "SELECT password_hash FROM users WHERE username = ?1",
            params![username.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    let Some(password_hash) = hash else {
        return Ok(None);
    };

    let mut stmt = conn.prepare("SELECT role FROM user_roles WHERE username = ?1")?;
    let role_names = stmt
        .query_map(params![username.as_str()], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut roles = BTreeSet::new();
    for name in role_names {
        roles.insert(Role::from_str(&name)?);
    }

    let mut stmt = conn.prepare("SELECT app, level FROM grants WHERE username = ?1 ORDER BY app")?;
    let grant_rows = stmt
        .query_map(params![username.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut grants = GrantSet::new();
    for (app, level) in grant_rows {
        grants.put(Grant::new(app, decode_level(level)?));
    }

    Ok(Some(User {
        username: username.clone(),
        password_hash,
        roles,
        grants,
    }))
}

/// Check that a user row exists.
fn user_exists(conn: &Connection, username: &Username) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
        params![username.as_str()],
        |row| row.get(0),
    )?;

    if exists {
        Ok(())
    } else {
        Err(StoreError::UserNotFound(username.to_string()))
    }
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    async fn find_user(&self, username: &Username) -> Result<Option<User>> {
        let username = username.clone();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(poisoned_lock)?;
            load_user(&conn, &username)
        })
        .await
        .map_err(join_failed)?
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let user = user.clone();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(poisoned_lock)?;
            let tx = conn.transaction()?;
            let now = now_millis();

            tx.execute(
                "INSERT INTO users (username, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(username) DO UPDATE SET
                     password_hash = excluded.password_hash,
                     updated_at = excluded.updated_at",
                params![user.username.as_str(), user.password_hash, now],
            )?;

            // Roles and grants are replaced wholesale; the record owns them.
            tx.execute(
                "DELETE FROM user_roles WHERE username = ?1",
                params![user.username.as_str()],
            )?;
            for role in &user.roles {
                tx.execute(
                    "INSERT INTO user_roles (username, role) VALUES (?1, ?2)",
                    params![user.username.as_str(), role.as_str()],
                )?;
            }

            tx.execute(
                "DELETE FROM grants WHERE username = ?1",
                params![user.username.as_str()],
            )?;
            for grant in user.grants.iter() {
                tx.execute(
                    "INSERT INTO grants (username, app, level, granted_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        user.username.as_str(),
                        grant.app.as_str(),
                        grant.level.ordinal() as i64,
                        now,
                    ],
                )?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(join_failed)?
    }

    async fn set_password_hash(&self, username: &Username, hash: &str) -> Result<()> {
        let username = username.clone();
        let hash = hash.to_string();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(poisoned_lock)?;

            let changed = conn.execute(
                "UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE username = ?1",
                params![username.as_str(), hash, now_millis()],
            )?;

            if changed == 0 {
                return Err(StoreError::UserNotFound(username.to_string()));
            }
            Ok(())
        })
        .await
        .map_err(join_failed)?
    }

    async fn count_users_with_role(&self, role: Role) -> Result<u64> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(poisoned_lock)?;

            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM user_roles WHERE role = ?1",
                params![role.as_str()],
                |row| row.get(0),
            )?;

            Ok(count as u64)
        })
        .await
        .map_err(join_failed)?
    }

    async fn users_with_role(&self, role: Role, page: Page) -> Result<Slice<User>> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(poisoned_lock)?;

            // Probe one row past the page to learn whether a next page exists.
            let mut stmt = conn.prepare(
                "SELECT username FROM user_roles WHERE role = ?1
                 ORDER BY username LIMIT ?2 OFFSET ?3",
            )?;
            let names = stmt
                .query_map(
                    params![
                        role.as_str(),
                        (page.size + 1) as i64,
                        page.offset() as i64,
                    ],
                    |row| row.get::<_, String>(0),
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut users = Vec::with_capacity(names.len());
            for name in names {
                let username = Username::new(&name);
                match load_user(&conn, &username)? {
                    Some(user) => users.push(user),
                    None => {
                        return Err(StoreError::InvalidData(format!(
                            "role row references missing user: {}",
                            name
                        )))
                    }
                }
            }

            Ok(Slice::from_probe(users, page))
        })
        .await
        .map_err(join_failed)?
    }

    async fn put_grant(&self, username: &Username, grant: Grant) -> Result<Option<Level>> {
        let username = username.clone();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(poisoned_lock)?;
            user_exists(&conn, &username)?;

            let previous: Option<i64> = conn
                .query_row(
                    "SELECT level FROM grants WHERE username = ?1 AND app = ?2",
                    params![username.as_str(), grant.app.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            conn.execute(
                "INSERT INTO grants (username, app, level, granted_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(username, app) DO UPDATE SET
                     level = excluded.level,
                     granted_at = excluded.granted_at",
                params![
                    username.as_str(),
                    grant.app.as_str(),
                    grant.level.ordinal() as i64,
                    now_millis(),
                ],
            )?;

            previous.map(decode_level).transpose()
        })
        .await
        .map_err(join_failed)?
    }

    async fn remove_grant(&self, username: &Username, app: &AppId) -> Result<Option<Level>> {
        let username = username.clone();
        let app = app.clone();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(poisoned_lock)?;
            user_exists(&conn, &username)?;

            let previous: Option<i64> = conn
                .query_row(
                    "SELECT level FROM grants WHERE username = ?1 AND app = ?2",
                    params![username.as_str(), app.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            conn.execute(
                "DELETE FROM grants WHERE username = ?1 AND app = ?2",
                params![username.as_str(), app.as_str()],
            )?;

            previous.map(decode_level).transpose()
        })
        .await
        .map_err(join_failed)?
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
