//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Get current version
    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Apply migrations
    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            tracing::debug!(version, "applying schema migration");
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Accounts table: one row per user
        CREATE TABLE users (
            username TEXT PRIMARY KEY,        -- normalized (lowercase) login name
            password_hash TEXT NOT NULL,      -- PHC string (argon2id)
            created_at INTEGER NOT NULL,      -- Unix ms
            updated_at INTEGER NOT NULL
        );

        -- Global roles, one row per (user, role)
        CREATE TABLE user_roles (
            username TEXT NOT NULL,
            role TEXT NOT NULL,               -- stored role name ("user", "admin", "reporter")
            PRIMARY KEY (username, role)
        );

        -- Per-app grants. The primary key enforces at most one grant
        -- per (user, app); writes replace.
        CREATE TABLE grants (
            username TEXT NOT NULL,
            app TEXT NOT NULL,
            level INTEGER NOT NULL,           -- Level ordinal (0=none .. 3=admin)
            granted_at INTEGER NOT NULL,      -- Unix ms
            PRIMARY KEY (username, app)
        );

        -- Indexes for common queries
        CREATE INDEX idx_user_roles_role ON user_roles(role);
        CREATE INDEX idx_grants_app ON grants(app);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
