//! # Faultline
//!
//! The unified access-control API for the Faultline crash-report viewer:
//! accounts, sessions, and per-app permission gating.
//!
//! ## Overview
//!
//! Faultline serves crash reports for many applications to many users, and
//! this crate decides who may see what:
//!
//! - **Accounts**: Users with lowercase usernames, Argon2id credential
//!   hashes, coarse roles, and per-app grants
//! - **Login**: Credential check and role gate with one indistinct failure
//!   message, then session establishment under a fresh id
//! - **Sessions**: In-process table with rotation on login and a fixed TTL
//! - **Permissions**: An explicit grant on an app wins outright; admins
//!   fall back to full access only where no grant says otherwise
//!
//! ## Key Concepts
//!
//! - **Grant**: At most one per (user, app). Issuing again replaces.
//! - **Level**: `None < View < Edit < Admin`; holding a level satisfies
//!   every level below it.
//! - **RequestContext**: The authentication state of one request, passed
//!   explicitly. Nothing is resolved from ambient state.
//! - **Session rotation**: The id presented before login is discarded in
//!   the same critical section that binds the new one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use faultline::{AppId, Gatekeeper, GatekeeperConfig, Grant, Level, Role};
//! use faultline::store::SqliteIdentityStore;
//!
//! async fn example() {
//!     // Open account storage
//!     let store = SqliteIdentityStore::open("faultline.db").unwrap();
//!
//!     // Create the gatekeeper
//!     let gate = Gatekeeper::new(store, GatekeeperConfig::default());
//!
//!     // First run: provision the admin account
//!     if let Some(password) = gate.ensure_default_admin().await.unwrap() {
//!         println!("admin password: {password}");
//!     }
//!
//!     // Log in and check access
//!     let session = gate.login(None, "admin", "...").await.unwrap();
//!     let ctx = gate.context(Some(&session.id));
//!     assert!(gate.has_permission(&ctx, &AppId::new("demo"), Level::View));
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `faultline::core` - Core types (Username, Level, Grant, resolution)
//! - `faultline::store` - Account persistence (SQLite and in-memory)
//! - `faultline::access` - Authentication, sessions, and guards

pub mod error;
pub mod gatekeeper;

// Re-export component crates
pub use faultline_access as access;
pub use faultline_core as core;
pub use faultline_store as store;

// Re-export main types for convenience
pub use error::{GateError, Result};
pub use gatekeeper::{Gatekeeper, GatekeeperConfig, DEFAULT_ADMIN_USERNAME};

// Re-export commonly used component types
pub use faultline_access::{
    has_permission, require_permission, AccessDenied, Argon2Scheme, AuthError, CredentialScheme,
    EntryGuard, RequestContext, Session, SessionHooks, SessionId, SessionManager,
    GENERIC_LOGIN_MESSAGE,
};
pub use faultline_core::{
    resolve_level, AppId, Authority, Grant, GrantSet, Identity, Level, Role, User, Username,
};
pub use faultline_store::{
    IdentityStore, MemoryIdentityStore, Page, Slice, SqliteIdentityStore, StoreError,
};
