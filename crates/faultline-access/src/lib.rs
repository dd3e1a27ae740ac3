//! # Faultline Access
//!
//! Authentication, session lifecycle, and permission enforcement for the
//! Faultline crash-report viewer.
//!
//! The crate covers the path from a submitted username/password pair to a
//! guarded handler call:
//!
//! 1. [`Authenticator`] checks credentials against the identity store and
//!    answers every failure with one indistinct error.
//! 2. [`require_role`] applies the baseline role gate before any session
//!    state changes.
//! 3. [`SessionManager::establish`] discards the pre-login session and binds
//!    the identity to a freshly generated [`SessionId`].
//! 4. [`RequestContext`] carries the validated session into handlers, and
//!    [`has_permission`] / [`require_permission`] / [`EntryGuard`] decide
//!    per-app access from it.
//!
//! ## Key Types
//!
//! - [`Authenticator`]: username/password verification over an `IdentityStore`
//! - [`CredentialScheme`] / [`Argon2Scheme`]: pluggable password hashing
//! - [`SessionManager`]: in-process session table with rotation on login
//! - [`RequestContext`]: explicit per-request authentication state
//! - [`EntryGuard`]: level + app-extractor pair applied at handler entry
//!
//! ## Design Notes
//!
//! - Login failures (unknown user, wrong password, missing role) share one
//!   user-facing message; logs keep the real cause.
//! - Session identifiers rotate on login. The identifier presented before
//!   authentication is removed in the same critical section that inserts
//!   the new one.
//! - Permission checks are pure reads over the identity already in the
//!   context. Denials are ordinary `Err` values, not panics.

pub mod authenticator;
pub mod context;
pub mod error;
pub mod guard;
pub mod session;
pub mod verify;

pub use authenticator::{require_role, Authenticator};
pub use context::RequestContext;
pub use error::{AccessDenied, AuthError, CredentialError, GENERIC_LOGIN_MESSAGE};
pub use guard::{has_permission, require_permission, EntryGuard};
pub use session::{Session, SessionHooks, SessionId, SessionManager};
pub use verify::{generate_password, Argon2Scheme, CredentialScheme};
