//! # Faultline Core
//!
//! Pure access-control primitives for the Faultline crash-report viewer:
//! identities, roles, per-app grants, and permission resolution.
//!
//! This crate contains no I/O, no storage, no sessions. It is pure
//! computation over already-fetched records.
//!
//! ## Key Types
//!
//! - [`Identity`] - The authenticated principal bound to one session
//! - [`User`] - The persisted account record
//! - [`AppId`] - Opaque identifier for a reporting application (one tenant)
//! - [`Level`] - Ordered trust tier (`None < View < Edit < Admin`)
//! - [`Grant`] / [`GrantSet`] - Per-app discretionary access
//!
//! ## Resolution
//!
//! The effective level for an (identity, app) pair comes from
//! [`resolve_level`]: an explicit grant wins, even one of [`Level::None`];
//! otherwise global admins fall back to [`Level::Admin`] and everyone else
//! to [`Level::None`].

pub mod error;
pub mod grant;
pub mod identity;
pub mod level;
pub mod resolve;
pub mod role;
pub mod types;

pub use error::CoreError;
pub use grant::{Grant, GrantSet};
pub use identity::{Authority, Identity, User};
pub use level::Level;
pub use resolve::resolve_level;
pub use role::Role;
pub use types::{AppId, Username};
