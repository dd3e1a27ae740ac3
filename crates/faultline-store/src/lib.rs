//! # Faultline Store
//!
//! Identity persistence for Faultline. Provides a trait-based interface for
//! account storage with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts account persistence behind the
//! [`IdentityStore`] trait, allowing the access layer to be
//! storage-agnostic. The primary implementation is [`SqliteIdentityStore`],
//! with [`MemoryIdentityStore`] for testing.
//!
//! ## Key Types
//!
//! - [`IdentityStore`] - The async trait for all persistence operations
//! - [`SqliteIdentityStore`] - SQLite-based persistent storage
//! - [`MemoryIdentityStore`] - In-memory storage for tests
//! - [`Page`] / [`Slice`] - Offset paging with a next-page probe
//!
//! ## Usage
//!
//! ```rust,no_run
//! use faultline_store::{IdentityStore, SqliteIdentityStore};
//! use faultline_core::Username;
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteIdentityStore::open("faultline.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteIdentityStore::open_memory().unwrap();
//!
//!     let user = store.find_user(&Username::new("alice")).await.unwrap();
//!     assert!(user.is_none());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Normalized keys**: usernames are stored lowercase and matched exactly
//! - **Grant uniqueness**: the `(username, app)` primary key makes a second
//!   grant for the same app replace the first
//! - **Strict decoding**: unknown role names or level ordinals in storage
//!   surface as [`StoreError::InvalidData`]

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryIdentityStore;
pub use sqlite::SqliteIdentityStore;
pub use traits::{IdentityStore, Page, Slice};
