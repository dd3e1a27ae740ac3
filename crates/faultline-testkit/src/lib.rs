//! # Faultline Testkit
//!
//! Testing utilities for the Faultline access layer.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Resolution vectors**: Known account shapes with expected permission outcomes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Seeded gates for integration scenarios
//!
//! ## Resolution Vectors
//!
//! The vectors pin the resolution precedence (explicit grant, then admin
//! fallback, then nothing):
//!
//! ```rust
//! use faultline_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, resolved) in verify_all_vectors() {
//!     assert!(passed, "{name} resolved to {resolved}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use faultline_testkit::generators::{user_from_params, UserParams};
//!
//! proptest! {
//!     #[test]
//!     fn resolution_is_stable(params: UserParams) {
//!         let user = user_from_params(&params);
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up login scenarios:
//!
//! ```rust,ignore
//! use faultline_testkit::fixtures::{AccessFixture, ALICE_PASSWORD};
//!
//! let fixture = AccessFixture::new().await;
//! let ctx = fixture.login_ctx("alice", ALICE_PASSWORD).await;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{seed_canonical_users, seed_reporters, user_with, AccessFixture};
pub use generators::{user_from_params, UserParams};
pub use vectors::{all_vectors, user_from_vector, verify_all_vectors, ResolutionVector};
