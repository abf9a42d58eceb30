//! Test utilities for libsmith unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use libsmith::test_support::WorkspaceFixture;
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     WorkspaceFixture::new("acme").write(tmp.path()).unwrap();
//!     // Generate into tmp.path()...
//! }
//! ```

pub mod fixtures;

// Re-export fixtures for convenience
pub use fixtures::*;
