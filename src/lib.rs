//! libsmith - A library generator for Nx-style monorepo workspaces
//!
//! This crate provides the core library functionality for libsmith,
//! including option normalization, template assembly, and workspace
//! manifest patching.

pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for libsmith unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{errors::GenerateError, options::LibraryOptions, tree::Tree, workspace::Workspace};
pub use ops::generate_library::generate_library;
pub use util::context::GlobalContext;
