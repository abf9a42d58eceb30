//! Core data structures for libsmith.
//!
//! This module contains the types every generator step works with:
//! - Library options and their normalization
//! - Workspace discovery and manifest records
//! - The staged change tree and library templates

pub mod errors;
pub mod manifest;
pub mod names;
pub mod options;
pub mod template;
pub mod tree;
pub mod workspace;

pub use errors::GenerateError;
pub use manifest::{NxJson, ProjectConfiguration, TargetConfiguration, WorkspaceManifest};
pub use options::{LibraryOptions, NormalizedOptions};
pub use tree::{ChangeKind, FileChange, Tree};
pub use workspace::{find_manifest, Workspace, WorkspaceContext, MANIFEST_ALIAS, MANIFEST_NAME};
