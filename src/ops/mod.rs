//! High-level operations.
//!
//! This module contains the steps of `libsmith library` and the pipeline
//! that runs them.

pub mod assemble;
pub mod base_library;
pub mod format;
pub mod generate_library;
pub mod manifest_patch;
pub mod to_js;

pub use assemble::{assemble, create_files, template_context};
pub use base_library::{LibraryScaffold, WorkspaceLibrary};
pub use format::{format_files, Formatter, WorkspaceFormatter};
pub use generate_library::{generate_library, library_generator, GenerateResult, GeneratorSettings};
pub use manifest_patch::add_build_target;
