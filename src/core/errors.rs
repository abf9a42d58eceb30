//! Generator error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised while generating a library.
///
/// Every variant is fatal and is raised before the staged tree is committed,
/// so nothing on disk changes when one is returned.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GenerateError {
    #[error("{message}")]
    #[diagnostic(code(libsmith::config))]
    Configuration { message: String },

    #[error("invalid import path `{import_path}`: {reason}")]
    #[diagnostic(
        code(libsmith::config::import_path),
        help("Use a valid npm package name (e.g. my-awesome-lib or @myorg/my-lib)")
    )]
    InvalidImportPath { import_path: String, reason: String },

    #[error("cannot find project `{project}` in {manifest}")]
    #[diagnostic(code(libsmith::workspace::project_not_found))]
    ProjectNotFound { project: String, manifest: String },

    #[error("cannot create project `{project}` at `{root}`: it already exists")]
    #[diagnostic(code(libsmith::workspace::project_exists))]
    ProjectAlreadyExists { project: String, root: String },

    #[error("you already have a library using the import path `{import_path}`")]
    #[diagnostic(
        code(libsmith::workspace::import_path_in_use),
        help("Pass a unique value with `--importPath`")
    )]
    ImportPathInUse { import_path: String },

    #[error("template `{template}` uses unknown placeholder `{placeholder}`")]
    #[diagnostic(code(libsmith::template::unknown_placeholder))]
    UnknownPlaceholder { template: String, placeholder: String },

    #[error("could not find `workspace.json` in `{}` or any parent directory", .dir.display())]
    #[diagnostic(code(libsmith::workspace::not_found))]
    WorkspaceNotFound { dir: PathBuf },

    #[error(
        "both `{}` and `{}` exist; remove one of them",
        .primary.display(),
        .alias.display()
    )]
    #[diagnostic(code(libsmith::workspace::ambiguous))]
    AmbiguousWorkspace { primary: PathBuf, alias: PathBuf },
}

impl GenerateError {
    /// Build a configuration error from any message.
    pub fn config(message: impl Into<String>) -> Self {
        GenerateError::Configuration {
            message: message.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::Configuration { message } => Diagnostic::error(message.clone()),

            GenerateError::InvalidImportPath {
                import_path,
                reason,
            } => Diagnostic::error(format!("invalid import path `{}`", import_path))
                .with_context(reason.clone())
                .with_suggestion("Use an unscoped name such as `my-awesome-lib`")
                .with_suggestion("Use a scoped name such as `@myorg/my-lib`"),

            GenerateError::ProjectNotFound { project, manifest } => {
                Diagnostic::error(format!("cannot find project `{}`", project))
                    .with_location(manifest.clone())
                    .with_context("the base library generator did not register the project")
            }

            GenerateError::ProjectAlreadyExists { project, root } => {
                Diagnostic::error(format!("project `{}` already exists", project))
                    .with_context(format!("existing project root: {}", root))
                    .with_suggestion("Pick another name or pass `--directory`")
            }

            GenerateError::ImportPathInUse { import_path } => Diagnostic::error(format!(
                "you already have a library using the import path `{}`",
                import_path
            ))
            .with_location("tsconfig.base.json")
            .with_suggestion("Pass a unique value with `--importPath`"),

            GenerateError::UnknownPlaceholder {
                template,
                placeholder,
            } => Diagnostic::error(format!(
                "unknown placeholder `{}` in template",
                placeholder
            ))
            .with_location(template.clone())
            .with_suggestion("Check `templates_dir` in `.libsmith/config.toml`"),

            GenerateError::WorkspaceNotFound { dir } => {
                Diagnostic::error("could not find a workspace")
                    .with_context(format!("searched upward from {}", dir.display()))
                    .with_suggestion(suggestions::NO_WORKSPACE)
            }

            GenerateError::AmbiguousWorkspace { primary, alias } => {
                Diagnostic::error("ambiguous workspace manifest")
                    .with_context(format!("found {}", primary.display()))
                    .with_context(format!("found {}", alias.display()))
                    .with_suggestion("Remove one of the two files")
            }
        }
    }
}
