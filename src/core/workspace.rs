//! Workspace - the monorepo a library is generated into.
//!
//! A Workspace is the directory holding `workspace.json` (or its
//! `angular.json` alias), plus the settings read from `nx.json` that the
//! generator needs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::GenerateError;
use crate::core::manifest::NxJson;
use crate::util::config::Config;
use crate::util::fs;

/// Canonical project registry file name.
pub const MANIFEST_NAME: &str = "workspace.json";

/// Alias accepted for the project registry.
pub const MANIFEST_ALIAS: &str = "angular.json";

/// Workspace-wide settings file.
pub const NX_JSON: &str = "nx.json";

/// Root TypeScript configuration holding the import path mappings.
pub const TSCONFIG_BASE: &str = "tsconfig.base.json";

/// Default directory libraries are created under.
pub const DEFAULT_LIBS_DIR: &str = "libs";

/// Read-only facts about the workspace the normalizer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    /// Base path for all libraries, relative to the workspace root
    pub libs_dir: String,

    /// Default organization scope for import paths
    pub npm_scope: Option<String>,
}

impl Default for WorkspaceContext {
    fn default() -> Self {
        WorkspaceContext {
            libs_dir: DEFAULT_LIBS_DIR.to_string(),
            npm_scope: None,
        }
    }
}

/// Find the registry file in a single directory.
///
/// Returns an error if both the canonical name and the alias exist.
pub fn find_manifest(dir: &Path) -> Result<PathBuf, GenerateError> {
    let primary = dir.join(MANIFEST_NAME);
    let alias = dir.join(MANIFEST_ALIAS);

    match (primary.is_file(), alias.is_file()) {
        (true, true) => Err(GenerateError::AmbiguousWorkspace { primary, alias }),
        (true, false) => Ok(primary),
        (false, true) => Ok(alias),
        (false, false) => Err(GenerateError::WorkspaceNotFound {
            dir: dir.to_path_buf(),
        }),
    }
}

/// Find the registry file starting from `start` and searching upward.
pub fn find_manifest_upward(start: &Path) -> Result<PathBuf, GenerateError> {
    let mut current = start.to_path_buf();
    loop {
        match find_manifest(&current) {
            Ok(path) => return Ok(path),
            Err(GenerateError::WorkspaceNotFound { .. }) => {
                if !current.pop() {
                    return Err(GenerateError::WorkspaceNotFound {
                        dir: start.to_path_buf(),
                    });
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// A workspace on disk.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Workspace root directory
    root: PathBuf,

    /// Registry file name, relative to the root
    manifest_file: String,

    /// Values handed to the normalizer
    context: WorkspaceContext,
}

impl Workspace {
    /// Open the workspace whose registry file is at `manifest_path`.
    ///
    /// Settings come from `nx.json`; `[workspace]` entries of the config
    /// override them.
    pub fn new(manifest_path: &Path, config: &Config) -> Result<Self> {
        let root = manifest_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let manifest_file = manifest_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(MANIFEST_NAME)
            .to_string();

        let nx_path = root.join(NX_JSON);
        let nx: NxJson = if nx_path.is_file() {
            let content = fs::read_to_string(&nx_path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", nx_path.display()))?
        } else {
            tracing::debug!("no {} in {}", NX_JSON, root.display());
            NxJson::default()
        };

        let libs_dir = config
            .workspace
            .libs_dir
            .clone()
            .or_else(|| nx.libs_dir().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_LIBS_DIR.to_string());
        let npm_scope = config
            .workspace
            .npm_scope
            .clone()
            .or_else(|| nx.npm_scope().map(str::to_string));

        Ok(Workspace {
            root,
            manifest_file,
            context: WorkspaceContext {
                libs_dir,
                npm_scope,
            },
        })
    }

    /// Discover the workspace enclosing `cwd`.
    pub fn discover(cwd: &Path, config: &Config) -> Result<Self> {
        let manifest_path = find_manifest_upward(cwd)?;
        Self::new(&manifest_path, config)
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registry file name, relative to the root.
    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    /// Get the normalizer inputs.
    pub fn context(&self) -> &WorkspaceContext {
        &self.context
    }

    /// Directory holding project-level libsmith configuration.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(".libsmith")
    }
}
