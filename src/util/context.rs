//! Global context for libsmith operations.
//!
//! Provides centralized access to the working directory, the global config
//! location and the workspace the command runs in.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::GenerateError;
use crate::core::workspace::{find_manifest_upward, Workspace};
use crate::util::config::{global_config_dir, load_config, project_config_path, Config};

/// Environment variable overriding the global libsmith directory.
pub const HOME_ENV: &str = "LIBSMITH_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global libsmith data (~/.libsmith/)
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => global_config_dir(),
        };

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use `home` as the global directory; `None` disables global config.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join("config.toml"))
    }

    /// Find the workspace manifest starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, GenerateError> {
        find_manifest_upward(&self.cwd)
    }

    /// Load the merged global and project configuration for a workspace root.
    pub fn load_config(&self, workspace_root: &Path) -> Config {
        load_config(
            self.config_path().as_deref(),
            &project_config_path(workspace_root),
        )
    }

    /// Open the enclosing workspace along with its configuration.
    pub fn workspace(&self) -> Result<(Workspace, Config)> {
        let manifest = self.find_manifest()?;
        let root = manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());

        let config = self.load_config(&root);
        let workspace = Workspace::new(&manifest, &config)?;
        tracing::debug!("workspace root: {}", workspace.root().display());

        Ok((workspace, config))
    }
}
