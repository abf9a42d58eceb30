//! Configuration file support for libsmith.
//!
//! libsmith reads two configuration file locations:
//! - Global: `~/.libsmith/config.toml` - User-wide defaults
//! - Project: `<workspace>/.libsmith/config.toml` - Workspace-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::options::{TestEnvironment, UnitTestRunner};

/// libsmith configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for `libsmith library`
    pub library: LibraryConfig,

    /// Workspace setting overrides
    pub workspace: WorkspaceConfig,
}

/// Defaults for generated libraries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Unit test runner when `--unitTestRunner` is not given
    pub unit_test_runner: Option<UnitTestRunner>,

    /// Jest environment when `--testEnvironment` is not given
    pub test_environment: Option<TestEnvironment>,

    /// Generate JavaScript when `--js` is not given
    pub js: Option<bool>,

    /// Add a build target when `--buildable` is not given
    pub buildable: Option<bool>,

    /// Skip the formatter when `--skipFormat` is not given
    pub skip_format: Option<bool>,

    /// Builder used for the `build` target (e.g. @nrwl/node:package)
    pub builder: Option<String>,

    /// Directory of library templates replacing the bundled ones
    pub templates_dir: Option<PathBuf>,
}

/// Overrides for values normally read from `nx.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory libraries are created under (e.g. libs)
    pub libs_dir: Option<String>,

    /// npm scope for synthesized import paths (e.g. acme)
    pub npm_scope: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;

        // Relative template directories are relative to the config file.
        if let (Some(dir), Some(parent)) = (&config.library.templates_dir, path.parent()) {
            if dir.is_relative() {
                config.library.templates_dir = Some(parent.join(dir));
            }
        }

        Ok(config)
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let lib = other.library;
        if lib.unit_test_runner.is_some() {
            self.library.unit_test_runner = lib.unit_test_runner;
        }
        if lib.test_environment.is_some() {
            self.library.test_environment = lib.test_environment;
        }
        if lib.js.is_some() {
            self.library.js = lib.js;
        }
        if lib.buildable.is_some() {
            self.library.buildable = lib.buildable;
        }
        if lib.skip_format.is_some() {
            self.library.skip_format = lib.skip_format;
        }
        if lib.builder.is_some() {
            self.library.builder = lib.builder;
        }
        if lib.templates_dir.is_some() {
            self.library.templates_dir = lib.templates_dir;
        }

        let ws = other.workspace;
        if ws.libs_dir.is_some() {
            self.workspace.libs_dir = ws.libs_dir;
        }
        if ws.npm_scope.is_some() {
            self.workspace.npm_scope = ws.npm_scope;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.libsmith/config.toml)
/// 2. Global config (~/.libsmith/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global libsmith config directory (~/.libsmith).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".libsmith"))
}

/// Get the project config path (.libsmith/config.toml).
pub fn project_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".libsmith").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[library]
unit_test_runner = "none"
test_environment = "jsdom"
js = true
builder = "@acme/builders:package"
templates_dir = "templates/lib"

[workspace]
npm_scope = "acme"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.library.unit_test_runner, Some(UnitTestRunner::None));
        assert_eq!(config.library.test_environment, Some(TestEnvironment::Jsdom));
        assert_eq!(config.library.js, Some(true));
        assert!(config.library.buildable.is_none());
        assert_eq!(config.library.builder.as_deref(), Some("@acme/builders:package"));
        assert_eq!(
            config.library.templates_dir,
            Some(tmp.path().join("templates/lib"))
        );
        assert_eq!(config.workspace.npm_scope.as_deref(), Some("acme"));
        assert!(config.workspace.libs_dir.is_none());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());

        std::fs::write(
            &global,
            r#"
[library]
unit_test_runner = "none"
js = true
buildable = true

[workspace]
npm_scope = "global"
libs_dir = "packages"
"#,
        )
        .unwrap();
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(
            &project,
            r#"
[library]
unit_test_runner = "jest"
js = false

[workspace]
npm_scope = "project"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.library.unit_test_runner, Some(UnitTestRunner::Jest));
        assert_eq!(config.library.js, Some(false));
        assert_eq!(config.library.buildable, Some(true));
        assert!(config.library.skip_format.is_none());
        assert_eq!(config.workspace.npm_scope.as_deref(), Some("project"));
        assert_eq!(config.workspace.libs_dir.as_deref(), Some("packages"));
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &project_config_path(tmp.path()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[library\nbroken").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }
}
