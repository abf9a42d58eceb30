//! Library generator options and their normalization.
//!
//! [`LibraryOptions`] is what the user typed. [`normalize`] turns it into a
//! [`NormalizedOptions`] that every later step reads and nobody mutates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::GenerateError;
use crate::core::names::file_name;
use crate::core::workspace::WorkspaceContext;

/// Message shown when a publishable library has no explicit import path.
pub const MISSING_IMPORT_PATH: &str = "For publishable libs you have to provide a proper \"--importPath\" which needs to be a valid npm package name (e.g. my-awesome-lib or @myorg/my-lib)";

/// Maximum length of an npm package name.
const MAX_PACKAGE_NAME_LEN: usize = 214;

/// Unit test runner wired into the generated library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitTestRunner {
    #[default]
    Jest,
    None,
}

impl UnitTestRunner {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitTestRunner::Jest => "jest",
            UnitTestRunner::None => "none",
        }
    }
}

impl fmt::Display for UnitTestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitTestRunner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jest" => Ok(UnitTestRunner::Jest),
            "none" => Ok(UnitTestRunner::None),
            _ => Err(format!(
                "invalid unit test runner '{}'; expected 'jest' or 'none'",
                s
            )),
        }
    }
}

/// Jest test environment for the generated library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestEnvironment {
    #[default]
    Node,
    Jsdom,
}

impl TestEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestEnvironment::Node => "node",
            TestEnvironment::Jsdom => "jsdom",
        }
    }
}

impl FromStr for TestEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" => Ok(TestEnvironment::Node),
            "jsdom" => Ok(TestEnvironment::Jsdom),
            _ => Err(format!(
                "invalid test environment '{}'; expected 'node' or 'jsdom'",
                s
            )),
        }
    }
}

/// Raw options for generating a library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryOptions {
    /// Library name
    pub name: String,

    /// Directory the library is placed in, under the libs directory
    pub directory: Option<String>,

    /// Package name other projects import the library by
    pub import_path: Option<String>,

    /// Comma-separated project tags
    pub tags: Option<String>,

    /// Library is published to a registry
    pub publishable: bool,

    /// Library gets a build target
    pub buildable: bool,

    /// Generate JavaScript instead of TypeScript
    pub js: bool,

    /// Unit test runner
    pub unit_test_runner: UnitTestRunner,

    /// Jest test environment
    pub test_environment: TestEnvironment,

    /// Compilation root passed through to the build target
    pub root_dir: Option<String>,

    /// Skip formatting the generated files
    pub skip_format: bool,

    /// Do not register the import path in `tsconfig.base.json`
    pub skip_ts_config: bool,
}

/// Fully resolved library options.
///
/// Serialized with camelCase keys; the serialized form is the base of the
/// template context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOptions {
    /// Flat project key, e.g. `shared-foo`
    pub name: String,
    pub file_name: String,
    /// Directory under the libs directory, e.g. `shared/foo`
    pub project_directory: String,
    /// Path from the workspace root, e.g. `libs/shared/foo`
    pub project_root: String,
    /// Workspace npm scope, when one is configured
    pub prefix: Option<String>,
    pub parsed_tags: Vec<String>,
    pub import_path: String,
    pub directory: Option<String>,
    pub tags: Option<String>,
    pub publishable: bool,
    pub buildable: bool,
    pub js: bool,
    pub unit_test_runner: UnitTestRunner,
    pub test_environment: TestEnvironment,
    pub root_dir: Option<String>,
    pub skip_format: bool,
    pub skip_ts_config: bool,
}

impl NormalizedOptions {
    /// Whether the library gets a package manifest and a build target.
    pub fn is_distributable(&self) -> bool {
        self.publishable || self.buildable
    }
}

/// Resolve raw options against the workspace.
pub fn normalize(
    options: &LibraryOptions,
    workspace: &WorkspaceContext,
) -> Result<NormalizedOptions, GenerateError> {
    let name = normalize_path(&file_name(options.name.trim()))?;
    if name.trim_matches(['-', '/']).is_empty() {
        return Err(GenerateError::config(format!(
            "library name `{}` does not produce a valid project name",
            options.name
        )));
    }

    let project_directory = match options.directory.as_deref().map(str::trim) {
        Some(dir) if !dir.is_empty() => format!("{}/{}", file_name(dir), name),
        _ => name.clone(),
    };
    let project_directory = normalize_path(&project_directory)?;

    let project_name = project_directory.replace('/', "-");
    let project_root = normalize_path(&format!("{}/{}", workspace.libs_dir, project_directory))?;

    let parsed_tags = parse_tags(options.tags.as_deref());

    let prefix = workspace.npm_scope.clone();
    let import_path = match options.import_path.as_deref() {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => match prefix.as_deref() {
            Some(scope) if !scope.is_empty() => format!("@{}/{}", scope, project_directory),
            _ => project_directory.clone(),
        },
    };

    tracing::debug!(
        "normalized library `{}` at `{}` (import path `{}`)",
        project_name,
        project_root,
        import_path
    );

    Ok(NormalizedOptions {
        name: project_name.clone(),
        file_name: project_name,
        project_directory,
        project_root,
        prefix,
        parsed_tags,
        import_path,
        directory: options.directory.clone(),
        tags: options.tags.clone(),
        publishable: options.publishable,
        buildable: options.buildable,
        js: options.js,
        unit_test_runner: options.unit_test_runner,
        test_environment: options.test_environment,
        root_dir: options.root_dir.clone(),
        skip_format: options.skip_format,
        skip_ts_config: options.skip_ts_config,
    })
}

/// Refuse publishable libraries without an explicit, valid import path.
///
/// Runs before anything is staged.
pub fn ensure_import_path(
    options: &LibraryOptions,
    normalized: &NormalizedOptions,
) -> Result<(), GenerateError> {
    if !normalized.publishable {
        return Ok(());
    }

    match options.import_path.as_deref() {
        None | Some("") => Err(GenerateError::config(MISSING_IMPORT_PATH)),
        Some(path) => validate_package_name(path).map_err(|reason| {
            GenerateError::InvalidImportPath {
                import_path: path.to_string(),
                reason: reason.to_string(),
            }
        }),
    }
}

/// Split a comma-separated tag list. Empty tokens are kept.
pub fn parse_tags(tags: Option<&str>) -> Vec<String> {
    match tags {
        Some(tags) if !tags.is_empty() => tags.split(',').map(|t| t.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Collapse `.`, empty and `..` segments of a `/`-separated workspace path.
pub fn normalize_path(path: &str) -> Result<String, GenerateError> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(GenerateError::config(format!(
                        "path `{}` escapes the workspace root",
                        path
                    )));
                }
            }
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}

/// Check that `name` is usable as an npm package name.
///
/// Returns Ok(()) if the name is valid, otherwise the rule it breaks.
pub fn validate_package_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("package name cannot be empty");
    }

    if name.len() > MAX_PACKAGE_NAME_LEN {
        return Err("package name cannot be longer than 214 characters");
    }

    if name.trim() != name {
        return Err("package name cannot have leading or trailing whitespace");
    }

    if name.chars().any(|c| c.is_uppercase()) {
        return Err("package name cannot contain uppercase letters");
    }

    let bare = match name.strip_prefix('@') {
        Some(scoped) => {
            let (scope, package) = scoped
                .split_once('/')
                .ok_or("scoped package name must look like @scope/name")?;
            if scope.is_empty() || package.is_empty() || package.contains('/') {
                return Err("scoped package name must look like @scope/name");
            }
            check_url_safe(scope)?;
            package
        }
        None => name,
    };

    if bare.starts_with('.') {
        return Err("package name cannot start with a dot");
    }

    if bare.starts_with('_') {
        return Err("package name cannot start with an underscore");
    }

    check_url_safe(bare)
}

fn check_url_safe(segment: &str) -> Result<(), &'static str> {
    if segment.contains(' ') {
        return Err("package name cannot contain spaces");
    }

    let url_safe = segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'));
    if !url_safe {
        return Err("package name can only contain URL-friendly characters");
    }

    Ok(())
}
