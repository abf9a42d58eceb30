//! Adding the `build` target of distributable libraries.

use anyhow::Result;
use serde::Serialize;

use crate::core::errors::GenerateError;
use crate::core::manifest::{TargetConfiguration, WorkspaceManifest};
use crate::core::options::NormalizedOptions;
use crate::core::tree::Tree;
use crate::ops::to_js::maybe_js;

/// Name of the target added to the project entry.
pub const BUILD_TARGET: &str = "build";

/// Options of the package builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageBuildOptions {
    pub output_path: String,
    pub ts_config: String,
    pub package_json: String,
    pub main: String,
    pub assets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_root_for_compilation_root: Option<String>,
}

impl PackageBuildOptions {
    pub fn new(options: &NormalizedOptions, libs_dir: &str) -> Self {
        let root = &options.project_root;
        PackageBuildOptions {
            output_path: format!("dist/{}/{}", libs_dir, options.project_directory),
            ts_config: format!("{}/tsconfig.lib.json", root),
            package_json: format!("{}/package.json", root),
            main: maybe_js(options.js, &format!("{}/src/index.ts", root)),
            assets: vec![format!("{}/*.md", root)],
            src_root_for_compilation_root: options.root_dir.clone().filter(|d| !d.is_empty()),
        }
    }
}

/// The `build` target for a library.
pub fn build_target(
    options: &NormalizedOptions,
    libs_dir: &str,
    builder: &str,
) -> Result<TargetConfiguration> {
    TargetConfiguration::new(builder)
        .with_outputs(vec!["{options.outputPath}".to_string()])
        .with_options(&PackageBuildOptions::new(options, libs_dir))
}

/// Add a `build` target to the library's project entry.
///
/// Returns the manifest unchanged unless the library is publishable or
/// buildable. A project without a target container is left as is.
pub fn add_build_target(
    mut manifest: WorkspaceManifest,
    options: &NormalizedOptions,
    libs_dir: &str,
    builder: &str,
    manifest_file: &str,
) -> Result<WorkspaceManifest> {
    if !options.is_distributable() {
        return Ok(manifest);
    }

    let target = build_target(options, libs_dir, builder)?;
    match manifest.set_project_target(&options.name, BUILD_TARGET, &target)? {
        Some(true) => {
            tracing::debug!("added `{}` target to `{}`", BUILD_TARGET, options.name)
        }
        Some(false) => {
            tracing::debug!("`{}` has no targets; skipping `{}`", options.name, BUILD_TARGET)
        }
        None => {
            return Err(GenerateError::ProjectNotFound {
                project: options.name.clone(),
                manifest: manifest_file.to_string(),
            }
            .into())
        }
    }

    Ok(manifest)
}

/// Apply [`add_build_target`] to the manifest staged in the tree.
pub fn update_workspace_json(
    tree: &mut Tree,
    manifest_file: &str,
    options: &NormalizedOptions,
    libs_dir: &str,
    builder: &str,
) -> Result<()> {
    if !options.is_distributable() {
        return Ok(());
    }

    tree.update_json(manifest_file, |manifest: WorkspaceManifest| {
        add_build_target(manifest, options, libs_dir, builder, manifest_file)
    })
}
