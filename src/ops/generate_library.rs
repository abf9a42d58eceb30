//! Implementation of `libsmith library`.

use anyhow::Result;

use crate::core::manifest::PACKAGE_BUILDER;
use crate::core::options::{ensure_import_path, normalize, LibraryOptions, NormalizedOptions};
use crate::core::template::TemplateSet;
use crate::core::tree::{FileChange, Tree};
use crate::core::workspace::{Workspace, WorkspaceContext};
use crate::ops::assemble::create_files;
use crate::ops::base_library::{LibraryScaffold, WorkspaceLibrary};
use crate::ops::format::{format_files, Formatter, WorkspaceFormatter};
use crate::ops::manifest_patch::update_workspace_json;
use crate::ops::to_js::update_tsconfigs_to_js;
use crate::util::config::Config;

/// Settings that do not come from the command line.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Builder of the `build` target
    pub builder: String,

    /// Templates rendered into the project root
    pub templates: TemplateSet,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            builder: PACKAGE_BUILDER.to_string(),
            templates: TemplateSet::bundled(),
        }
    }
}

impl GeneratorSettings {
    /// Settings from the `[library]` table of the config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(GeneratorSettings {
            builder: config
                .library
                .builder
                .clone()
                .unwrap_or_else(|| PACKAGE_BUILDER.to_string()),
            templates: TemplateSet::load(config.library.templates_dir.as_deref())?,
        })
    }
}

/// Outcome of a library generation.
#[derive(Debug)]
pub struct GenerateResult {
    /// Resolved options the library was generated from
    pub options: NormalizedOptions,

    /// Changes made to the workspace, or that would be made on a dry run
    pub changes: Vec<FileChange>,

    pub dry_run: bool,
}

/// Stage a new library in `tree`.
///
/// Every step only touches the tree, so an error leaves the workspace
/// unchanged.
pub fn library_generator(
    tree: &mut Tree,
    raw: &LibraryOptions,
    context: &WorkspaceContext,
    manifest_file: &str,
    settings: &GeneratorSettings,
    scaffold: &dyn LibraryScaffold,
    formatter: &dyn Formatter,
) -> Result<NormalizedOptions> {
    let options = normalize(raw, context)?;
    ensure_import_path(raw, &options)?;

    tracing::debug!("running base generator `{}`", scaffold.name());
    scaffold.generate(tree, &options)?;

    create_files(tree, &options, &settings.templates)?;

    if options.js {
        update_tsconfigs_to_js(tree, &options)?;
    }

    update_workspace_json(
        tree,
        manifest_file,
        &options,
        &context.libs_dir,
        &settings.builder,
    )?;

    if !options.skip_format {
        format_files(tree, formatter)?;
    }

    Ok(options)
}

/// Generate a library into the workspace.
///
/// On a dry run the changes are computed but nothing is written.
pub fn generate_library(
    workspace: &Workspace,
    raw: &LibraryOptions,
    settings: &GeneratorSettings,
    dry_run: bool,
) -> Result<GenerateResult> {
    let mut tree = Tree::new(workspace.root());
    let scaffold = WorkspaceLibrary::new(workspace.manifest_file());

    let options = library_generator(
        &mut tree,
        raw,
        workspace.context(),
        workspace.manifest_file(),
        settings,
        &scaffold,
        &WorkspaceFormatter,
    )?;

    let changes = if dry_run {
        tree.changes()?
    } else {
        tree.commit()?
    };

    tracing::debug!(
        "{} `{}` at {} ({} changes)",
        if dry_run { "planned" } else { "generated" },
        options.name,
        options.project_root,
        changes.len()
    );

    Ok(GenerateResult {
        options,
        changes,
        dry_run,
    })
}
