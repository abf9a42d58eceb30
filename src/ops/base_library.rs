//! The base library generator.
//!
//! Registers a new library in the workspace and writes its skeleton. The
//! library command runs it first and layers its own files and targets on
//! top, so it sits behind the [`LibraryScaffold`] trait.

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::core::errors::GenerateError;
use crate::core::manifest::{
    NxJson, ProjectConfiguration, TargetConfiguration, WorkspaceManifest, JEST_BUILDER,
    LINT_BUILDER,
};
use crate::core::names::{offset_from_root, Names};
use crate::core::options::{NormalizedOptions, UnitTestRunner};
use crate::core::tree::Tree;
use crate::core::workspace::{NX_JSON, TSCONFIG_BASE};
use crate::ops::to_js::{self, maybe_js};

/// Generator that lays down the bare library project.
pub trait LibraryScaffold {
    /// Name shown in logs.
    fn name(&self) -> &str;

    /// Stage the project registration and skeleton files.
    fn generate(&self, tree: &mut Tree, options: &NormalizedOptions) -> Result<()>;
}

/// Scaffold for Nx-style workspaces.
#[derive(Debug, Clone)]
pub struct WorkspaceLibrary {
    /// Registry file, relative to the workspace root
    manifest_file: String,
}

impl WorkspaceLibrary {
    pub fn new(manifest_file: impl Into<String>) -> Self {
        WorkspaceLibrary {
            manifest_file: manifest_file.into(),
        }
    }
}

impl LibraryScaffold for WorkspaceLibrary {
    fn name(&self) -> &str {
        "workspace-library"
    }

    fn generate(&self, tree: &mut Tree, options: &NormalizedOptions) -> Result<()> {
        register_project(tree, &self.manifest_file, options)?;
        register_tags(tree, options)?;
        if !options.skip_ts_config {
            register_import_path(tree, options)?;
        }
        write_skeleton(tree, options)?;

        if options.js {
            to_js::convert_project_sources(tree, &options.project_root)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LintOptions {
    lint_file_patterns: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JestOptions {
    jest_config: String,
    pass_with_no_tests: bool,
}

/// The project entry for a new library.
pub fn project_configuration(options: &NormalizedOptions) -> Result<ProjectConfiguration> {
    let root = &options.project_root;

    let mut project = ProjectConfiguration {
        root: root.clone(),
        source_root: Some(format!("{}/src", root)),
        project_type: Some("library".to_string()),
        architect: Some(Map::new()),
        extra: Map::new(),
    };

    let lint = TargetConfiguration::new(LINT_BUILDER).with_options(&LintOptions {
        lint_file_patterns: vec![maybe_js(options.js, &format!("{}/**/*.ts", root))],
    })?;
    project.set_target("lint", &lint)?;

    if options.unit_test_runner == UnitTestRunner::Jest {
        let test = TargetConfiguration::new(JEST_BUILDER)
            .with_outputs(vec![format!("coverage/{}", root)])
            .with_options(&JestOptions {
                jest_config: format!("{}/jest.config.js", root),
                pass_with_no_tests: true,
            })?;
        project.set_target("test", &test)?;
    }

    Ok(project)
}

fn register_project(tree: &mut Tree, manifest_file: &str, options: &NormalizedOptions) -> Result<()> {
    let project = project_configuration(options)?;

    tree.update_json(manifest_file, |mut manifest: WorkspaceManifest| {
        if manifest.contains_project(&options.name) {
            return Err(GenerateError::ProjectAlreadyExists {
                project: options.name.clone(),
                root: options.project_root.clone(),
            }
            .into());
        }
        manifest.set_project(&options.name, &project)?;
        Ok(manifest)
    })
}

fn register_tags(tree: &mut Tree, options: &NormalizedOptions) -> Result<()> {
    if !tree.exists(NX_JSON) {
        tracing::debug!("no {}; not registering tags", NX_JSON);
        return Ok(());
    }

    tree.update_json(NX_JSON, |mut nx: NxJson| {
        nx.set_project_tags(&options.name, &options.parsed_tags)?;
        Ok(nx)
    })
}

fn register_import_path(tree: &mut Tree, options: &NormalizedOptions) -> Result<()> {
    if !tree.exists(TSCONFIG_BASE) {
        tracing::warn!(
            "cannot find {}; `{}` was not added to its paths",
            TSCONFIG_BASE,
            options.import_path
        );
        return Ok(());
    }

    let entry = maybe_js(options.js, &format!("{}/src/index.ts", options.project_root));

    tree.update_json(TSCONFIG_BASE, |mut json: Value| {
        let Some(root) = json.as_object_mut() else {
            anyhow::bail!("{} is not a JSON object", TSCONFIG_BASE);
        };
        let compiler_options = root
            .entry("compilerOptions")
            .or_insert_with(|| Value::Object(Map::new()));
        let paths = compiler_options
            .as_object_mut()
            .map(|co| co.entry("paths").or_insert_with(|| Value::Object(Map::new())))
            .and_then(Value::as_object_mut);
        let Some(paths) = paths else {
            anyhow::bail!("`compilerOptions.paths` in {} is not an object", TSCONFIG_BASE);
        };

        if paths.contains_key(&options.import_path) {
            return Err(GenerateError::ImportPathInUse {
                import_path: options.import_path.clone(),
            }
            .into());
        }
        paths.insert(options.import_path.clone(), json!([entry]));
        Ok(json)
    })
}

fn write_skeleton(tree: &mut Tree, options: &NormalizedOptions) -> Result<()> {
    let root = &options.project_root;
    let offset = offset_from_root(root);
    let names = Names::new(&options.name);
    let jest = options.unit_test_runner == UnitTestRunner::Jest;

    tree.write(
        &format!("{}/README.md", root),
        format!("# {}\n\nThis library was generated with libsmith.\n", names.name),
    )?;

    tree.write_json(
        &format!("{}/.eslintrc.json", root),
        &json!({
            "extends": [format!("{}.eslintrc.json", offset)],
            "ignorePatterns": ["!**/*"],
            "rules": {}
        }),
    )?;

    let mut references = vec![json!({ "path": "./tsconfig.lib.json" })];
    if jest {
        references.push(json!({ "path": "./tsconfig.spec.json" }));
    }
    tree.write_json(
        &format!("{}/tsconfig.json", root),
        &json!({
            "extends": format!("{}tsconfig.base.json", offset),
            "files": [],
            "include": [],
            "references": references
        }),
    )?;

    tree.write_json(
        &format!("{}/tsconfig.lib.json", root),
        &json!({
            "extends": "./tsconfig.json",
            "compilerOptions": {
                "outDir": format!("{}dist/out-tsc", offset),
                "types": []
            },
            "exclude": ["**/*.spec.ts"],
            "include": ["**/*.ts"]
        }),
    )?;

    tree.write(
        &format!("{}/src/index.ts", root),
        format!("export * from './lib/{}';\n", names.file_name),
    )?;
    tree.write(
        &format!("{}/src/lib/{}.ts", root, names.file_name),
        format!(
            "export function {}(): string {{\n  return '{}';\n}}\n",
            names.property_name, names.name
        ),
    )?;

    if jest {
        tree.write(
            &format!("{}/jest.config.js", root),
            format!(
                "module.exports = {{\n  displayName: '{}',\n  preset: '{}jest.preset.js',\n  testEnvironment: '{}',\n  moduleFileExtensions: ['ts', 'js', 'html'],\n  coverageDirectory: '{}coverage/{}',\n}};\n",
                options.name,
                offset,
                options.test_environment.as_str(),
                offset,
                root
            ),
        )?;

        tree.write_json(
            &format!("{}/tsconfig.spec.json", root),
            &json!({
                "extends": "./tsconfig.json",
                "compilerOptions": {
                    "outDir": format!("{}dist/out-tsc", offset),
                    "module": "commonjs",
                    "types": ["jest", "node"]
                },
                "include": ["**/*.spec.ts", "**/*.d.ts"]
            }),
        )?;

        tree.write(
            &format!("{}/src/lib/{}.spec.ts", root, names.file_name),
            format!(
                "import {{ {prop} }} from './{file}';\n\ndescribe('{prop}', () => {{\n  it('should work', () => {{\n    expect({prop}()).toEqual('{name}');\n  }});\n}});\n",
                prop = names.property_name,
                file = names.file_name,
                name = names.name
            ),
        )?;
    }

    Ok(())
}
