//! Assembly of the library file set.
//!
//! Templates are rendered against the normalized options, moved under the
//! project root, then passed through an ordered list of flag-gated steps.

use anyhow::Result;
use serde_json::{Map, Value};

use crate::core::names::{offset_from_root, Names};
use crate::core::options::{NormalizedOptions, UnitTestRunner};
use crate::core::template::{RenderedFile, TemplateSet};
use crate::core::tree::Tree;
use crate::ops::to_js;

/// Suffix of unit test files.
pub const SPEC_SUFFIX: &str = "spec.ts";

/// Suffix of the package manifest.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// A transform over the file set that only runs when its predicate holds.
pub struct FileStep {
    pub name: &'static str,
    pub applies: fn(&NormalizedOptions) -> bool,
    pub apply: fn(Vec<RenderedFile>) -> Vec<RenderedFile>,
}

/// The steps run after rendering, in order.
pub fn file_steps() -> Vec<FileStep> {
    vec![
        FileStep {
            name: "drop-specs",
            applies: |o| o.unit_test_runner == UnitTestRunner::None,
            apply: |files| {
                files
                    .into_iter()
                    .filter(|f| !f.path.ends_with(SPEC_SUFFIX))
                    .collect()
            },
        },
        FileStep {
            name: "drop-package-manifest",
            applies: |o| !o.is_distributable(),
            apply: |files| {
                files
                    .into_iter()
                    .filter(|f| !f.path.ends_with(PACKAGE_MANIFEST))
                    .collect()
            },
        },
        FileStep {
            name: "to-js",
            applies: |o| o.js,
            apply: |files| {
                files
                    .into_iter()
                    .map(|f| match to_js::convert(&f.path, &f.content) {
                        Some((path, content)) => RenderedFile { path, content },
                        None => f,
                    })
                    .collect()
            },
        },
    ]
}

/// Build the placeholder values for the library templates.
///
/// Normalized options, then the casing variants of the project name, then
/// `offsetFromRoot` and the empty `tmpl` marker. Later entries win.
pub fn template_context(options: &NormalizedOptions) -> Result<Map<String, Value>> {
    let mut context = match serde_json::to_value(options)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if let Value::Object(names) = serde_json::to_value(Names::new(&options.name))? {
        context.extend(names);
    }

    context.insert(
        "offsetFromRoot".to_string(),
        Value::String(offset_from_root(&options.project_root)),
    );
    context.insert("tmpl".to_string(), Value::String(String::new()));

    Ok(context)
}

/// Render, relocate and filter the template set.
///
/// The result keeps template order and depends only on its inputs.
pub fn assemble(options: &NormalizedOptions, templates: &TemplateSet) -> Result<Vec<RenderedFile>> {
    let context = template_context(options)?;

    let mut files: Vec<RenderedFile> = templates
        .render(&context)?
        .into_iter()
        .map(|f| RenderedFile {
            path: format!("{}/{}", options.project_root, f.path),
            content: f.content,
        })
        .collect();

    for step in file_steps() {
        if (step.applies)(options) {
            let before = files.len();
            files = (step.apply)(files);
            tracing::debug!("step `{}`: {} -> {} files", step.name, before, files.len());
        }
    }

    Ok(files)
}

/// Stage the assembled files, replacing anything already at their paths.
pub fn create_files(
    tree: &mut Tree,
    options: &NormalizedOptions,
    templates: &TemplateSet,
) -> Result<Vec<String>> {
    let files = assemble(options, templates)?;
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        if tree.exists(&file.path) {
            tracing::debug!("overwriting {}", file.path);
        }
        tree.write(&file.path, file.content)?;
        written.push(file.path);
    }

    Ok(written)
}
