//! Library template files and placeholder substitution.
//!
//! Templates use two placeholder forms:
//! - `<%= key %>` inside file contents,
//! - `__key__` inside file paths.
//!
//! The `tmpl` key renders to the empty string, so a `__tmpl__` suffix marks a
//! file as a template without ending up in the generated path.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::core::errors::GenerateError;
use crate::util::fs;

static CONTENT_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<%=\s*([A-Za-z_][A-Za-z0-9_]*)\s*%>").unwrap());

static PATH_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([A-Za-z][A-Za-z0-9]*)__").unwrap());

macro_rules! bundled {
    ($($path:literal),* $(,)?) => {
        &[$(($path, include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/lib/", $path)))),*]
    };
}

/// Library templates compiled into the binary, in emission order.
const BUNDLED_LIB: &[(&str, &str)] = bundled![
    "README.md__tmpl__",
    "package.json__tmpl__",
    "src/index.ts__tmpl__",
    "src/lib/__fileName__.ts__tmpl__",
    "src/lib/__fileName__.spec.ts__tmpl__",
    "tsconfig.lib.json__tmpl__",
];

/// A single template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// `/`-separated path relative to the template root
    pub path: String,
    pub content: String,
}

/// A rendered file, not yet placed in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: String,
}

/// An ordered set of template files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    files: Vec<TemplateFile>,
}

impl TemplateSet {
    /// The library templates shipped with libsmith.
    pub fn bundled() -> Self {
        TemplateSet {
            files: BUNDLED_LIB
                .iter()
                .map(|(path, content)| TemplateFile {
                    path: path.to_string(),
                    content: content.to_string(),
                })
                .collect(),
        }
    }

    pub fn from_files(files: Vec<TemplateFile>) -> Self {
        TemplateSet { files }
    }

    /// Load every file below `dir`, sorted by path.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for path in fs::list_files(dir)? {
            let content = fs::read_to_string(&fs::join_slash(dir, &path))
                .with_context(|| format!("failed to load template {}", path))?;
            files.push(TemplateFile { path, content });
        }

        tracing::debug!("loaded {} templates from {}", files.len(), dir.display());
        Ok(TemplateSet { files })
    }

    /// Bundled templates, or the ones in `dir` when given.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::bundled()),
        }
    }

    /// Substitute every placeholder in paths and contents.
    pub fn render(&self, context: &Map<String, Value>) -> Result<Vec<RenderedFile>, GenerateError> {
        self.files
            .iter()
            .map(|file| {
                Ok(RenderedFile {
                    path: render_path(&file.path, context, &file.path)?,
                    content: render_str(&file.content, context, &file.path)?,
                })
            })
            .collect()
    }
}

/// Render `<%= key %>` placeholders.
pub fn render_str(
    input: &str,
    context: &Map<String, Value>,
    template: &str,
) -> Result<String, GenerateError> {
    substitute(&CONTENT_PLACEHOLDER, input, context, template)
}

/// Render `__key__` placeholders.
pub fn render_path(
    input: &str,
    context: &Map<String, Value>,
    template: &str,
) -> Result<String, GenerateError> {
    substitute(&PATH_PLACEHOLDER, input, context, template)
}

fn substitute(
    pattern: &Regex,
    input: &str,
    context: &Map<String, Value>,
    template: &str,
) -> Result<String, GenerateError> {
    let mut missing = None;

    let rendered = pattern.replace_all(input, |caps: &Captures| {
        let key = &caps[1];
        match context.get(key) {
            Some(value) => value_to_string(value),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(placeholder) => Err(GenerateError::UnknownPlaceholder {
            template: template.to_string(),
            placeholder,
        }),
        None => Ok(rendered.into_owned()),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Map<String, Value> {
        match json!({
            "name": "shared-foo",
            "fileName": "shared-foo",
            "propertyName": "sharedFoo",
            "publishable": true,
            "parsedTags": ["a", "b"],
            "prefix": null,
            "tmpl": ""
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_render_content() {
        let out = render_str(
            "export function <%= propertyName %>() { return '<%=name%>'; } // <%= publishable %>",
            &context(),
            "t",
        )
        .unwrap();
        assert_eq!(out, "export function sharedFoo() { return 'shared-foo'; } // true");
    }

    #[test]
    fn test_render_values() {
        let ctx = context();
        assert_eq!(render_str("<%= parsedTags %>", &ctx, "t").unwrap(), r#"["a","b"]"#);
        assert_eq!(render_str("[<%= prefix %>]", &ctx, "t").unwrap(), "[]");
    }

    #[test]
    fn test_render_path_strips_tmpl_suffix() {
        let out = render_path("src/lib/__fileName__.spec.ts__tmpl__", &context(), "t").unwrap();
        assert_eq!(out, "src/lib/shared-foo.spec.ts");
    }

    #[test]
    fn test_unknown_placeholder_fails() {
        let err = render_str("<%= nope %>", &context(), "README.md__tmpl__").unwrap_err();
        match err {
            GenerateError::UnknownPlaceholder {
                template,
                placeholder,
            } => {
                assert_eq!(template, "README.md__tmpl__");
                assert_eq!(placeholder, "nope");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bundled_templates() {
        let set = TemplateSet::bundled();
        assert_eq!(set.files.len(), 6);
        assert!(set.files.iter().any(|f| f.path == "package.json__tmpl__"));
        assert!(set.files[0].content.contains("<%= name %>"));
    }

    #[test]
    fn test_from_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/__fileName__.ts__tmpl__"), "// <%= name %>").unwrap();
        std::fs::write(tmp.path().join("LICENSE"), "MIT").unwrap();

        let set = TemplateSet::load(Some(tmp.path())).unwrap();
        let rendered = set.render(&context()).unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].path, "LICENSE");
        assert_eq!(rendered[1].path, "src/shared-foo.ts");
        assert_eq!(rendered[1].content, "// shared-foo");
    }
}
