//! TypeScript to plain JavaScript conversion for `--js` libraries.
//!
//! The conversion is deliberately narrow: it renames `.ts`/`.tsx` files and
//! strips the type syntax the library templates use (function signature
//! annotations and type-only imports). Files that are already JavaScript are
//! left alone, so converting twice changes nothing.

use std::sync::LazyLock;

use anyhow::Result;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::core::options::NormalizedOptions;
use crate::core::tree::Tree;

static FUNCTION_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(function\s*[\w$]*\s*)\(([^)]*)\)\s*(?::\s*[^{=;]+?)?\s*\{").unwrap()
});

static ARROW_RETURN_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\)\s*:\s*[\w$<>\[\]|. ]+?\s*=>").unwrap());

static ARROW_PARAMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)\s*=>").unwrap());

static TYPE_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\s+type\s[^\n]*\n?").unwrap());

/// Swap a TypeScript extension for its JavaScript one when `js` is set.
pub fn maybe_js(js: bool, path: &str) -> String {
    if js {
        to_js_path(path)
    } else {
        path.to_string()
    }
}

/// `.ts` -> `.js`, `.tsx` -> `.jsx`; declaration files and other paths are
/// returned unchanged.
pub fn to_js_path(path: &str) -> String {
    if path.ends_with(".d.ts") {
        return path.to_string();
    }
    if let Some(stem) = path.strip_suffix(".tsx") {
        return format!("{}.jsx", stem);
    }
    if let Some(stem) = path.strip_suffix(".ts") {
        return format!("{}.js", stem);
    }
    path.to_string()
}

/// Check if a path names a TypeScript source file.
pub fn is_ts_source(path: &str) -> bool {
    to_js_path(path) != path
}

/// Strip the type syntax the templates produce.
pub fn strip_types(source: &str) -> String {
    let without_imports = TYPE_IMPORT.replace_all(source, "");

    let signatures = FUNCTION_SIGNATURE.replace_all(&without_imports, |caps: &Captures| {
        format!("{}({}) {{", &caps[1], strip_params(&caps[2]))
    });

    let arrows = ARROW_RETURN_TYPE.replace_all(&signatures, ") =>");

    ARROW_PARAMS
        .replace_all(&arrows, |caps: &Captures| {
            format!("({}) =>", strip_params(&caps[1]))
        })
        .into_owned()
}

/// Split a parameter list on commas outside `<>`, `{}` and `[]`.
fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '<' | '{' | '[' => depth += 1,
            '>' | '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&params[start..]);
    parts
}

fn strip_params(params: &str) -> String {
    split_params(params)
        .into_iter()
        .map(|param| {
            let param = param.trim();
            match param.split_once(':') {
                Some((name, annotation)) => {
                    let name = name.trim().trim_end_matches('?').trim();
                    match annotation.split_once('=') {
                        Some((_, default)) => format!("{} = {}", name, default.trim()),
                        None => name.to_string(),
                    }
                }
                None => param.to_string(),
            }
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a single file: new path and new content.
///
/// Returns `None` for files that are not TypeScript sources.
pub fn convert(path: &str, content: &str) -> Option<(String, String)> {
    if !is_ts_source(path) {
        return None;
    }
    Some((to_js_path(path), strip_types(content)))
}

/// Convert every staged TypeScript source below the project root.
pub fn convert_project_sources(tree: &mut Tree, project_root: &str) -> Result<()> {
    let prefix = format!("{}/", project_root);
    for path in tree.written_paths() {
        if !path.starts_with(&prefix) {
            continue;
        }
        let Some(content) = tree.read_to_string(&path)? else {
            continue;
        };
        if let Some((js_path, js_content)) = convert(&path, &content) {
            tree.delete(&path)?;
            tree.write(&js_path, js_content)?;
        }
    }
    Ok(())
}

/// Point the library's tsconfig files at JavaScript sources.
///
/// `tsconfig.json` gains `allowJs`; `.ts` globs in `include`, `exclude` and
/// `files` become `.js` globs. Missing files are skipped.
pub fn update_tsconfigs_to_js(tree: &mut Tree, options: &NormalizedOptions) -> Result<()> {
    let root = &options.project_root;

    let tsconfig = format!("{}/tsconfig.json", root);
    if tree.exists(&tsconfig) {
        tree.update_json(&tsconfig, |mut json: Value| {
            if let Some(obj) = json.as_object_mut() {
                let compiler_options = obj
                    .entry("compilerOptions")
                    .or_insert_with(|| Value::Object(Default::default()));
                if let Some(co) = compiler_options.as_object_mut() {
                    co.insert("allowJs".to_string(), Value::Bool(true));
                }
            }
            rewrite_globs(&mut json);
            Ok(json)
        })?;
    }

    for file in ["tsconfig.lib.json", "tsconfig.spec.json"] {
        let path = format!("{}/{}", root, file);
        if tree.exists(&path) {
            tree.update_json(&path, |mut json: Value| {
                rewrite_globs(&mut json);
                Ok(json)
            })?;
        }
    }

    Ok(())
}

fn rewrite_globs(json: &mut Value) {
    for key in ["include", "exclude", "files"] {
        if let Some(entries) = json.get_mut(key).and_then(Value::as_array_mut) {
            for entry in entries.iter_mut() {
                if let Some(s) = entry.as_str() {
                    *entry = Value::String(to_js_path(s));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::{normalize, LibraryOptions};
    use crate::core::workspace::WorkspaceContext;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_to_js_path() {
        assert_eq!(to_js_path("src/index.ts"), "src/index.js");
        assert_eq!(to_js_path("src/app.tsx"), "src/app.jsx");
        assert_eq!(to_js_path("src/types.d.ts"), "src/types.d.ts");
        assert_eq!(to_js_path("package.json"), "package.json");
        assert_eq!(maybe_js(false, "src/index.ts"), "src/index.ts");
        assert_eq!(maybe_js(true, "src/index.ts"), "src/index.js");
    }

    #[test]
    fn test_strip_function_types() {
        let ts = "export function sharedFoo(a: string, b?: number): string {\n  return 'x';\n}\n";
        assert_eq!(
            strip_types(ts),
            "export function sharedFoo(a, b) {\n  return 'x';\n}\n"
        );
    }

    #[test]
    fn test_strip_arrow_and_type_imports() {
        let ts = "import type { Foo } from './foo';\nexport const f = (x: Foo): string => 'a';\n";
        assert_eq!(strip_types(ts), "export const f = (x) => 'a';\n");
    }

    #[test]
    fn test_keeps_default_values() {
        let ts = "function f(a: number = 1, b = 2): void {}";
        assert_eq!(strip_types(ts), "function f(a = 1, b = 2) {}");
    }

    #[test]
    fn test_strip_generic_and_object_types() {
        let ts = "export function f(m: Record<string, number>): void {}";
        assert_eq!(strip_types(ts), "export function f(m) {}");

        let ts = "function g(a: { x: number, y: string }, b: [number, string], c = 1): void {}";
        assert_eq!(strip_types(ts), "function g(a, b, c = 1) {}");

        let ts = "const h = (m: Map<string, number>, n: number) => m;";
        assert_eq!(strip_types(ts), "const h = (m, n) => m;");
    }

    #[test]
    fn test_leaves_object_literals_alone() {
        let src = "describe('foo', () => {\n  expect({ a: b }).toEqual(c);\n});\n";
        assert_eq!(strip_types(src), src);
    }

    #[test]
    fn test_conversion_is_idempotent() {
        let (path, content) =
            convert("src/lib/foo.ts", "export function foo(): string {\n  return 'foo';\n}\n")
                .unwrap();
        assert_eq!(path, "src/lib/foo.js");
        assert!(convert(&path, &content).is_none());
        assert_eq!(strip_types(&content), content);
    }

    #[test]
    fn test_update_tsconfigs_to_js() {
        let tmp = TempDir::new().unwrap();
        let raw = LibraryOptions {
            name: "foo".to_string(),
            js: true,
            ..Default::default()
        };
        let opts = normalize(&raw, &WorkspaceContext::default()).unwrap();

        let mut tree = Tree::new(tmp.path());
        tree.write_json("libs/foo/tsconfig.json", &json!({ "extends": "../../tsconfig.base.json" }))
            .unwrap();
        tree.write_json(
            "libs/foo/tsconfig.lib.json",
            &json!({ "include": ["**/*.ts"], "exclude": ["**/*.spec.ts"] }),
        )
        .unwrap();

        update_tsconfigs_to_js(&mut tree, &opts).unwrap();

        let base: Value = tree.read_json("libs/foo/tsconfig.json").unwrap().unwrap();
        assert_eq!(base["compilerOptions"]["allowJs"], true);

        let lib: Value = tree.read_json("libs/foo/tsconfig.lib.json").unwrap().unwrap();
        assert_eq!(lib["include"], json!(["**/*.js"]));
        assert_eq!(lib["exclude"], json!(["**/*.spec.js"]));
        assert!(!tree.exists("libs/foo/tsconfig.spec.json"));
    }

    #[test]
    fn test_convert_project_sources() {
        let tmp = TempDir::new().unwrap();
        let mut tree = Tree::new(tmp.path());
        tree.write("libs/foo/src/index.ts", "export * from './lib/foo';\n").unwrap();
        tree.write("libs/foo/README.md", "# foo\n").unwrap();
        tree.write("libs/other/src/index.ts", "export {};\n").unwrap();

        convert_project_sources(&mut tree, "libs/foo").unwrap();

        assert!(tree.exists("libs/foo/src/index.js"));
        assert!(!tree.exists("libs/foo/src/index.ts"));
        assert!(tree.exists("libs/foo/README.md"));
        assert!(tree.exists("libs/other/src/index.ts"));
    }
}
