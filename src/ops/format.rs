//! Formatting of generated files.

use anyhow::Result;
use serde_json::Value;

use crate::core::tree::Tree;

/// Rewrites file contents into a canonical style.
pub trait Formatter {
    /// Return the formatted content, or `None` to leave the file untouched.
    ///
    /// Formatting already formatted content must return it unchanged.
    fn format(&self, path: &str, content: &str) -> Option<String>;
}

/// Default formatter for workspace files.
///
/// JSON is re-serialized with two-space indentation (key order kept); other
/// text gets trailing whitespace removed and exactly one final newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceFormatter;

impl Formatter for WorkspaceFormatter {
    fn format(&self, path: &str, content: &str) -> Option<String> {
        if path.ends_with(".json") {
            let value: Value = match serde_json::from_str(content) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("not formatting {}: {}", path, e);
                    return None;
                }
            };
            let mut out = serde_json::to_string_pretty(&value).ok()?;
            out.push('\n');
            return Some(out);
        }

        let mut out = content
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed_len = out.trim_end_matches('\n').len();
        out.truncate(trimmed_len);
        out.push('\n');
        Some(out)
    }
}

/// Format every file staged in the tree.
pub fn format_files(tree: &mut Tree, formatter: &dyn Formatter) -> Result<()> {
    for path in tree.written_paths() {
        let Some(content) = tree.read_to_string(&path)? else {
            continue;
        };
        if let Some(formatted) = formatter.format(&path, &content) {
            if formatted != content {
                tree.write(&path, formatted)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_json() {
        let out = WorkspaceFormatter
            .format("package.json", r#"{"name":"@acme/foo","version":"0.0.1"}"#)
            .unwrap();
        assert_eq!(out, "{\n  \"name\": \"@acme/foo\",\n  \"version\": \"0.0.1\"\n}\n");
    }

    #[test]
    fn test_format_text() {
        let out = WorkspaceFormatter
            .format("src/index.ts", "export * from './lib/foo';   \n\n\n")
            .unwrap();
        assert_eq!(out, "export * from './lib/foo';\n");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        for (path, content) in [
            ("a.json", "{ \"b\": [1, 2], \"a\": {} }"),
            ("README.md", "# foo  \n\ntext\t\n"),
        ] {
            let once = WorkspaceFormatter.format(path, content).unwrap();
            let twice = WorkspaceFormatter.format(path, &once).unwrap();
            assert_eq!(once, twice, "{} not idempotent", path);
        }
    }

    #[test]
    fn test_invalid_json_is_left_alone() {
        assert!(WorkspaceFormatter.format("broken.json", "{").is_none());
    }

    #[test]
    fn test_format_files() {
        let tmp = TempDir::new().unwrap();
        let mut tree = Tree::new(tmp.path());
        tree.write("libs/foo/README.md", "# foo   ").unwrap();
        tree.write("libs/foo/package.json", "{\"name\":\"foo\"}").unwrap();

        format_files(&mut tree, &WorkspaceFormatter).unwrap();

        assert_eq!(tree.read_to_string("libs/foo/README.md").unwrap().unwrap(), "# foo\n");
        assert_eq!(
            tree.read_to_string("libs/foo/package.json").unwrap().unwrap(),
            "{\n  \"name\": \"foo\"\n}\n"
        );
    }
}
