//! Name casing helpers used for project keys and template placeholders.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+(.)?").expect("valid regex"));

/// The casing variants of a single name.
///
/// Serialized with camelCase keys so every variant is available to templates
/// as `<%= className %>`, `<%= propertyName %>` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Names {
    pub name: String,
    pub class_name: String,
    pub property_name: String,
    pub constant_name: String,
    pub file_name: String,
}

impl Names {
    pub fn new(name: &str) -> Self {
        Names {
            name: name.to_string(),
            class_name: class_name(name),
            property_name: property_name(name),
            constant_name: constant_name(name),
            file_name: file_name(name),
        }
    }
}

/// `myLib_name` -> `my-lib-name`. Slashes are kept so nested directories
/// survive.
pub fn file_name(s: &str) -> String {
    CASE_BOUNDARY
        .replace_all(s, "${1}_${2}")
        .to_lowercase()
        .replace([' ', '_'], "-")
}

/// `my-lib name` -> `myLibName`.
pub fn property_name(s: &str) -> String {
    let joined = WORD_SEPARATOR.replace_all(s, |caps: &Captures| {
        caps.get(1)
            .map(|c| c.as_str().to_uppercase())
            .unwrap_or_default()
    });
    let cleaned: String = joined.chars().filter(|c| c.is_ascii_alphanumeric()).collect();

    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `my-lib name` -> `MyLibName`.
pub fn class_name(s: &str) -> String {
    let property = property_name(s);
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `myLib-name` -> `MY_LIB_NAME`.
pub fn constant_name(s: &str) -> String {
    file_name(s)
        .to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Relative prefix leading from `path` back to the workspace root.
///
/// `libs/shared/foo` -> `../../../`
pub fn offset_from_root(path: &str) -> String {
    let depth = path.split('/').filter(|s| !s.is_empty() && *s != ".").count();
    "../".repeat(depth)
}
