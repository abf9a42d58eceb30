//! Workspace manifest records.
//!
//! `workspace.json` and `nx.json` are kept as ordered JSON maps so a rewrite
//! preserves every key the generator does not know about, in place. New
//! project entries are built from typed records.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Builder used for the `build` target of distributable libraries.
pub const PACKAGE_BUILDER: &str = "@nrwl/node:package";

/// Builder used for the `lint` target.
pub const LINT_BUILDER: &str = "@nrwl/linter:eslint";

/// Builder used for the `test` target.
pub const JEST_BUILDER: &str = "@nrwl/jest:jest";

/// The project registry (`workspace.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceManifest {
    doc: Map<String, Value>,
}

impl WorkspaceManifest {
    /// Create an empty manifest with the current schema version.
    pub fn new() -> Self {
        let mut doc = Map::new();
        doc.insert("version".to_string(), Value::from(1));
        doc.insert("projects".to_string(), Value::Object(Map::new()));
        WorkspaceManifest { doc }
    }

    fn projects(&self) -> Option<&Map<String, Value>> {
        self.doc.get("projects").and_then(Value::as_object)
    }

    /// Check if a project is registered.
    pub fn contains_project(&self, name: &str) -> bool {
        self.projects().is_some_and(|p| p.contains_key(name))
    }

    /// Set a target on a registered project, editing its entry in place.
    ///
    /// Returns `Ok(None)` if the project is not registered and
    /// `Ok(Some(false))` if it has no target container.
    pub fn set_project_target(
        &mut self,
        project: &str,
        name: &str,
        target: &TargetConfiguration,
    ) -> Result<Option<bool>> {
        let Some(entry) = self
            .doc
            .get_mut("projects")
            .and_then(Value::as_object_mut)
            .and_then(|p| p.get_mut(project))
        else {
            return Ok(None);
        };
        let Some(architect) = entry.get_mut("architect").and_then(Value::as_object_mut) else {
            return Ok(Some(false));
        };

        let value = serde_json::to_value(target)
            .with_context(|| format!("failed to serialize target `{}`", name))?;
        architect.insert(name.to_string(), value);
        Ok(Some(true))
    }

    /// Insert or replace a project entry.
    pub fn set_project(&mut self, name: &str, project: &ProjectConfiguration) -> Result<()> {
        let value = serde_json::to_value(project)
            .with_context(|| format!("failed to serialize project `{}`", name))?;

        let projects = self
            .doc
            .entry("projects")
            .or_insert_with(|| Value::Object(Map::new()));
        match projects.as_object_mut() {
            Some(projects) => {
                projects.insert(name.to_string(), value);
                Ok(())
            }
            None => anyhow::bail!("`projects` in the workspace manifest is not an object"),
        }
    }
}

/// A single project entry of `workspace.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfiguration {
    pub root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    /// Target container; absent on projects that have no targets at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architect: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectConfiguration {
    /// Set a target, if the project has a target container.
    ///
    /// Returns `false` when there is no container to write into.
    pub fn set_target(&mut self, name: &str, target: &TargetConfiguration) -> Result<bool> {
        let Some(architect) = self.architect.as_mut() else {
            return Ok(false);
        };
        let value = serde_json::to_value(target)
            .with_context(|| format!("failed to serialize target `{}`", name))?;
        architect.insert(name.to_string(), value);
        Ok(true)
    }
}

/// A target (`architect.<name>`) of a project entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetConfiguration {
    pub builder: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl TargetConfiguration {
    pub fn new(builder: impl Into<String>) -> Self {
        TargetConfiguration {
            builder: builder.into(),
            ..Default::default()
        }
    }

    pub fn with_outputs(mut self, outputs: Vec<String>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Replace the options with any serializable record.
    pub fn with_options<T: Serialize>(mut self, options: &T) -> Result<Self> {
        match serde_json::to_value(options).context("failed to serialize target options")? {
            Value::Object(map) => self.options = map,
            other => anyhow::bail!("target options must be an object, got {}", other),
        }
        Ok(self)
    }
}

/// Workspace-wide settings (`nx.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NxJson {
    doc: Map<String, Value>,
}

impl NxJson {
    /// The npm scope used as the default import path prefix.
    pub fn npm_scope(&self) -> Option<&str> {
        self.doc
            .get("npmScope")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `workspaceLayout.libsDir`, if set.
    pub fn libs_dir(&self) -> Option<&str> {
        self.doc
            .get("workspaceLayout")
            .and_then(|l| l.get("libsDir"))
            .and_then(Value::as_str)
    }

    /// Register a project with its tags.
    pub fn set_project_tags(&mut self, name: &str, tags: &[String]) -> Result<()> {
        let projects = self
            .doc
            .entry("projects")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(projects) = projects.as_object_mut() else {
            anyhow::bail!("`projects` in nx.json is not an object");
        };

        let mut entry = Map::new();
        entry.insert("tags".to_string(), serde_json::to_value(tags)?);
        projects.insert(name.to_string(), Value::Object(entry));
        Ok(())
    }
}
