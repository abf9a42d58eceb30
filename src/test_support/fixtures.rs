//! Test fixtures for common test scenarios.

use std::path::Path;

use serde_json::{json, Map, Value};

/// Fixture for an Nx-style workspace root.
///
/// Writes `workspace.json`, `nx.json` and `tsconfig.base.json`.
#[derive(Debug, Clone)]
pub struct WorkspaceFixture {
    /// npm scope recorded in nx.json
    pub npm_scope: String,
    /// `workspaceLayout.libsDir`, if set
    pub libs_dir: Option<String>,
    /// Already registered projects (name -> root)
    pub projects: Vec<(String, String)>,
}

impl WorkspaceFixture {
    /// Create an empty workspace fixture.
    pub fn new(npm_scope: impl Into<String>) -> Self {
        WorkspaceFixture {
            npm_scope: npm_scope.into(),
            libs_dir: None,
            projects: Vec::new(),
        }
    }

    /// Set a custom libs directory.
    pub fn libs_dir(mut self, dir: impl Into<String>) -> Self {
        self.libs_dir = Some(dir.into());
        self
    }

    /// Register an existing project.
    pub fn with_project(mut self, name: impl Into<String>, root: impl Into<String>) -> Self {
        self.projects.push((name.into(), root.into()));
        self
    }

    /// Content of `workspace.json`.
    pub fn workspace_json(&self) -> Value {
        let mut projects = Map::new();
        for (name, root) in &self.projects {
            projects.insert(
                name.clone(),
                json!({
                    "root": root,
                    "sourceRoot": format!("{}/src", root),
                    "projectType": "library",
                    "architect": {}
                }),
            );
        }
        json!({ "version": 1, "projects": projects })
    }

    /// Content of `nx.json`.
    pub fn nx_json(&self) -> Value {
        let mut nx = json!({
            "npmScope": self.npm_scope,
            "affected": { "defaultBase": "main" },
            "projects": {}
        });
        if let Some(libs_dir) = &self.libs_dir {
            nx["workspaceLayout"] = json!({ "appsDir": "apps", "libsDir": libs_dir });
        }
        for (name, _) in &self.projects {
            nx["projects"][name] = json!({ "tags": [] });
        }
        nx
    }

    /// Content of `tsconfig.base.json`.
    pub fn tsconfig_base(&self) -> Value {
        json!({
            "compileOnSave": false,
            "compilerOptions": {
                "rootDir": ".",
                "sourceMap": true,
                "target": "es2015",
                "baseUrl": ".",
                "paths": {}
            },
            "exclude": ["node_modules", "tmp"]
        })
    }

    /// Write the workspace files into `root`.
    pub fn write(&self, root: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(root)?;
        for (file, value) in [
            ("workspace.json", self.workspace_json()),
            ("nx.json", self.nx_json()),
            ("tsconfig.base.json", self.tsconfig_base()),
        ] {
            let mut content = serde_json::to_string_pretty(&value)?;
            content.push('\n');
            std::fs::write(root.join(file), content)?;
        }
        Ok(())
    }
}
