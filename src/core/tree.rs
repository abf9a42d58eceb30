//! Staged workspace changes.
//!
//! A [`Tree`] is a view of the workspace in which every write is held in
//! memory. Reads see staged content first and fall through to disk. Nothing
//! touches the filesystem until [`Tree::commit`], so a generator that fails
//! halfway leaves the workspace exactly as it found it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::options::normalize_path;
use crate::util::fs;

/// What a staged change does to its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

/// A single staged change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// `/`-separated path relative to the workspace root
    pub path: String,
    pub kind: ChangeKind,
    /// New content; empty for deletions
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
enum Staged {
    Write(Vec<u8>),
    Delete,
}

/// Workspace-rooted change set.
#[derive(Debug)]
pub struct Tree {
    root: PathBuf,
    staged: HashMap<String, Staged>,
    /// First-touch order of staged paths
    order: Vec<String>,
}

impl Tree {
    /// Create an empty change set over the workspace at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Tree {
            root: root.into(),
            staged: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Get the workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key(path: &str) -> Result<String> {
        let key = normalize_path(path)?;
        if key.is_empty() {
            anyhow::bail!("`{}` does not name a file", path);
        }
        Ok(key)
    }

    fn disk_path(&self, key: &str) -> PathBuf {
        fs::join_slash(&self.root, key)
    }

    fn stage(&mut self, key: String, change: Staged) {
        if !self.staged.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.staged.insert(key, change);
    }

    /// Check if a file exists, staged or on disk.
    pub fn exists(&self, path: &str) -> bool {
        let Ok(key) = Self::key(path) else {
            return false;
        };
        match self.staged.get(&key) {
            Some(Staged::Write(_)) => true,
            Some(Staged::Delete) => false,
            None => self.disk_path(&key).is_file(),
        }
    }

    /// Read a file, staged or on disk.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let key = Self::key(path)?;
        match self.staged.get(&key) {
            Some(Staged::Write(content)) => Ok(Some(content.clone())),
            Some(Staged::Delete) => Ok(None),
            None => {
                let disk = self.disk_path(&key);
                if disk.is_file() {
                    fs::read(&disk).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Read a file as UTF-8 text.
    pub fn read_to_string(&self, path: &str) -> Result<Option<String>> {
        match self.read(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .with_context(|| format!("{} is not valid UTF-8", path)),
            None => Ok(None),
        }
    }

    /// Stage new content for a file, replacing whatever is there.
    pub fn write(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let key = Self::key(path)?;
        self.stage(key, Staged::Write(content.into()));
        Ok(())
    }

    /// Stage the removal of a file.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        let key = Self::key(path)?;
        self.stage(key, Staged::Delete);
        Ok(())
    }

    /// Read and parse a JSON file.
    pub fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.read(path)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .with_context(|| format!("failed to parse {}", path)),
            None => Ok(None),
        }
    }

    /// Serialize a value and stage it as a JSON file.
    pub fn write_json<T: Serialize>(&mut self, path: &str, value: &T) -> Result<()> {
        let mut content = serde_json::to_vec_pretty(value)
            .with_context(|| format!("failed to serialize {}", path))?;
        content.push(b'\n');
        self.write(path, content)
    }

    /// Read a JSON file, apply `update`, and stage the result.
    ///
    /// Fails if the file does not exist.
    pub fn update_json<T, F>(&mut self, path: &str, update: F) -> Result<()>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce(T) -> Result<T>,
    {
        let value: T = self
            .read_json(path)?
            .with_context(|| format!("cannot find {}", path))?;
        let value = update(value)?;
        self.write_json(path, &value)
    }

    /// Staged paths holding content, in first-touch order.
    pub fn written_paths(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|p| matches!(self.staged.get(*p), Some(Staged::Write(_))))
            .cloned()
            .collect()
    }

    /// Compute the effective changes against the disk.
    ///
    /// Writes that leave a file byte-identical and deletions of files that
    /// never existed are dropped.
    pub fn changes(&self) -> Result<Vec<FileChange>> {
        let mut changes = Vec::new();

        for key in &self.order {
            let disk = self.disk_path(key);
            let on_disk = if disk.is_file() {
                Some(fs::read(&disk)?)
            } else {
                None
            };

            match (&self.staged[key], on_disk) {
                (Staged::Write(content), None) => changes.push(FileChange {
                    path: key.clone(),
                    kind: ChangeKind::Create,
                    content: content.clone(),
                }),
                (Staged::Write(content), Some(existing)) if *content != existing => {
                    changes.push(FileChange {
                        path: key.clone(),
                        kind: ChangeKind::Update,
                        content: content.clone(),
                    })
                }
                (Staged::Write(_), Some(_)) => {}
                (Staged::Delete, Some(_)) => changes.push(FileChange {
                    path: key.clone(),
                    kind: ChangeKind::Delete,
                    content: Vec::new(),
                }),
                (Staged::Delete, None) => {}
            }
        }

        Ok(changes)
    }

    /// Write every staged change to disk.
    ///
    /// Returns the changes that were applied.
    pub fn commit(self) -> Result<Vec<FileChange>> {
        let changes = self.changes()?;

        for change in &changes {
            let disk = self.disk_path(&change.path);
            match change.kind {
                ChangeKind::Create | ChangeKind::Update => {
                    fs::write_atomic(&disk, &change.content)?
                }
                ChangeKind::Delete => fs::remove_file_if_exists(&disk)?,
            }
            tracing::debug!("{} {}", change.kind.as_str(), change.path);
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_reads_fall_through_to_disk() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("README.md"), "# ws\n").unwrap();

        let mut tree = Tree::new(tmp.path());
        assert!(tree.exists("README.md"));
        assert!(tree.exists("./README.md"));
        assert_eq!(tree.read_to_string("README.md").unwrap().unwrap(), "# ws\n");

        tree.write("README.md", "# changed\n").unwrap();
        assert_eq!(tree.read_to_string("README.md").unwrap().unwrap(), "# changed\n");
        assert_eq!(std::fs::read_to_string(tmp.path().join("README.md")).unwrap(), "# ws\n");

        tree.delete("README.md").unwrap();
        assert!(!tree.exists("README.md"));
        assert!(tree.read("README.md").unwrap().is_none());
    }

    #[test]
    fn test_nothing_written_before_commit() {
        let tmp = TempDir::new().unwrap();
        let mut tree = Tree::new(tmp.path());
        tree.write("libs/foo/src/index.ts", "export {};\n").unwrap();
        drop(tree);

        assert!(!tmp.path().join("libs").exists());
    }

    #[test]
    fn test_changes_and_commit() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("same.txt"), "same").unwrap();
        std::fs::write(tmp.path().join("old.txt"), "old").unwrap();
        std::fs::write(tmp.path().join("gone.txt"), "gone").unwrap();

        let mut tree = Tree::new(tmp.path());
        tree.write("new/file.txt", "new").unwrap();
        tree.write("same.txt", "same").unwrap();
        tree.write("old.txt", "updated").unwrap();
        tree.delete("gone.txt").unwrap();
        tree.delete("never.txt").unwrap();

        let changes = tree.changes().unwrap();
        let summary: Vec<_> = changes.iter().map(|c| (c.path.as_str(), c.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("new/file.txt", ChangeKind::Create),
                ("old.txt", ChangeKind::Update),
                ("gone.txt", ChangeKind::Delete),
            ]
        );

        tree.commit().unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path().join("new/file.txt")).unwrap(), "new");
        assert_eq!(std::fs::read_to_string(tmp.path().join("old.txt")).unwrap(), "updated");
        assert!(!tmp.path().join("gone.txt").exists());
    }

    #[test]
    fn test_rewrite_keeps_first_position() {
        let tmp = TempDir::new().unwrap();
        let mut tree = Tree::new(tmp.path());
        tree.write("a", "1").unwrap();
        tree.write("b", "1").unwrap();
        tree.write("a", "2").unwrap();

        assert_eq!(tree.written_paths(), vec!["a", "b"]);
        assert_eq!(tree.read_to_string("a").unwrap().unwrap(), "2");
    }

    #[test]
    fn test_json_helpers() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("nx.json"), r#"{"npmScope":"acme"}"#).unwrap();

        let mut tree = Tree::new(tmp.path());
        tree.update_json("nx.json", |mut v: Value| {
            v["affected"] = json!({ "defaultBase": "main" });
            Ok(v)
        })
        .unwrap();

        let v: Value = tree.read_json("nx.json").unwrap().unwrap();
        assert_eq!(v["npmScope"], "acme");
        assert_eq!(v["affected"]["defaultBase"], "main");

        assert!(tree
            .update_json("missing.json", |v: Value| Ok(v))
            .is_err());
    }

    #[test]
    fn test_rejects_paths_outside_root() {
        let tmp = TempDir::new().unwrap();
        let mut tree = Tree::new(tmp.path());
        assert!(tree.write("../escape.txt", "x").is_err());
        assert!(tree.write("", "x").is_err());
    }
}
