//! Read-modify-write access to the documentation targets.
//!
//! Every edit of a run goes through a [`Workspace`], which keeps the latest
//! content of each touched file in memory. Later steps see the edits of
//! earlier ones (the TOC step reads the README after the API step rewrote
//! it). Nothing reaches the disk until [`Workspace::commit`], and files whose
//! content did not change are never rewritten.

use crate::section;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct Workspace {
    /// path → (content on disk, latest content)
    files: BTreeMap<PathBuf, (Option<String>, String)>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of `path`, loading it from disk on first access.
    pub fn read(&mut self, path: &Path) -> Result<&str> {
        if !self.files.contains_key(path) {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            self.files
                .insert(path.to_path_buf(), (Some(content.clone()), content));
        }
        Ok(self.files[path].1.as_str())
    }

    /// Replace the whole content of `path`.
    pub fn write(&mut self, path: &Path, content: String) {
        match self.files.get_mut(path) {
            Some(entry) => entry.1 = content,
            None => {
                let original = fs::read_to_string(path).ok();
                self.files.insert(path.to_path_buf(), (original, content));
            }
        }
    }

    pub fn read_section(&mut self, path: &Path, begin: &str, end: &str) -> Result<Vec<String>> {
        let text = self.read(path)?;
        Ok(section::read_section(text, path, begin, end)?)
    }

    pub fn replace_section(
        &mut self,
        path: &Path,
        begin: &str,
        end: &str,
        new_lines: &[String],
    ) -> Result<()> {
        let text = self.read(path)?;
        let updated = section::replace_section(text, path, begin, end, new_lines)?;
        self.write(path, updated);
        Ok(())
    }

    /// Files whose latest content differs from what is on disk.
    pub fn changed(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|(_, (original, latest))| original.as_deref() != Some(latest.as_str()))
            .map(|(path, _)| path.as_path())
            .collect()
    }

    /// Write every changed file; returns the paths written.
    pub fn commit(&self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for path in self.changed() {
            let (_, content) = &self.files[path];
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directory {}", parent.display())
                    })?;
                }
            }
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(file = %path.display(), "updated");
            written.push(path.to_path_buf());
        }
        Ok(written)
    }
}
