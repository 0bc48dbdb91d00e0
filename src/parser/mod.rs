//! Parser module — single files and whole source trees.

pub mod lua;
pub mod types;

use crate::model::{FileDoc, TypeTable};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a source file into a [`FileDoc`] based on its extension.
///
/// `key` is the path recorded in the descriptor (relative to the scan root
/// in directory mode).
pub fn parse_file(path: &Path, key: &str, content: &str) -> Result<FileDoc> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("lua") => Ok(lua::parse(content, key)),
        _ => Err(anyhow!("unsupported file type: {}", path.display())),
    }
}

/// Scan every `.lua` file under `root` and build the type table.
///
/// Type references in public signatures are resolved across files;
/// `externals` lists namespace prefixes (like `vim.`) that need no
/// declaration. An unresolved reference aborts the scan.
pub fn parse_directory(root: &Path, externals: &[String]) -> Result<TypeTable> {
    let mut table = TypeTable::default();

    for path in lua_files(root)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let key = relative_key(root, &path);
        let file = parse_file(&path, &key, &content)?;
        tracing::debug!(
            file = %key,
            functions = file.functions.len(),
            classes = file.classes.len(),
            aliases = file.aliases.len(),
            "scanned"
        );
        table.insert(file);
    }

    types::resolve(&table, externals)?;
    Ok(table)
}

/// Recursively list `.lua` files under `root`, sorted for deterministic output.
fn lua_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("source directory not found: {}", root.display());
    }
    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{}/**/*.lua", escaped.trim_end_matches('/'));
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid glob pattern: {}", pattern))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// `root/three/windows/init.lua` → `three/windows/init.lua`
fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
