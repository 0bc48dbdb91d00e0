//! Project layout: which files the generator reads and rewrites.
//!
//! Defaults describe the "three" plugin. A `plugdoc.toml` at the project
//! root (or a file passed with `--config`) overrides any subset of them.

use crate::render::stub::DEFAULT_TEMPLATE;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up at the project root when no `--config` is given.
pub const CONFIG_FILE: &str = "plugdoc.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Lua module name, also the help tag prefix
    pub plugin: String,
    pub readme: PathBuf,
    pub vimdoc: PathBuf,
    /// Root of the scanned Lua tree
    pub source_dir: PathBuf,
    pub init_module: PathBuf,
    pub config_module: PathBuf,
    /// Marker lines around the default config table in `config_module`
    pub config_begin: String,
    pub config_end: String,
    /// Line template for lazy stubs
    pub stub_template: String,
    /// Re-emit doc comments above each stub
    pub stub_annotations: bool,
    /// Type namespaces that need no `---@class` declaration
    pub external_namespaces: Vec<String>,
    pub groups: Vec<ApiGroup>,
}

/// One documented API surface (a source file and its generated outputs).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiGroup {
    /// Short name used in README markers and help tags (`bufferline`)
    pub name: String,
    /// Source file relative to `source_dir`
    pub source: String,
    /// Module passed to the lazy stub
    pub module: String,
    /// Init-module marker text (`BUFFERLINE API`)
    pub marker: String,
}

impl ApiGroup {
    fn new(name: &str, source: &str, module: &str) -> Self {
        ApiGroup {
            name: name.to_string(),
            source: source.to_string(),
            module: module.to_string(),
            marker: format!("{} API", name.to_uppercase()),
        }
    }

    /// `^-- BUFFERLINE API$` / `^-- /BUFFERLINE API$`
    pub fn init_markers(&self) -> (String, String) {
        let marker = regex::escape(&self.marker);
        (format!("^-- {}$", marker), format!("^-- /{}$", marker))
    }

    /// `^<!-- bufferline API -->$` / `^<!-- /bufferline API -->$`
    pub fn readme_markers(&self) -> (String, String) {
        let name = regex::escape(&self.name);
        (
            format!("^<!-- {} API -->$", name),
            format!("^<!-- /{} API -->$", name),
        )
    }

    pub fn title(&self) -> String {
        format!("{} API", self.name)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            plugin: "three".to_string(),
            readme: PathBuf::from("README.md"),
            vimdoc: PathBuf::from("doc/three.txt"),
            source_dir: PathBuf::from("lua"),
            init_module: PathBuf::from("lua/three/init.lua"),
            config_module: PathBuf::from("lua/three/config.lua"),
            config_begin: "^local default_config =".to_string(),
            config_end: "^}$".to_string(),
            stub_template: DEFAULT_TEMPLATE.to_string(),
            stub_annotations: true,
            external_namespaces: vec!["vim.".to_string()],
            groups: vec![
                ApiGroup::new("bufferline", "three/bufferline/state.lua", "bufferline.state"),
                ApiGroup::new("windows", "three/windows/init.lua", "windows"),
                ApiGroup::new("projects", "three/projects/init.lua", "projects"),
            ],
        }
    }
}

impl Layout {
    /// Load the layout for `root`: an explicit config file, else
    /// `root/plugdoc.toml` if present, else the defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Layout> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Layout::default());
                }
                candidate
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let layout = Layout::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(config = %path.display(), "loaded layout");
        Ok(layout)
    }

    pub fn parse(text: &str) -> Result<Layout> {
        Ok(toml::from_str(text)?)
    }

    /// `require("three").setup({` … `})` in the README.
    pub fn setup_markers(&self) -> (String, String) {
        (
            format!(r#"^require\("{}"\)\.setup\(\{{$"#, regex::escape(&self.plugin)),
            r"^\}\)$".to_string(),
        )
    }

    /// File name of the help document, e.g. `three.txt`.
    pub fn vimdoc_name(&self) -> String {
        self.vimdoc
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.txt", self.plugin))
    }
}
