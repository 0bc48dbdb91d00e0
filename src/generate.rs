//! The documentation pipeline.
//!
//! Runs, in order:
//!
//! 1. **Stubs** — lazy dispatch stubs for each API group in the init module
//! 2. **Setup** — default configuration example in the README
//! 3. **API** — Markdown API sections in the README
//! 4. **Help** — the vimdoc file, regenerated in full
//! 5. **TOC** — README table of contents (sees the README after 2 and 3)
//!
//! All edits are staged in a [`Workspace`]; files are written only after
//! every step succeeded.

use crate::config::{ApiGroup, Layout};
use crate::error::DocError;
use crate::model::{FunctionDoc, TypeTable};
use crate::parser;
use crate::render::markdown::MarkdownRenderer;
use crate::render::stub::LazyStubRenderer;
use crate::render::vimdoc::{setup_example, Vimdoc, VimdocRenderer, VimdocSection};
use crate::render::Renderer;
use crate::section::padded;
use crate::toc;
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct Generator<'a> {
    root: PathBuf,
    layout: &'a Layout,
    types: TypeTable,
    workspace: Workspace,
}

/// Functions declared in a group's source file.
fn group_functions<'t>(types: &'t TypeTable, group: &ApiGroup) -> Result<&'t [FunctionDoc]> {
    let file = types.file(&group.source).ok_or_else(|| DocError::MissingSource {
        file: group.source.clone(),
    })?;
    Ok(&file.functions)
}

impl<'a> Generator<'a> {
    /// Scan the source tree once; the type table is shared by every step.
    pub fn new(root: &Path, layout: &'a Layout) -> Result<Self> {
        let source_dir = root.join(&layout.source_dir);
        let types = parser::parse_directory(&source_dir, &layout.external_namespaces)
            .with_context(|| format!("failed to scan {}", source_dir.display()))?;
        tracing::debug!(files = types.files.len(), "source tree scanned");

        Ok(Generator {
            root: root.to_path_buf(),
            layout,
            types,
            workspace: Workspace::new(),
        })
    }

    fn path(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }

    pub fn run(&mut self) -> Result<()> {
        self.update_api_stubs().context("failed to update API stubs")?;
        self.update_setup_opts().context("failed to update setup options")?;
        self.update_md_api().context("failed to update README API")?;
        self.generate_vimdoc().context("failed to generate help file")?;
        self.update_readme_toc().context("failed to update README TOC")?;
        Ok(())
    }

    pub fn into_workspace(self) -> Workspace {
        self.workspace
    }

    fn update_api_stubs(&mut self) -> Result<()> {
        let init = self.path(&self.layout.init_module);
        for group in &self.layout.groups {
            let funcs = group_functions(&self.types, group)?;
            let renderer = LazyStubRenderer::new(group.module.as_str())
                .with_template(self.layout.stub_template.as_str())
                .with_annotations(self.layout.stub_annotations);
            let lines = padded(renderer.render(funcs, &self.types));
            let (begin, end) = group.init_markers();
            self.workspace.replace_section(&init, &begin, &end, &lines)?;
            tracing::debug!(group = %group.name, functions = funcs.len(), "stubs rendered");
        }
        Ok(())
    }

    /// Lines of the default configuration table, without its markers.
    fn default_config(&mut self) -> Result<Vec<String>> {
        let config = self.path(&self.layout.config_module);
        self.workspace
            .read_section(&config, &self.layout.config_begin, &self.layout.config_end)
    }

    fn update_setup_opts(&mut self) -> Result<()> {
        let opt_lines = self.default_config()?;
        let readme = self.path(&self.layout.readme);
        let (begin, end) = self.layout.setup_markers();
        self.workspace
            .replace_section(&readme, &begin, &end, &opt_lines)
    }

    fn update_md_api(&mut self) -> Result<()> {
        let readme = self.path(&self.layout.readme);
        for group in &self.layout.groups {
            let funcs = group_functions(&self.types, group)?;
            let lines = padded(MarkdownRenderer.render(funcs, &self.types));
            let (begin, end) = group.readme_markers();
            self.workspace.replace_section(&readme, &begin, &end, &lines)?;
        }
        Ok(())
    }

    fn generate_vimdoc(&mut self) -> Result<()> {
        let layout = self.layout;
        let plugin = layout.plugin.as_str();
        let mut doc = Vimdoc::new(layout.vimdoc_name(), plugin);

        let opt_lines = self.default_config()?;
        doc.sections.push(VimdocSection::new(
            "options",
            format!("{}-options", plugin),
            setup_example(plugin, &opt_lines),
        ));

        let renderer = VimdocRenderer {
            prefix: plugin.to_string(),
        };
        for group in &layout.groups {
            let funcs = group_functions(&self.types, group)?;
            doc.sections.push(VimdocSection::new(
                group.title(),
                format!("{}-{}-api", plugin, group.name),
                renderer.render(funcs, &self.types),
            ));
        }

        let mut content = doc.render().join("\n");
        content.push('\n');
        let vimdoc = self.path(&layout.vimdoc);
        self.workspace.write(&vimdoc, content);
        Ok(())
    }

    fn update_readme_toc(&mut self) -> Result<()> {
        let readme = self.path(&self.layout.readme);
        let toc = toc::generate_md_toc(self.workspace.read(&readme)?);
        self.workspace
            .replace_section(&readme, toc::TOC_BEGIN, toc::TOC_END, &padded(toc))
    }
}

/// Regenerate everything under `root`.
///
/// Returns the files that changed. With `check`, nothing is written.
pub fn generate(root: &Path, layout: &Layout, check: bool) -> Result<Vec<PathBuf>> {
    let mut generator = Generator::new(root, layout)?;
    generator.run()?;
    let workspace = generator.into_workspace();

    if check {
        Ok(workspace
            .changed()
            .into_iter()
            .map(Path::to_path_buf)
            .collect())
    } else {
        workspace.commit()
    }
}
