//! Vim help (`:help`) document rendering.
//!
//! Produces a complete help file: header tags, a contents listing, one
//! section per [`VimdocSection`] and the trailing modeline. Function
//! sections come from [`VimdocRenderer`].

use crate::model::*;
use crate::render::{public, push_group, Renderer};
use crate::section::indent;

/// Help files are formatted for `textwidth=80`.
const WIDTH: usize = 80;

const MODELINE: &str = "vim:tw=80:ts=2:ft=help:norl:syntax=help:";

/// Renders API functions as tagged help entries (`*prefix.name*`).
pub struct VimdocRenderer {
    pub prefix: String,
}

impl Renderer for VimdocRenderer {
    fn render(&self, funcs: &[FunctionDoc], types: &TypeTable) -> Vec<String> {
        let mut out = Vec::new();
        for func in public(funcs) {
            push_group(&mut out, self.render_function(func, types));
        }
        out
    }
}

impl VimdocRenderer {
    fn render_function(&self, func: &FunctionDoc, types: &TypeTable) -> Vec<String> {
        let args = func
            .params
            .iter()
            .map(|p| format!("{{{}}}", p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let header = match func.return_list() {
            Some(ret) => format!("{}({}): {}", func.name, args, ret),
            None => format!("{}({})", func.name, args),
        };
        let tag = format!("*{}.{}*", self.prefix, func.name);
        let mut lines = tagged_heading(&header, &tag);

        if let Some(ref summary) = func.summary {
            lines.extend(indent_text(summary, 4));
        }

        if let Some(ref reason) = func.deprecated {
            lines.push(format!("    Deprecated: {}", reason).trim_end().to_string());
        }

        if func.params.iter().any(|p| p.ty.is_some() || p.desc.is_some()) {
            lines.push(String::new());
            lines.push("    Parameters:".to_string());
            for param in &func.params {
                lines.push(entry(
                    6,
                    &format!("{{{}}}", param.name),
                    param.display_type().as_deref(),
                    param.desc.as_deref(),
                ));
                let ty = param.ty.as_deref().unwrap_or("");
                if let Some(class) = types.expandable_class(ty) {
                    for field in types.class_fields(&class.name) {
                        lines.push(entry(
                            10,
                            &format!("{{{}}}", field.name),
                            Some(&optional_type(&field.ty, field.optional)),
                            field.desc.as_deref(),
                        ));
                    }
                } else if let Some(alias) = types.expandable_alias(ty) {
                    for variant in &alias.variants {
                        lines.push(entry(10, "", Some(&variant.ty), variant.desc.as_deref()));
                    }
                }
            }
        }

        if !func.returns.is_empty() {
            if !lines.last().is_some_and(|l| l.is_empty()) && lines.len() > 1 {
                lines.push(String::new());
            }
            lines.push("    Returns:".to_string());
            for ret in &func.returns {
                let desc = match (&ret.name, &ret.desc) {
                    (Some(n), Some(d)) => Some(format!("{} {}", n, d)),
                    (Some(n), None) => Some(n.clone()),
                    (None, d) => d.clone(),
                };
                lines.push(entry(6, "", Some(&ret.ty), desc.as_deref()));
            }
        }

        if let Some(ref note) = func.note {
            lines.push(String::new());
            lines.push("    Note:".to_string());
            lines.extend(indent_text(note, 8));
        }

        if let Some(ref example) = func.example {
            lines.push(String::new());
            lines.push("    Examples: >lua".to_string());
            lines.extend(indent_text(example, 8));
            lines.push("    <".to_string());
        }

        lines
    }
}

/// `{name} `type` desc`, indented.
fn entry(indent: usize, label: &str, ty: Option<&str>, desc: Option<&str>) -> String {
    let parts: Vec<String> = [
        (!label.is_empty()).then(|| label.to_string()),
        ty.map(|t| format!("`{}`", t)),
        desc.map(str::to_string),
    ]
    .into_iter()
    .flatten()
    .collect();
    format!("{}{}", " ".repeat(indent), parts.join(" "))
}

fn indent_text(text: &str, count: usize) -> Vec<String> {
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    indent(&lines, count)
}

/// `left` with `right` aligned to the text width, or the tag on its own
/// line above when both do not fit.
fn tagged_heading(left: &str, right: &str) -> Vec<String> {
    let used = left.chars().count() + right.chars().count();
    if used < WIDTH {
        vec![format!("{}{}{}", left, " ".repeat(WIDTH - used), right)]
    } else {
        vec![
            format!("{}{}", " ".repeat(WIDTH.saturating_sub(right.chars().count())), right),
            left.to_string(),
        ]
    }
}

/// One top-level help section.
#[derive(Debug, Clone)]
pub struct VimdocSection {
    pub title: String,
    pub tag: String,
    pub body: Vec<String>,
}

impl VimdocSection {
    pub fn new(title: impl Into<String>, tag: impl Into<String>, body: Vec<String>) -> Self {
        VimdocSection {
            title: title.into(),
            tag: tag.into(),
            body,
        }
    }
}

/// A complete help file (`doc/<project>.txt`).
#[derive(Debug, Clone)]
pub struct Vimdoc {
    pub filename: String,
    pub project: String,
    pub sections: Vec<VimdocSection>,
}

impl Vimdoc {
    pub fn new(filename: impl Into<String>, project: impl Into<String>) -> Self {
        Vimdoc {
            filename: filename.into(),
            project: project.into(),
            sections: Vec::new(),
        }
    }

    pub fn render(&self) -> Vec<String> {
        let rule = "-".repeat(WIDTH);
        let mut lines = vec![
            format!("*{}*", self.filename),
            format!(
                "*{}* *{}* *{}.nvim*",
                capitalize(&self.project),
                self.project,
                self.project
            ),
            rule.clone(),
        ];

        lines.extend(tagged_heading("CONTENTS", &format!("*{}-contents*", self.project)));
        lines.push(String::new());
        for (i, section) in self.sections.iter().enumerate() {
            let left = format!("  {}. {}", i + 1, capitalize(&section.title));
            lines.extend(tagged_heading(&left, &format!("|{}|", section.tag)));
        }
        lines.push(String::new());

        for section in &self.sections {
            lines.push(rule.clone());
            lines.extend(tagged_heading(
                &section.title.to_uppercase(),
                &format!("*{}*", section.tag),
            ));
            lines.push(String::new());
            lines.extend(section.body.iter().cloned());
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(String::new());
            }
        }

        lines.push("=".repeat(WIDTH));
        lines.push(MODELINE.to_string());
        lines
    }
}

/// Usage example for `setup()`: the default configuration lines wrapped
/// in a call, as a plain `>` code block.
pub fn setup_example(plugin: &str, config_lines: &[String]) -> Vec<String> {
    let mut lines = vec![
        ">".to_string(),
        format!("    require(\"{}\").setup({{", plugin),
    ];
    lines.extend(indent(config_lines, 4));
    lines.push("    })".to_string());
    lines.push("<".to_string());
    lines
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
