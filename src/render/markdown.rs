//! GitHub-flavored markdown API sections for the README.

use crate::model::*;
use crate::render::{public, push_group, Renderer};

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, funcs: &[FunctionDoc], types: &TypeTable) -> Vec<String> {
        let mut out = Vec::new();
        for func in public(funcs) {
            push_group(&mut out, render_function(func, types));
        }
        out
    }
}

/// Render a single function's section.
fn render_function(func: &FunctionDoc, types: &TypeTable) -> Vec<String> {
    let mut lines = vec![format!("### {}({})", func.name, func.param_list()), String::new()];

    // Signature, with a hard line break when a summary follows
    let signature = format!("`{}`", typed_signature(func));
    match func.summary {
        Some(ref summary) => {
            lines.push(format!("{} \\", signature));
            lines.extend(summary.lines().map(str::to_string));
        }
        None => lines.push(signature),
    }

    if let Some(ref reason) = func.deprecated {
        lines.push(String::new());
        lines.push(format!("**Deprecated:** {}", reason).trim_end().to_string());
    }

    let param_rows = param_rows(func, types);
    if !param_rows.is_empty() {
        lines.push(String::new());
        lines.extend(table(&["Param", "Type", "Desc"], &param_rows));
    }

    if !func.returns.is_empty() {
        let rows: Vec<Vec<String>> = func
            .returns
            .iter()
            .map(|r| {
                let desc = match (&r.name, &r.desc) {
                    (Some(n), Some(d)) => format!("{} {}", n, d),
                    (Some(n), None) => n.clone(),
                    (None, Some(d)) => d.clone(),
                    (None, None) => String::new(),
                };
                vec![code(&r.ty), escape_table_cell(&desc)]
            })
            .collect();
        lines.push(String::new());
        lines.push("Returns:".to_string());
        lines.push(String::new());
        lines.extend(table(&["Type", "Desc"], &rows));
    }

    if let Some(ref note) = func.note {
        lines.push(String::new());
        lines.push("**Note:**".to_string());
        lines.push("<pre>".to_string());
        lines.extend(note.lines().map(str::to_string));
        lines.push("</pre>".to_string());
    }

    if let Some(ref example) = func.example {
        lines.push(String::new());
        lines.push("**Examples:**".to_string());
        lines.push("```lua".to_string());
        lines.extend(example.lines().map(str::to_string));
        lines.push("```".to_string());
    }

    lines
}

/// `foo(a: string, b?: number): boolean`
pub fn typed_signature(func: &FunctionDoc) -> String {
    let params = func
        .params
        .iter()
        .map(|p| match p.ty {
            Some(ref ty) => format!("{}{}: {}", p.name, if p.optional { "?" } else { "" }, ty),
            None => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    match func.return_list() {
        Some(ret) => format!("{}({}): {}", func.name, params, ret),
        None => format!("{}({})", func.name, params),
    }
}

/// Param rows; params typed with a declared class list its fields as
/// `>field` rows below them.
fn param_rows(func: &FunctionDoc, types: &TypeTable) -> Vec<Vec<String>> {
    if !func.params.iter().any(|p| p.ty.is_some() || p.desc.is_some()) {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for param in &func.params {
        let ty = param.ty.as_deref().unwrap_or("");
        let class = types.expandable_class(ty);
        // An undocumented class param borrows the class summary
        let desc = param
            .desc
            .as_deref()
            .or_else(|| class.and_then(|c| c.summary.as_deref()))
            .unwrap_or("");
        rows.push(vec![
            escape_table_cell(&param.name),
            param.display_type().map(|t| code(&t)).unwrap_or_default(),
            escape_table_cell(desc),
        ]);

        if let Some(class) = class {
            for field in types.class_fields(&class.name) {
                rows.push(vec![
                    format!(">{}", escape_table_cell(&field.name)),
                    code(&optional_type(&field.ty, field.optional)),
                    escape_table_cell(field.desc.as_deref().unwrap_or("")),
                ]);
            }
        } else if let Some(alias) = types.expandable_alias(ty) {
            for variant in &alias.variants {
                rows.push(vec![
                    String::new(),
                    code(&variant.ty),
                    escape_table_cell(variant.desc.as_deref().unwrap_or("")),
                ]);
            }
        }
    }
    rows
}

/// Build a markdown table with every column padded to its widest cell.
fn table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}{}", c, " ".repeat(widths[i] - c.chars().count())))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = vec![
        format_row(headers.iter().map(|h| h.to_string()).collect()),
        format_row(widths.iter().map(|w| "-".repeat(*w)).collect()),
    ];
    for row in rows {
        out.push(format_row(row.clone()));
    }
    out
}

/// Inline code span, safe inside a table cell.
fn code(text: &str) -> String {
    format!("`{}`", escape_table_cell(text))
}

/// Escape for use within a table cell (only pipe needs escaping)
fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
