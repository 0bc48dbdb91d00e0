//! Renderer module — trait-based output strategies.
//!
//! Every renderer is a pure function of the function descriptors and the
//! type table, emitting lines in declaration order. Private functions are
//! never rendered.

pub mod markdown;
pub mod stub;
pub mod vimdoc;

use crate::model::{FunctionDoc, TypeTable};

/// Trait for rendering a list of functions into one target format.
pub trait Renderer {
    fn render(&self, funcs: &[FunctionDoc], types: &TypeTable) -> Vec<String>;
}

/// Functions that appear in generated docs.
pub fn public(funcs: &[FunctionDoc]) -> impl Iterator<Item = &FunctionDoc> {
    funcs.iter().filter(|f| !f.private)
}

/// Append `lines` with a blank separator line between groups.
fn push_group(out: &mut Vec<String>, lines: Vec<String>) {
    if !out.is_empty() {
        out.push(String::new());
    }
    out.extend(lines);
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::*;

    /// `foo(a: string, b: number): boolean` — "Checks a against b"
    pub fn foo() -> FunctionDoc {
        FunctionDoc {
            name: "foo".to_string(),
            params: vec![
                Param {
                    name: "a".to_string(),
                    ty: Some("string".to_string()),
                    ..Default::default()
                },
                Param {
                    name: "b".to_string(),
                    ty: Some("number".to_string()),
                    ..Default::default()
                },
            ],
            returns: vec![Return {
                ty: "boolean".to_string(),
                ..Default::default()
            }],
            summary: Some("Checks a against b".to_string()),
            ..Default::default()
        }
    }

    pub fn bare(name: &str) -> FunctionDoc {
        FunctionDoc {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// `next(opts?: three.NextOpts)` with the class declared in the table.
    pub fn next_with_opts() -> (FunctionDoc, TypeTable) {
        let func = FunctionDoc {
            name: "next".to_string(),
            params: vec![Param {
                name: "opts".to_string(),
                ty: Some("three.NextOpts".to_string()),
                desc: None,
                optional: true,
            }],
            summary: Some("Jump to the next buffer".to_string()),
            ..Default::default()
        };
        let mut table = TypeTable::default();
        table.insert(FileDoc {
            path: "three/types.lua".to_string(),
            classes: vec![ClassDoc {
                name: "three.NextOpts".to_string(),
                fields: vec![Field {
                    name: "wrap".to_string(),
                    ty: "boolean".to_string(),
                    desc: Some("Wrap around at the end".to_string()),
                    optional: true,
                }],
                ..Default::default()
            }],
            ..Default::default()
        });
        (func, table)
    }
}
