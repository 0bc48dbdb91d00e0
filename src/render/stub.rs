//! Lazy dispatch stubs for the plugin's init module.
//!
//! Each public function becomes one line binding the API name to a deferred
//! lookup into its implementation module, so `require("three")` does not
//! load every submodule up front. With annotations enabled, the function's
//! doc comment is re-emitted above the stub for the language server.

use crate::model::*;
use crate::render::{public, Renderer};

/// Default binding: `M.next = lazy("bufferline.state", "next")`.
pub const DEFAULT_TEMPLATE: &str = r#"M.{name} = lazy("{module}", "{name}")"#;

pub struct LazyStubRenderer {
    /// Implementation module, relative to the plugin namespace
    pub module: String,
    /// Line template; `{name}` and `{module}` are substituted
    pub template: String,
    pub annotations: bool,
}

impl LazyStubRenderer {
    pub fn new(module: impl Into<String>) -> Self {
        LazyStubRenderer {
            module: module.into(),
            template: DEFAULT_TEMPLATE.to_string(),
            annotations: false,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_annotations(mut self, annotations: bool) -> Self {
        self.annotations = annotations;
        self
    }

    fn stub_line(&self, func: &FunctionDoc) -> String {
        self.template
            .replace("{name}", &func.name)
            .replace("{module}", &self.module)
    }
}

impl Renderer for LazyStubRenderer {
    fn render(&self, funcs: &[FunctionDoc], _types: &TypeTable) -> Vec<String> {
        let mut out = Vec::new();
        for func in public(funcs) {
            if self.annotations {
                if !out.is_empty() {
                    out.push(String::new());
                }
                out.extend(annotation_lines(func));
            }
            out.push(self.stub_line(func));
        }
        out
    }
}

/// The function's doc comment, in the same `---` syntax the parser reads.
fn annotation_lines(func: &FunctionDoc) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(ref summary) = func.summary {
        for line in summary.lines() {
            lines.push(format!("---{}", line).trim_end().to_string());
        }
    }

    if let Some(ref reason) = func.deprecated {
        lines.push(format!("---@deprecated {}", reason).trim_end().to_string());
    }

    for generic in &func.generics {
        lines.push(format!("---@generic {}", generic));
    }

    for param in &func.params {
        let Some(ref ty) = param.ty else {
            continue;
        };
        let mut line = format!(
            "---@param {}{} {}",
            param.name,
            if param.optional { "?" } else { "" },
            ty
        );
        if let Some(ref desc) = param.desc {
            line.push(' ');
            line.push_str(desc);
        }
        lines.push(line);
    }

    for ret in &func.returns {
        let mut line = format!("---@return {}", ret.ty);
        if let Some(ref name) = ret.name {
            line.push(' ');
            line.push_str(name);
        }
        if let Some(ref desc) = ret.desc {
            line.push_str(" # ");
            line.push_str(desc);
        }
        lines.push(line);
    }

    lines
}
