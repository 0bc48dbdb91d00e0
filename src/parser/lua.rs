//! Lua annotation parser — line-by-line state machine.
//!
//! A doc block is the run of `---` lines directly above a definition. Plain
//! lines form the summary (or continue the previous tag), `---@tag` lines
//! carry params, returns, notes, examples and type declarations. A blank or
//! code line ends the block; if that line defines a function, the block is
//! attached to it.

use crate::model::*;
use crate::parser::types::split_type;
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

/// `---` followed by anything except more dashes (`----` rulers are not docs)
static RE_DOC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*---([^-].*)?$").unwrap());

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)\s*(.*)$").unwrap());

// `function M.name(a, b)` / `local function name(a)`
static RE_FUNC_STMT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(local\s+)?function\s+([A-Za-z_][\w.:]*)\s*\(([^)]*)\)").unwrap()
});

// `M.name = function(a, b)` / `local name = function(a)`
static RE_FUNC_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(local\s+)?([A-Za-z_][\w.]*)\s*=\s*function\s*\(([^)]*)\)").unwrap()
});

// A definition whose parameter list continues on the following lines
static RE_FUNC_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(local\s+)?(function\s+[A-Za-z_][\w.:]*|[A-Za-z_][\w.]*\s*=\s*function)\s*\([^)]*$")
        .unwrap()
});

static RE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\([^)]*\)\s*)?([\w.\-]+)\s*(?::\s*([\w.\-]+))?").unwrap()
});

static RE_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").unwrap());

// -- Parser state -------------------------------------------------------------

/// Which entry untagged `---` lines continue.
#[derive(Default, Clone, Copy, PartialEq)]
enum Mode {
    #[default]
    Summary,
    Param(usize),
    Return(usize),
    Field,
    Note,
    Example,
}

#[derive(Default)]
struct Docblock {
    mode: Mode,
    summary: Vec<String>,
    params: Vec<Param>,
    returns: Vec<Return>,
    note: Vec<String>,
    example: Option<Vec<String>>,
    deprecated: Option<String>,
    private: bool,
    generics: Vec<String>,
    /// Open declaration that `---@field` / `---|` lines extend
    class: Option<ClassDoc>,
    alias: Option<AliasDoc>,
    /// Declarations already closed within this block
    classes: Vec<ClassDoc>,
    aliases: Vec<AliasDoc>,
    /// Reasons this block's annotations cannot be trusted
    malformed: Vec<String>,
}

struct ParserState {
    file: FileDoc,
    block: Docblock,
    /// Wrapped signature being joined, with the line it started on
    signature: Option<(String, usize)>,
}

/// A recognised function definition line.
struct FuncDef {
    name: String,
    params: Vec<String>,
    local: bool,
}

// -- Public API ---------------------------------------------------------------

/// Parse one Lua source file. `path` is the table key (relative path).
pub fn parse(input: &str, path: &str) -> FileDoc {
    let mut state = ParserState {
        file: FileDoc {
            path: path.to_string(),
            ..Default::default()
        },
        block: Docblock::default(),
        signature: None,
    };

    for (idx, line) in input.lines().enumerate() {
        process_line(&mut state, line, idx + 1);
    }
    end_block(&mut state);

    state.file
}

// -- Line processing ----------------------------------------------------------

fn process_line(s: &mut ParserState, line: &str, lineno: usize) {
    if let Some((mut text, start)) = s.signature.take() {
        text.push(' ');
        text.push_str(line.trim());
        if !line.contains(')') {
            s.signature = Some((text, start));
            return;
        }
        match match_function(&text) {
            Some(def) => {
                let block = take_block(s);
                add_function(s, def, block, start);
            }
            None => end_block(s),
        }
        return;
    }

    if let Some(caps) = RE_DOC_LINE.captures(line) {
        let rest = caps.get(1).map_or("", |m| m.as_str());
        process_doc_line(&mut s.block, rest);
        return;
    }

    if let Some(def) = match_function(line) {
        let block = take_block(s);
        add_function(s, def, block, lineno);
        return;
    }

    if RE_FUNC_OPEN.is_match(line) {
        s.signature = Some((line.trim_end().to_string(), lineno));
        return;
    }

    end_block(s);
}

fn process_doc_line(b: &mut Docblock, rest: &str) {
    let trimmed = rest.trim_start();

    // `---| "variant" # desc` continues a multi-line alias
    if let Some(body) = trimmed.strip_prefix('|') {
        if let Some(ref mut alias) = b.alias {
            let (ty, after) = split_type(body);
            if !ty.is_empty() {
                alias.variants.push(AliasVariant {
                    ty: ty.to_string(),
                    desc: clean_desc(after),
                });
            }
        }
        return;
    }

    if let Some(caps) = RE_TAG.captures(trimmed) {
        let tag = caps[1].to_string();
        let body = caps[2].trim().to_string();
        process_tag(b, &tag, &body);
        return;
    }

    let text = rest.strip_prefix(' ').unwrap_or(rest).trim_end();
    match b.mode {
        Mode::Summary => b.summary.push(text.to_string()),
        Mode::Example => {
            if let Some(ref mut ex) = b.example {
                ex.push(text.to_string());
            }
        }
        Mode::Note => b.note.push(text.trim().to_string()),
        Mode::Param(i) => {
            if let Some(p) = b.params.get_mut(i) {
                append_desc(&mut p.desc, text);
            }
        }
        Mode::Return(i) => {
            if let Some(r) = b.returns.get_mut(i) {
                append_desc(&mut r.desc, text);
            }
        }
        Mode::Field => {
            if let Some(f) = b.class.as_mut().and_then(|c| c.fields.last_mut()) {
                append_desc(&mut f.desc, text);
            }
        }
    }
}

fn process_tag(b: &mut Docblock, tag: &str, body: &str) {
    match tag {
        "param" => {
            let (name, after) = split_word(body);
            let (ty, after) = split_type(after);
            if name.is_empty() || ty.is_empty() {
                b.malformed.push(format!("@param {:?} needs a name and a type", body));
                b.mode = Mode::Summary;
                return;
            }
            let optional = name.ends_with('?') && name != "...";
            b.params.push(Param {
                name: name.trim_end_matches('?').to_string(),
                ty: Some(ty.to_string()),
                desc: clean_desc(after),
                optional,
            });
            b.mode = Mode::Param(b.params.len() - 1);
        }
        "return" => {
            let (ty, after) = split_type(body);
            if ty.is_empty() {
                b.malformed.push("@return needs a type".to_string());
                b.mode = Mode::Summary;
                return;
            }
            let (name, desc) = split_return_name(after);
            b.returns.push(Return {
                ty: ty.to_string(),
                name,
                desc,
            });
            b.mode = Mode::Return(b.returns.len() - 1);
        }
        "class" => {
            close_types(b);
            if let Some(caps) = RE_CLASS.captures(body) {
                let summary = join_summary(&std::mem::take(&mut b.summary));
                b.class = Some(ClassDoc {
                    name: caps[1].to_string(),
                    parent: caps.get(2).map(|m| m.as_str().to_string()),
                    summary,
                    fields: Vec::new(),
                });
            }
            b.mode = Mode::Field;
        }
        "field" => {
            let Some(ref mut class) = b.class else {
                return;
            };
            let body = ["private ", "protected ", "public ", "package "]
                .iter()
                .find_map(|v| body.strip_prefix(v))
                .unwrap_or(body);
            let (name, after) = split_word(body);
            let (ty, after) = split_type(after);
            if name.is_empty() || ty.is_empty() {
                return;
            }
            class.fields.push(Field {
                name: name.trim_end_matches('?').to_string(),
                ty: ty.to_string(),
                desc: clean_desc(after),
                optional: name.ends_with('?'),
            });
            b.mode = Mode::Field;
        }
        "alias" => {
            close_types(b);
            let (name, after) = split_word(body);
            if name.is_empty() {
                return;
            }
            let (ty, after) = split_type(after);
            let variants = if ty.is_empty() {
                Vec::new()
            } else {
                vec![AliasVariant {
                    ty: ty.to_string(),
                    desc: clean_desc(after),
                }]
            };
            b.alias = Some(AliasDoc {
                name: name.to_string(),
                variants,
            });
            b.mode = Mode::Summary;
        }
        "generic" => {
            for g in body.split(',') {
                let name = g.split(':').next().unwrap_or("").trim();
                if !name.is_empty() {
                    b.generics.push(name.to_string());
                }
            }
        }
        "note" => {
            if !body.is_empty() {
                b.note.push(body.to_string());
            }
            b.mode = Mode::Note;
        }
        "example" => {
            b.example = Some(Vec::new());
            b.mode = Mode::Example;
        }
        "deprecated" => {
            b.deprecated = Some(body.to_string());
            b.mode = Mode::Summary;
        }
        "private" | "nodoc" => b.private = true,
        // @type, @see, @overload, @diagnostic, @module, ...
        _ => b.mode = Mode::Summary,
    }
}

// -- Helper functions ---------------------------------------------------------

fn match_function(line: &str) -> Option<FuncDef> {
    let caps = RE_FUNC_STMT
        .captures(line)
        .or_else(|| RE_FUNC_ASSIGN.captures(line))?;
    let path = &caps[2];
    let name = path.rsplit(['.', ':']).next().unwrap_or(path).to_string();
    let params = caps[3]
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    Some(FuncDef {
        name,
        params,
        local: caps.get(1).is_some(),
    })
}

/// Build a function descriptor from a definition and its doc block.
fn add_function(s: &mut ParserState, def: FuncDef, mut block: Docblock, lineno: usize) {
    if let Some(first) = s.file.functions.iter().find(|f| f.name == def.name) {
        tracing::warn!(
            file = %s.file.path,
            function = %def.name,
            line = lineno,
            first = first.line,
            "duplicate function definition ignored"
        );
        return;
    }

    for annotated in &block.params {
        if !def.params.iter().any(|p| *p == annotated.name) {
            block.malformed.push(format!(
                "@param {} does not match any parameter",
                annotated.name
            ));
        }
    }

    let trusted = block.malformed.is_empty();
    if !trusted {
        tracing::warn!(
            file = %s.file.path,
            function = %def.name,
            line = lineno,
            reason = %block.malformed.join("; "),
            "ignoring malformed annotations"
        );
    }

    let params = def
        .params
        .iter()
        .map(|name| {
            let annotated = block.params.iter().find(|p| p.name == *name);
            match annotated {
                Some(p) if trusted => p.clone(),
                _ => Param {
                    name: name.clone(),
                    ..Default::default()
                },
            }
        })
        .collect();

    let example = block
        .example
        .as_ref()
        .map(|lines| unindent(lines))
        .filter(|e| !e.is_empty());

    s.file.functions.push(FunctionDoc {
        name: def.name,
        params,
        returns: if trusted { block.returns } else { Vec::new() },
        summary: join_summary(&block.summary),
        note: join_summary(&block.note),
        example,
        deprecated: block.deprecated,
        private: block.private || def.local,
        generics: block.generics,
        line: lineno,
    });
}

/// Close the open class or alias declaration, if any.
fn close_types(b: &mut Docblock) {
    b.classes.extend(b.class.take());
    b.aliases.extend(b.alias.take());
}

/// Take the current block, handing its type declarations to the file.
fn take_block(s: &mut ParserState) -> Docblock {
    let mut block = std::mem::take(&mut s.block);
    close_types(&mut block);
    s.file.classes.append(&mut block.classes);
    s.file.aliases.append(&mut block.aliases);
    block
}

fn end_block(s: &mut ParserState) {
    take_block(s);
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    }
}

/// `name desc`, `# desc`, a bare `name`, or free text.
fn split_return_name(text: &str) -> (Option<String>, Option<String>) {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return (None, clean_desc(text));
    }
    let (word, after) = split_word(text);
    if RE_IDENT.is_match(word) && (after.is_empty() || after.starts_with('#')) {
        return (Some(word.to_string()), clean_desc(after));
    }
    (None, clean_desc(text))
}

/// Strip a leading `#` comment marker and surrounding whitespace.
fn clean_desc(text: &str) -> Option<String> {
    let text = text.trim();
    let text = text.strip_prefix('#').unwrap_or(text).trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn append_desc(desc: &mut Option<String>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match desc {
        Some(d) => {
            d.push(' ');
            d.push_str(text);
        }
        None => *desc = Some(text.to_string()),
    }
}

/// Join lines, dropping leading and trailing blank lines.
fn join_summary(lines: &[String]) -> Option<String> {
    let start = lines.iter().position(|l| !l.trim().is_empty())?;
    let end = lines.iter().rposition(|l| !l.trim().is_empty())?;
    Some(lines[start..=end].join("\n"))
}

/// Remove common leading indentation and surrounding blank lines.
fn unindent(lines: &[String]) -> String {
    let min_indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    let stripped: Vec<String> = lines
        .iter()
        .map(|l| l.get(min_indent..).unwrap_or("").to_string())
        .collect();
    join_summary(&stripped).unwrap_or_default()
}
