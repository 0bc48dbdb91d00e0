//! Data model for parsed Lua annotations — format-agnostic.

use std::collections::BTreeMap;

/// Everything declared in a single Lua source file.
#[derive(Debug, Default, Clone)]
pub struct FileDoc {
    /// Path relative to the scan root, `/` separated (e.g. `three/windows/init.lua`)
    pub path: String,
    pub functions: Vec<FunctionDoc>,
    pub classes: Vec<ClassDoc>,
    pub aliases: Vec<AliasDoc>,
}

/// A single discovered function.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FunctionDoc {
    /// Last segment of the definition path (`M.foo` → `foo`, `M:bar` → `bar`)
    pub name: String,
    /// Parameters in signature order
    pub params: Vec<Param>,
    /// @return entries in declaration order
    pub returns: Vec<Return>,
    /// Leading `---` text lines
    pub summary: Option<String>,
    /// @note
    pub note: Option<String>,
    /// @example body (verbatim lines)
    pub example: Option<String>,
    /// @deprecated, with optional reason
    pub deprecated: Option<String>,
    /// @private, @nodoc or `local function`
    pub private: bool,
    /// @generic type parameters
    pub generics: Vec<String>,
    /// Line number of the definition (1-based)
    pub line: usize,
}

impl FunctionDoc {
    /// Comma-separated parameter names, e.g. `a, b`.
    pub fn param_list(&self) -> String {
        self.params
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Return types joined for signatures, e.g. `boolean, string`.
    pub fn return_list(&self) -> Option<String> {
        if self.returns.is_empty() {
            return None;
        }
        Some(
            self.returns
                .iter()
                .map(|r| r.ty.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<String>,
    pub desc: Option<String>,
    /// `---@param name? type`
    pub optional: bool,
}

impl Param {
    /// Type as shown in rendered docs: optional params gain a `?` suffix,
    /// or a `nil|` prefix when the type is already a union.
    pub fn display_type(&self) -> Option<String> {
        let ty = self.ty.as_deref()?;
        Some(optional_type(ty, self.optional))
    }
}

/// Shared by params and fields.
pub fn optional_type(ty: &str, optional: bool) -> String {
    if !optional {
        ty.to_string()
    } else if ty.contains('|') {
        format!("nil|{}", ty)
    } else {
        format!("{}?", ty)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Return {
    pub ty: String,
    pub name: Option<String>,
    pub desc: Option<String>,
}

/// `---@class Name[: Parent]` plus its `---@field` lines.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassDoc {
    pub name: String,
    pub parent: Option<String>,
    pub summary: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub desc: Option<String>,
    pub optional: bool,
}

/// `---@alias Name` with one or more variants.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AliasDoc {
    pub name: String,
    pub variants: Vec<AliasVariant>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AliasVariant {
    pub ty: String,
    pub desc: Option<String>,
}

/// Per-run index of every scanned file, used to resolve cross-file type
/// references. Read-only once built.
#[derive(Debug, Default)]
pub struct TypeTable {
    pub files: BTreeMap<String, FileDoc>,
}

impl TypeTable {
    pub fn insert(&mut self, file: FileDoc) {
        self.files.insert(file.path.clone(), file);
    }

    pub fn file(&self, path: &str) -> Option<&FileDoc> {
        self.files.get(path)
    }

    /// Look up a class by name across every file.
    pub fn class(&self, name: &str) -> Option<&ClassDoc> {
        self.files
            .values()
            .flat_map(|f| f.classes.iter())
            .find(|c| c.name == name)
    }

    pub fn alias(&self, name: &str) -> Option<&AliasDoc> {
        self.files
            .values()
            .flat_map(|f| f.aliases.iter())
            .find(|a| a.name == name)
    }

    /// The class a param/field type refers to, if it names exactly one
    /// declared class (`three.Opts`, `three.Opts?`, `nil|three.Opts`).
    pub fn expandable_class(&self, ty: &str) -> Option<&ClassDoc> {
        self.class(single_type(ty)?)
    }

    /// Same as [`TypeTable::expandable_class`], for `---@alias` types.
    pub fn expandable_alias(&self, ty: &str) -> Option<&AliasDoc> {
        self.alias(single_type(ty)?)
    }

    /// Whether `name` is declared as a class or alias anywhere.
    pub fn declares(&self, name: &str) -> bool {
        self.class(name).is_some() || self.alias(name).is_some()
    }

    /// All fields of a class, including inherited ones (parent fields first).
    pub fn class_fields(&self, name: &str) -> Vec<&Field> {
        let mut chain = Vec::new();
        let mut current = self.class(name);
        while let Some(class) = current {
            if chain.iter().any(|c: &&ClassDoc| c.name == class.name) {
                break;
            }
            chain.push(class);
            current = class.parent.as_deref().and_then(|p| self.class(p));
        }
        chain
            .into_iter()
            .rev()
            .flat_map(|c| c.fields.iter())
            .collect()
    }
}

/// The only non-nil member of a (possibly optional) type.
fn single_type(ty: &str) -> Option<&str> {
    let mut names = ty
        .split('|')
        .map(|t| t.trim().trim_end_matches('?'))
        .filter(|t| !t.is_empty() && *t != "nil");
    let name = names.next()?;
    if names.next().is_some() {
        return None;
    }
    Some(name)
}
