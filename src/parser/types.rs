//! LuaCATS type expressions: splitting them off annotation text and
//! resolving the names they reference against the [`TypeTable`].

use crate::error::DocError;
use crate::model::{FunctionDoc, TypeTable};

/// Names every Lua language server knows without a declaration.
const BUILTIN_TYPES: &[&str] = &[
    "nil",
    "any",
    "boolean",
    "string",
    "number",
    "integer",
    "function",
    "table",
    "thread",
    "userdata",
    "lightuserdata",
    "unknown",
    "self",
    "true",
    "false",
    "fun",
];

/// Split a leading type expression off `text`.
///
/// Returns `(type, rest)`. A type ends at the first whitespace outside
/// brackets and quotes, except around `|` unions and the `): ret` of a
/// `fun(...)` type, which may contain spaces.
pub fn split_type(text: &str) -> (&str, &str) {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            b'"' | b'\'' | b'`' => quote = Some(c),
            b'(' | b'<' | b'{' | b'[' => depth += 1,
            b')' | b'>' | b'}' | b']' => depth -= 1,
            b' ' | b'\t' if depth <= 0 => {
                let head = s[..i].trim_end();
                let rest = s[i..].trim_start();
                let joined = head.ends_with('|')
                    || head.ends_with(':')
                    || rest.starts_with('|')
                    || (rest.starts_with(':') && head.ends_with(')'));
                if !joined {
                    return (&s[..i], rest);
                }
            }
            _ => {}
        }
        i += 1;
    }
    (s, "")
}

/// Every type name referenced by a type expression, in order.
///
/// String and number literals, field/parameter names inside `fun(...)` and
/// `{ ... }` types, and the vararg `...` are not type names.
pub fn referenced_names(ty: &str) -> Vec<&str> {
    let bytes = ty.as_bytes();
    let mut names = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if matches!(c, b'"' | b'\'' | b'`') {
            i += 1;
            while i < bytes.len() && bytes[i] != c {
                i += 1;
            }
            i += 1;
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.') {
                i += 1;
            }
        } else if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
            {
                i += 1;
            }
            let name = ty[start..i].trim_end_matches('.');
            let mut j = i;
            while j < bytes.len() && matches!(bytes[j], b' ' | b'?') {
                j += 1;
            }
            // `name:` is a field or parameter label
            if j < bytes.len() && bytes[j] == b':' {
                continue;
            }
            names.push(name);
        } else {
            i += 1;
        }
    }
    names
}

fn is_known(name: &str, func: &FunctionDoc, table: &TypeTable, externals: &[String]) -> bool {
    BUILTIN_TYPES.contains(&name)
        || func.generics.iter().any(|g| g == name)
        || externals.iter().any(|ns| name.starts_with(ns.as_str()))
        || table.declares(name)
}

/// Check that every type named in a public function signature is a builtin,
/// lives in an external namespace (e.g. `vim.`), or is declared as a class
/// or alias somewhere in the table.
pub fn resolve(table: &TypeTable, externals: &[String]) -> Result<(), DocError> {
    for file in table.files.values() {
        for func in file.functions.iter().filter(|f| !f.private) {
            let types = func
                .params
                .iter()
                .filter_map(|p| p.ty.as_deref())
                .chain(func.returns.iter().map(|r| r.ty.as_str()));
            for ty in types {
                if let Some(name) = referenced_names(ty)
                    .into_iter()
                    .find(|n| !is_known(n, func, table, externals))
                {
                    return Err(DocError::UnresolvedType {
                        file: file.path.clone(),
                        function: func.name.clone(),
                        ty: name.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassDoc, FileDoc, Param};

    #[test]
    fn split_simple_type() {
        assert_eq!(split_type("string The name"), ("string", "The name"));
        assert_eq!(split_type("boolean"), ("boolean", ""));
    }

    #[test]
    fn split_generic_and_fun_types() {
        assert_eq!(
            split_type("table<string, integer> lookup"),
            ("table<string, integer>", "lookup")
        );
        assert_eq!(
            split_type("fun(a: string, b: number): boolean callback"),
            ("fun(a: string, b: number): boolean", "callback")
        );
    }

    #[test]
    fn split_spaced_union() {
        assert_eq!(split_type("string | nil # maybe"), ("string | nil", "# maybe"));
    }

    #[test]
    fn split_quoted_literal() {
        assert_eq!(split_type(r#""a b"|"c" desc"#), (r#""a b"|"c""#, "desc"));
    }

    #[test]
    fn names_skip_literals_and_labels() {
        assert_eq!(
            referenced_names(r#"fun(win: integer, opts?: three.Opts): "ok"|nil"#),
            vec!["fun", "integer", "three.Opts", "nil"]
        );
        assert_eq!(referenced_names("three.Dir[]"), vec!["three.Dir"]);
        assert_eq!(referenced_names("1|2|0x1F"), Vec::<&str>::new());
        assert_eq!(referenced_names("{ wrap: boolean }"), vec!["boolean"]);
    }

    fn table_with(func: FunctionDoc, classes: Vec<ClassDoc>) -> TypeTable {
        let mut table = TypeTable::default();
        table.insert(FileDoc {
            path: "three/a.lua".to_string(),
            functions: vec![func],
            ..Default::default()
        });
        table.insert(FileDoc {
            path: "three/types.lua".to_string(),
            classes,
            ..Default::default()
        });
        table
    }

    fn func_with_param(ty: &str) -> FunctionDoc {
        FunctionDoc {
            name: "open".to_string(),
            params: vec![Param {
                name: "opts".to_string(),
                ty: Some(ty.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn resolves_class_declared_in_other_file() {
        let class = ClassDoc {
            name: "three.Opts".to_string(),
            ..Default::default()
        };
        let table = table_with(func_with_param("nil|three.Opts"), vec![class]);
        assert!(resolve(&table, &[]).is_ok());
    }

    #[test]
    fn external_namespace_needs_no_declaration() {
        let table = table_with(func_with_param("vim.api.keyset.option"), vec![]);
        assert!(resolve(&table, &["vim.".to_string()]).is_ok());
    }

    #[test]
    fn unresolved_type_is_fatal() {
        let table = table_with(func_with_param("three.Missing"), vec![]);
        let err = resolve(&table, &[]).unwrap_err();
        match err {
            DocError::UnresolvedType { file, function, ty } => {
                assert_eq!(file, "three/a.lua");
                assert_eq!(function, "open");
                assert_eq!(ty, "three.Missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn private_functions_are_not_checked() {
        let mut func = func_with_param("three.Missing");
        func.private = true;
        let table = table_with(func, vec![]);
        assert!(resolve(&table, &[]).is_ok());
    }

    #[test]
    fn generic_parameters_resolve() {
        let mut func = func_with_param("T[]");
        func.generics.push("T".to_string());
        let table = table_with(func, vec![]);
        assert!(resolve(&table, &[]).is_ok());
    }
}
