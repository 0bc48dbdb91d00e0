//! Marker-delimited regions inside text files.
//!
//! A region is identified by a begin and an end regex, each matched against
//! whole lines (without terminators). The begin pattern must match exactly
//! one line of the file; the region closes at the first line after it that
//! matches the end pattern, so generated content further down (a `})` in an
//! example block) never competes with the real end marker. Everything
//! strictly between the two marker lines is the region interior.

use crate::error::DocError;
use regex::Regex;
use std::path::Path;

/// A text file split into lines, remembering each line's terminator so
/// that rendering an unmodified file gives back the original bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFile {
    pub lines: Vec<String>,
    /// `"\n"`, `"\r\n"`, or `""` for an unterminated last line
    endings: Vec<&'static str>,
}

impl TextFile {
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut endings = Vec::new();
        for piece in text.split_inclusive('\n') {
            let (line, ending) = if let Some(l) = piece.strip_suffix("\r\n") {
                (l, "\r\n")
            } else if let Some(l) = piece.strip_suffix('\n') {
                (l, "\n")
            } else {
                (piece, "")
            };
            lines.push(line.to_string());
            endings.push(ending);
        }
        TextFile { lines, endings }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            out.push_str(line);
            out.push_str(ending);
        }
        out
    }

    /// Replace the lines strictly between `start` and `stop`. New lines
    /// keep the terminators of the lines they replace; extra lines take the
    /// begin marker's.
    fn splice_interior(&mut self, start: usize, stop: usize, new_lines: &[String]) {
        let fallback = match self.endings[start] {
            "" => "\n",
            e => e,
        };
        let old = self.endings[start + 1..stop].to_vec();
        let endings: Vec<&'static str> = (0..new_lines.len())
            .map(|i| old.get(i).copied().unwrap_or(fallback))
            .collect();
        self.lines.splice(start + 1..stop, new_lines.iter().cloned());
        self.endings.splice(start + 1..stop, endings);
    }
}

fn compile(pattern: &str) -> Result<Regex, DocError> {
    Regex::new(pattern).map_err(|source| DocError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Locate the marker lines; returns `(begin_index, end_index)`.
fn find_region(
    lines: &[String],
    file: &Path,
    begin: &str,
    end: &str,
) -> Result<(usize, usize), DocError> {
    let begin_re = compile(begin)?;
    let end_re = compile(end)?;

    let begins: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| begin_re.is_match(l))
        .map(|(i, _)| i)
        .collect();
    let start = single_match(&begins, file, begin)?;

    let stop = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| end_re.is_match(l))
        .map(|(i, _)| i)
        .ok_or_else(|| DocError::MarkerNotFound {
            file: file.to_path_buf(),
            pattern: end.to_string(),
        })?;

    Ok((start, stop))
}

fn single_match(matches: &[usize], file: &Path, pattern: &str) -> Result<usize, DocError> {
    match matches {
        [only] => Ok(*only),
        [] => Err(DocError::MarkerNotFound {
            file: file.to_path_buf(),
            pattern: pattern.to_string(),
        }),
        many => Err(DocError::MarkerAmbiguous {
            file: file.to_path_buf(),
            pattern: pattern.to_string(),
            count: many.len(),
        }),
    }
}

/// Lines strictly between the begin and end markers of `text`.
///
/// `file` is only used for error messages.
pub fn read_section(
    text: &str,
    file: &Path,
    begin: &str,
    end: &str,
) -> Result<Vec<String>, DocError> {
    let parsed = TextFile::parse(text);
    let (start, stop) = find_region(&parsed.lines, file, begin, end)?;
    Ok(parsed.lines[start + 1..stop].to_vec())
}

/// Replace the region interior of `text` with `new_lines`, leaving the
/// markers and everything outside them untouched.
pub fn replace_section(
    text: &str,
    file: &Path,
    begin: &str,
    end: &str,
    new_lines: &[String],
) -> Result<String, DocError> {
    let mut parsed = TextFile::parse(text);
    let (start, stop) = find_region(&parsed.lines, file, begin, end)?;
    parsed.splice_interior(start, stop, new_lines);
    Ok(parsed.render())
}

/// Prefix every non-blank line with `count` spaces.
pub fn indent(lines: &[String], count: usize) -> Vec<String> {
    let pad = " ".repeat(count);
    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, l)
            }
        })
        .collect()
}

/// Surround rendered lines with one blank line on each side.
pub fn padded(lines: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(String::new());
    out.extend(lines);
    out.push(String::new());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "README.md";

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn read_between_markers() {
        let text = "intro\n<!-- API -->\na\nb\n<!-- /API -->\noutro\n";
        let got = read_section(text, Path::new(FILE), "^<!-- API -->$", "^<!-- /API -->$").unwrap();
        assert_eq!(got, lines(&["a", "b"]));
    }

    #[test]
    fn replace_keeps_outside_lines() {
        let text = "intro\n<!-- API -->\nold\n<!-- /API -->\noutro\n";
        let out = replace_section(
            text,
            Path::new(FILE),
            "^<!-- API -->$",
            "^<!-- /API -->$",
            &lines(&["new 1", "new 2"]),
        )
        .unwrap();
        assert_eq!(out, "intro\n<!-- API -->\nnew 1\nnew 2\n<!-- /API -->\noutro\n");
    }

    #[test]
    fn replace_then_read_round_trips() {
        let text = "-- BEGIN\n-- END\n";
        let new = lines(&["", "M.foo = 1", ""]);
        let out = replace_section(text, Path::new(FILE), "^-- BEGIN$", "^-- END$", &new).unwrap();
        let back = read_section(&out, Path::new(FILE), "^-- BEGIN$", "^-- END$").unwrap();
        assert_eq!(back, new);
    }

    #[test]
    fn identical_replacement_is_byte_identical() {
        let text = "a\r\n<!-- X -->\r\nbody\r\n<!-- /X -->\r\nz";
        let interior = read_section(text, Path::new(FILE), "^<!-- X -->$", "^<!-- /X -->$").unwrap();
        let out =
            replace_section(text, Path::new(FILE), "^<!-- X -->$", "^<!-- /X -->$", &interior).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn missing_begin_marker_fails() {
        let err = read_section("a\nb\n", Path::new(FILE), "^BEGIN$", "^END$").unwrap_err();
        assert!(matches!(err, DocError::MarkerNotFound { ref pattern, .. } if pattern == "^BEGIN$"));
    }

    #[test]
    fn end_marker_before_begin_is_not_found() {
        let err = read_section("END\nBEGIN\n", Path::new(FILE), "^BEGIN$", "^END$").unwrap_err();
        assert!(matches!(err, DocError::MarkerNotFound { ref pattern, .. } if pattern == "^END$"));
    }

    #[test]
    fn ambiguous_marker_fails() {
        let text = "BEGIN\nx\nEND\nBEGIN\nEND\n";
        let err = replace_section(text, Path::new(FILE), "^BEGIN$", "^END$", &[]).unwrap_err();
        assert!(matches!(err, DocError::MarkerAmbiguous { count: 2, .. }));
    }

    #[test]
    fn region_closes_at_first_end_marker() {
        let text = "BEGIN\nold\nEND\n```lua\nfoo({\nEND\n```\n";
        let got = read_section(text, Path::new(FILE), "^BEGIN$", "^END$").unwrap();
        assert_eq!(got, lines(&["old"]));

        let out = replace_section(text, Path::new(FILE), "^BEGIN$", "^END$", &lines(&["new"])).unwrap();
        assert_eq!(out, "BEGIN\nnew\nEND\n```lua\nfoo({\nEND\n```\n");
    }

    #[test]
    fn mixed_line_endings_are_kept() {
        let text = "a\nBEGIN\r\nold\nEND\nz\r\n";
        let out = replace_section(text, Path::new(FILE), "^BEGIN$", "^END$", &lines(&["x", "y"])).unwrap();
        assert_eq!(out, "a\nBEGIN\r\nx\ny\r\nEND\nz\r\n");

        let interior = read_section(text, Path::new(FILE), "^BEGIN$", "^END$").unwrap();
        let same = replace_section(text, Path::new(FILE), "^BEGIN$", "^END$", &interior).unwrap();
        assert_eq!(same, text);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = read_section("x\n", Path::new(FILE), "(", "^END$").unwrap_err();
        assert!(matches!(err, DocError::InvalidPattern { .. }));
    }

    #[test]
    fn indent_skips_blank_lines() {
        assert_eq!(
            indent(&lines(&["a = 1,", "", "  b = 2,"]), 4),
            lines(&["    a = 1,", "", "      b = 2,"])
        );
    }

    #[test]
    fn text_file_preserves_missing_final_newline() {
        for text in ["", "\n", "a", "a\n", "a\n\nb\n", "a\r\nb", "a\nb\r\nc\n"] {
            assert_eq!(TextFile::parse(text).render(), text);
        }
    }
}
