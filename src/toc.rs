//! Markdown table of contents and GitHub-flavored anchor slugs.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").unwrap());

static RE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(```|~~~)").unwrap());

static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

pub const TOC_BEGIN: &str = r"^<!-- TOC -->$";
pub const TOC_END: &str = r"^<!-- /TOC -->$";

static RE_TOC_BEGIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(TOC_BEGIN).unwrap());

static RE_TOC_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(TOC_END).unwrap());

/// One heading of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub text: String,
    pub slug: String,
    /// Nesting depth relative to the shallowest heading (0-based)
    pub depth: usize,
}

/// Collect the headings of a Markdown document.
///
/// Fenced code blocks and the TOC region itself are skipped. Repeated
/// slugs get `-1`, `-2`, ... suffixes the way GitHub numbers them.
pub fn collect_headings(markdown: &str) -> Vec<TocEntry> {
    let mut raw: Vec<(usize, String)> = Vec::new();
    let mut in_fence = false;
    let mut in_toc = false;

    for line in markdown.lines() {
        if RE_FENCE.is_match(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if RE_TOC_BEGIN.is_match(line) {
            in_toc = true;
            continue;
        }
        if RE_TOC_END.is_match(line) {
            in_toc = false;
            continue;
        }
        if in_toc {
            continue;
        }
        if let Some(caps) = RE_HEADING.captures(line) {
            let text = caps[2].to_string();
            if !text.is_empty() {
                raw.push((caps[1].len(), text));
            }
        }
    }

    let min_level = raw.iter().map(|(level, _)| *level).min().unwrap_or(1);
    let mut seen: HashMap<String, usize> = HashMap::new();

    raw.into_iter()
        .map(|(level, text)| {
            let base = github_slug(&text);
            let count = seen.entry(base.clone()).or_insert(0);
            let slug = if *count == 0 {
                base
            } else {
                format!("{}-{}", base, count)
            };
            *count += 1;
            TocEntry {
                text: strip_links(&text),
                slug,
                depth: level - min_level,
            }
        })
        .collect()
}

/// Render entries as a nested Markdown list.
pub fn render_toc(entries: &[TocEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| format!("{}- {}", "  ".repeat(e.depth), render_toc_link(&e.text, &e.slug)))
        .collect()
}

/// Table of contents for a Markdown document, one line per heading.
pub fn generate_md_toc(markdown: &str) -> Vec<String> {
    render_toc(&collect_headings(markdown))
}

pub fn render_toc_link(text: &str, slug: &str) -> String {
    format!("[{}](#{})", text, slug)
}

/// GitHub heading anchor slug generation.
///
/// - link syntax reduced to its text
/// - lowercase
/// - remove all chars that aren't alphanumeric, space, underscore, or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in strip_links(text).to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// `[text](url)` → `text`
fn strip_links(text: &str) -> String {
    RE_LINK.replace_all(text, "$1").into_owned()
}
