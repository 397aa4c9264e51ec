//! [`RenderEngine`] backed by the `mermaid-rs-renderer` crate.
//!
//! The crate does parsing, layout, and SVG emission. This adapter adds the
//! two things the pipeline needs on top:
//!
//! 1. a diagram-type check up front, so free text is rejected with a
//!    readable message instead of being laid out as something odd
//! 2. the render id on the root `<svg>` element
//!
//! A panic inside the crate is turned into an ordinary render failure.

use super::render::RenderEngine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// Header keywords that open a Mermaid diagram.
const DIAGRAM_KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "flowchart-elk",
    "sequenceDiagram",
    "classDiagram",
    "classDiagram-v2",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
    "mindmap",
    "timeline",
    "gitGraph",
    "quadrantChart",
    "requirementDiagram",
    "xychart-beta",
    "sankey-beta",
    "block-beta",
    "packet-beta",
    "architecture-beta",
    "kanban",
];

/// `id="…"` / `id='…'` on the root tag. The leading whitespace keeps
/// `data-id` and friends out of it.
static RE_ID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+id\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap());

/// Mermaid renderer used by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct MermaidEngine;

impl RenderEngine for MermaidEngine {
    fn render(&self, id: &str, source: &str) -> Result<String, String> {
        let keyword = diagram_keyword(source)
            .ok_or_else(|| "No diagram found: the text is empty or only comments".to_string())?;
        if !DIAGRAM_KEYWORDS.contains(&keyword) {
            return Err(format!("No diagram type detected for '{keyword}'"));
        }
        debug!("Rendering {} diagram as {}", keyword, id);

        let svg = catch_unwind(AssertUnwindSafe(|| mermaid_rs_renderer::render(source)))
            .map_err(|_| format!("Render engine crashed on this {keyword} diagram"))?
            .map_err(|e| format!("{e:#}"))?;
        stamp_root_id(&svg, id)
    }
}

/// First token of the first meaningful line.
///
/// Skips blank lines, `%%` comments and directives, and a `---` front-matter
/// block. The token ends at whitespace or `;` (`graph TD;A-->B` is legal).
fn diagram_keyword(source: &str) -> Option<&str> {
    let mut in_front_matter = false;
    let mut first = true;

    for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if first && line == "---" {
            in_front_matter = true;
            first = false;
            continue;
        }
        first = false;
        if in_front_matter {
            if line == "---" {
                in_front_matter = false;
            }
            continue;
        }
        if line.starts_with("%%") {
            continue;
        }
        return line
            .split(|c: char| c.is_whitespace() || c == ';')
            .next()
            .filter(|t| !t.is_empty());
    }
    None
}

/// Put `id` on the root `<svg>` element, replacing any id it already has.
///
/// A leading XML declaration, doctype, or comment is dropped so the markup
/// can be embedded directly.
fn stamp_root_id(svg: &str, id: &str) -> Result<String, String> {
    let body = skip_prolog(svg);
    if !body.starts_with("<svg") {
        return Err("Render engine produced no <svg> root element".to_string());
    }
    let tag_end = body
        .find('>')
        .ok_or_else(|| "Render engine produced an unterminated <svg> tag".to_string())?;
    let attrs = RE_ID_ATTR.replace_all(&body[4..tag_end], "");
    Ok(format!("<svg id=\"{id}\"{attrs}{}", &body[tag_end..]))
}

fn skip_prolog(mut s: &str) -> &str {
    loop {
        s = s.trim_start();
        let skip = if s.starts_with("<?") {
            s.find("?>").map(|i| i + 2)
        } else if s.starts_with("<!--") {
            s.find("-->").map(|i| i + 3)
        } else if s.starts_with("<!DOCTYPE") {
            s.find('>').map(|i| i + 1)
        } else {
            None
        };
        match skip {
            Some(n) => s = &s[n..],
            None => return s,
        }
    }
}
