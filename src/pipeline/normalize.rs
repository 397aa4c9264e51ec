//! Normalisation of diagram text before it is cached and rendered.
//!
//! Converter responses and hand-written `.mmd` files arrive with the usual
//! transport noise: a byte-order mark from Windows editors, CRLF line
//! endings, or the whole diagram wrapped in a Markdown code fence when it was
//! copied out of a README. None of that is part of the diagram language.
//!
//! Text that has none of these artefacts passes through unchanged, so the
//! cached source is byte-identical to what the user supplied.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules, in order:
/// 1. Strip invisible Unicode (BOM, zero-width spaces)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Strip an outer ```` ```mermaid ```` fence
pub fn normalize_source(input: &str) -> String {
    let s = remove_invisible_chars(input);
    let s = normalise_line_endings(&s);
    strip_code_fence(&s)
}

// ── Rule 1: Strip invisible Unicode ──────────────────────────────────────────

const INVISIBLE: [char; 4] = ['\u{FEFF}', '\u{200B}', '\u{200C}', '\u{200D}'];

fn remove_invisible_chars(input: &str) -> String {
    if input.contains(INVISIBLE) {
        input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip outer code fence ───────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:mermaid|mmd)?[ \t]*\n(.*?)\n?```\s*$").unwrap());

fn strip_code_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_is_untouched() {
        let src = "graph TD; A-->B;";
        assert_eq!(normalize_source(src), src);
        let multi = "graph TD\n  A --> B\n";
        assert_eq!(normalize_source(multi), multi);
    }

    #[test]
    fn strips_bom() {
        assert_eq!(normalize_source("\u{FEFF}graph TD; A-->B;"), "graph TD; A-->B;");
    }

    #[test]
    fn normalises_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn strips_mermaid_fence() {
        let input = "```mermaid\ngraph TD\nA-->B\n```";
        assert_eq!(normalize_source(input), "graph TD\nA-->B");
    }

    #[test]
    fn strips_bare_fence_with_crlf() {
        let input = "```\r\ngraph LR\r\nA-->B\r\n```\r\n";
        assert_eq!(normalize_source(input), "graph LR\nA-->B");
    }

    #[test]
    fn inner_fence_text_is_kept() {
        let input = "graph TD\nA[\"```\"]-->B";
        assert_eq!(normalize_source(input), input);
    }
}
