//! Inline script extraction from HTML-like responses.
//!
//! Applies when the classifier says a response *contains* script. The scan
//! is a lightweight heuristic over the decoded text, not an HTML parse:
//! `<script ...>` regions are matched case-insensitively with attributes
//! ignored, except that a `src=` attribute marks the element as externally
//! referenced and its (normally empty) body is skipped. Bodies are
//! concatenated in document order, joined by a newline.
//!
//! Malformed input never raises an error: an unterminated opening tag
//! extends to end of document, and anything unparseable simply contributes
//! nothing.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_OPEN: LazyLock<Regex> = LazyLock::new(|| compile_static(r"(?i)<script\b[^>]*>"));
static SCRIPT_CLOSE: LazyLock<Regex> = LazyLock::new(|| compile_static(r"(?i)</script\s*>"));
static SRC_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| compile_static(r#"(?i)\bsrc\s*="#));

/// Compiles a hardcoded pattern, falling back to a match-nothing pattern on
/// failure so a typo cannot panic the traffic path.
fn compile_static(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        log::error!("Failed to compile static pattern '{pattern}': {e}");
        Regex::new("$^").expect("fallback pattern is valid")
    })
}

/// Extracts all inline `<script>` bodies from a response body.
///
/// Returns the bodies in document order, separated by a single `\n`.
/// Whitespace-only bodies (including those of `src=`-referenced scripts)
/// are dropped. Returns an empty string when the input is empty or no
/// script regions are found.
pub fn extract_inline_scripts(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }

    let text = String::from_utf8_lossy(body);
    let mut fragments: Vec<&str> = Vec::new();
    let mut position = 0usize;

    while position < text.len() {
        let Some(open) = SCRIPT_OPEN.find_at(&text, position) else {
            break;
        };
        let body_start = open.end();

        // An unmatched opening tag extends to end of document.
        let (body_end, next_position) = match SCRIPT_CLOSE.find_at(&text, body_start) {
            Some(close) => (close.start(), close.end()),
            None => (text.len(), text.len()),
        };

        // Only inline bodies; externally-referenced scripts are resolved by
        // the browser, not by us.
        if !SRC_ATTRIBUTE.is_match(open.as_str()) {
            let fragment = &text[body_start..body_end];
            if !fragment.trim().is_empty() {
                fragments.push(fragment);
            }
        }

        position = next_position;
    }

    if fragments.is_empty() {
        log::debug!("No inline script regions found in {} bytes", body.len());
    }
    fragments.join("\n")
}
