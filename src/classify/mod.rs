//! JavaScript response classification.
//!
//! Decides whether a response *is* JavaScript or likely *contains*
//! JavaScript, using three signals in a fixed precedence order
//! (first match wins):
//!
//! 1. URL path extension (case-insensitive)
//! 2. Declared/inferred MIME hint (case-insensitive substring)
//! 3. `Content-Type` header values (case-sensitive substring)
//!
//! The case asymmetry between (2) and (3) is deliberate and pinned by
//! tests. Missing or empty signals are non-matching, never errors:
//! classification runs on the live traffic path and must not throw.

use crate::config::constants::CONTENT_TYPE_HEADER;
use crate::config::SiftConfig;
use crate::models::{Classification, Exchange};

/// Classifies a response with respect to JavaScript content.
pub fn classify(exchange: &Exchange, config: &SiftConfig) -> Classification {
    // 1. URL path extension.
    if has_script_extension(exchange, config) {
        log::debug!("{} classified as script by extension", exchange.url);
        return Classification::IsScript;
    }

    // 2. Declared MIME type, falling back to the inferred one.
    if let Some(hint) = first_mime_hint(exchange) {
        if matches_script_mime_hint(hint, config) {
            log::debug!("{} classified as script by MIME hint '{hint}'", exchange.url);
            return Classification::IsScript;
        }
    }

    // 3. Content-Type header values. A JavaScript token anywhere wins over
    // a contains-script token.
    let mut contains_script = false;
    for value in exchange.header_values(CONTENT_TYPE_HEADER) {
        if config
            .script_mime_types
            .iter()
            .any(|token| value.contains(token.as_str()))
        {
            log::debug!(
                "{} classified as script by Content-Type '{value}'",
                exchange.url
            );
            return Classification::IsScript;
        }
        if config
            .contains_script_content_types
            .iter()
            .any(|token| value.contains(token.as_str()))
        {
            contains_script = true;
        }
    }

    if contains_script {
        Classification::ContainsScript
    } else {
        Classification::Neither
    }
}

fn has_script_extension(exchange: &Exchange, config: &SiftConfig) -> bool {
    match exchange.path_extension() {
        Some(extension) => config
            .script_extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(extension)),
        None => false,
    }
}

/// First non-empty MIME hint: declared wins over inferred.
fn first_mime_hint(exchange: &Exchange) -> Option<&str> {
    exchange
        .declared_mime
        .as_deref()
        .filter(|hint| !hint.is_empty())
        .or_else(|| {
            exchange
                .inferred_mime
                .as_deref()
                .filter(|hint| !hint.is_empty())
        })
}

fn matches_script_mime_hint(hint: &str, config: &SiftConfig) -> bool {
    let hint = hint.to_ascii_lowercase();
    config
        .script_mime_types
        .iter()
        .any(|token| hint.contains(&token.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn exchange(url: &str) -> Exchange {
        Exchange {
            url: Url::parse(url).unwrap(),
            headers: Vec::new(),
            body: Vec::new(),
            declared_mime: None,
            inferred_mime: None,
        }
    }

    fn config() -> SiftConfig {
        SiftConfig::default()
    }

    #[test]
    fn extension_match_is_script() {
        let exchange = exchange("https://example.net/static/app.js");
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let exchange = exchange("https://example.net/static/APP.JS");
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn extension_wins_over_contradicting_mime() {
        // Extension has top precedence: an HTML MIME hint must not demote it.
        let mut exchange = exchange("https://example.net/app.js");
        exchange.declared_mime = Some("HTML".into());
        exchange.headers = vec![(
            "Content-Type".into(),
            "text/html; charset=utf-8".into(),
        )];
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn declared_mime_hint_is_script() {
        let mut exchange = exchange("https://example.net/bundle");
        exchange.declared_mime = Some("script".into());
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn inferred_mime_used_when_declared_is_empty() {
        let mut exchange = exchange("https://example.net/bundle");
        exchange.declared_mime = Some(String::new());
        exchange.inferred_mime = Some("application/javascript".into());
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn mime_hint_match_is_case_insensitive() {
        let mut exchange = exchange("https://example.net/bundle");
        exchange.declared_mime = Some("Application/JavaScript".into());
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn header_token_match_is_case_sensitive() {
        // The header check deliberately does not fold case; an upper-cased
        // token must not match.
        let mut exchange = exchange("https://example.net/bundle");
        exchange.headers = vec![("Content-Type".into(), "text/JAVASCRIPT".into())];
        assert_eq!(classify(&exchange, &config()), Classification::Neither);

        let mut exchange = self::exchange("https://example.net/bundle");
        exchange.headers = vec![("Content-Type".into(), "text/javascript".into())];
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn header_with_parameters_still_matches() {
        let mut exchange = exchange("https://example.net/bundle");
        exchange.headers = vec![(
            "content-type".into(),
            "application/javascript; charset=utf-8".into(),
        )];
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn html_content_type_contains_script() {
        let mut exchange = exchange("https://example.net/index.html");
        exchange.headers = vec![(
            "Content-Type".into(),
            "text/html; charset=utf-8".into(),
        )];
        assert_eq!(
            classify(&exchange, &config()),
            Classification::ContainsScript
        );
    }

    #[test]
    fn script_header_wins_over_contains_script_header() {
        let mut exchange = exchange("https://example.net/page");
        exchange.headers = vec![
            ("Content-Type".into(), "text/html".into()),
            ("Content-Type".into(), "text/javascript".into()),
        ];
        assert_eq!(classify(&exchange, &config()), Classification::IsScript);
    }

    #[test]
    fn nothing_matches_is_neither() {
        let mut exchange = exchange("https://example.net/logo.png");
        exchange.declared_mime = Some("PNG".into());
        exchange.headers = vec![("Content-Type".into(), "image/png".into())];
        assert_eq!(classify(&exchange, &config()), Classification::Neither);
    }

    #[test]
    fn missing_signals_do_not_error() {
        let exchange = exchange("https://example.net/");
        assert_eq!(classify(&exchange, &config()), Classification::Neither);
    }
}
