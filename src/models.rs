//! Core value types shared across the pipeline.
//!
//! Everything here is an immutable value: an [`Exchange`] is populated by the
//! intercepting collaborator before it enters the library and is never
//! mutated; a [`Fingerprint`] is derived once per exchange; a
//! [`ReformatJob`] is owned by the dispatcher from submission to completion.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use url::Url;

/// One captured HTTP request/response pair, as delivered by the traffic
/// interception collaborator.
///
/// Headers are kept in wire order and may repeat. The MIME hints come from
/// the collaborator's own content analysis (`declared` from the response,
/// `inferred` from sniffing) and are both optional.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Request URL.
    pub url: Url,
    /// Response headers, ordered, possibly with repeated names.
    pub headers: Vec<(String, String)>,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// MIME type declared by the response, if any.
    pub declared_mime: Option<String>,
    /// MIME type inferred by the collaborator's content sniffing, if any.
    pub inferred_mime: Option<String>,
}

impl Exchange {
    /// Returns the values of all headers matching `name`, compared
    /// case-insensitively, in wire order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the extension of the URL path's final segment, if it has one.
    ///
    /// The query string is not part of [`Url::path`], so
    /// `/path/to/app.js?v=2` yields `js`.
    pub fn path_extension(&self) -> Option<&str> {
        self.url
            .path()
            .rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .map(|(_, extension)| extension)
    }

    /// Formats the observed MIME hints as `"<inferred> -- <declared>"`,
    /// the shape the advisory debug header carries.
    pub fn mime_summary(&self) -> String {
        format!(
            "{} -- {}",
            self.inferred_mime.as_deref().unwrap_or(""),
            self.declared_mime.as_deref().unwrap_or("")
        )
    }
}

/// How a response was classified with respect to JavaScript content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The response body *is* JavaScript (extension or MIME signal).
    IsScript,
    /// The response is not JavaScript but likely embeds inline scripts.
    ContainsScript,
    /// Nothing script-related was detected.
    Neither,
}

impl Classification {
    /// True when the response carries JavaScript worth reformatting.
    pub fn is_script_bearing(&self) -> bool {
        !matches!(self, Classification::Neither)
    }
}

/// 128-bit MD5 content digest used as a stable identity for script bodies.
///
/// This is an identity key, not a security primitive: two exchanges with
/// equal hashes are considered duplicate work.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Wraps a raw 16-byte digest.
    pub fn new(digest: [u8; 16]) -> Self {
        ContentHash(digest)
    }

    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex rendering, used for output file names and records.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Content identity plus descriptive metadata for one exchange.
///
/// The hash covers the submitted source bytes (the whole body for a script
/// response, the extracted fragment for a contains-script response), so
/// identical scripts embedded in different pages dedup together.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    /// Host component of the request URL (empty if the URL has none).
    pub host: String,
    /// Full request URL.
    pub url: String,
    /// Identity of the script content.
    pub content_hash: ContentHash,
    /// When the exchange was fingerprinted.
    pub captured_at: DateTime<Utc>,
}

/// A unit of reformatting work, immutable once submitted.
#[derive(Debug, Clone)]
pub struct ReformatJob {
    /// The JavaScript source to beautify.
    pub source: String,
    /// Identity and metadata of the content.
    pub fingerprint: Fingerprint,
    /// Where the beautified output is written on success.
    pub destination: PathBuf,
}

/// Lifecycle label of a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// The job was accepted and is in flight.
    Added,
    /// Beautified output was written.
    Beautified,
    /// Beautification or output writing failed.
    Failed,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordStatus::Added => "Added",
            RecordStatus::Beautified => "Beautified",
            RecordStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// One entry in the append-only result stream consumed by the display
/// collaborator.
///
/// After append only `status` changes, exactly once, when the job reaches a
/// terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    /// Position in the append-only stream.
    pub sequence: u64,
    /// Host the script was served from.
    pub host: String,
    /// URL the script was served from.
    pub url: String,
    /// Current lifecycle label.
    pub status: RecordStatus,
    /// Hex content hash, which is also the output file's base name.
    pub content_hash: String,
    /// Capture timestamp in epoch milliseconds.
    pub observed_at_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange_with_url(url: &str) -> Exchange {
        Exchange {
            url: Url::parse(url).unwrap(),
            headers: Vec::new(),
            body: Vec::new(),
            declared_mime: None,
            inferred_mime: None,
        }
    }

    #[test]
    fn path_extension_ignores_query_string() {
        let exchange = exchange_with_url("https://example.net/path/to/app.js?param=val");
        assert_eq!(exchange.path_extension(), Some("js"));
    }

    #[test]
    fn path_extension_uses_last_dot() {
        let exchange = exchange_with_url("https://example.net/lib/app.min.js");
        assert_eq!(exchange.path_extension(), Some("js"));
    }

    #[test]
    fn path_extension_missing() {
        let exchange = exchange_with_url("https://example.net/api/v1/users");
        assert_eq!(exchange.path_extension(), None);
    }

    #[test]
    fn header_values_match_case_insensitively() {
        let mut exchange = exchange_with_url("https://example.net/");
        exchange.headers = vec![
            ("content-type".into(), "text/html".into()),
            ("X-Other".into(), "1".into()),
            ("CONTENT-TYPE".into(), "text/plain".into()),
        ];
        let values: Vec<_> = exchange.header_values("Content-Type").collect();
        assert_eq!(values, vec!["text/html", "text/plain"]);
    }

    #[test]
    fn mime_summary_tolerates_missing_hints() {
        let mut exchange = exchange_with_url("https://example.net/");
        assert_eq!(exchange.mime_summary(), " -- ");
        exchange.declared_mime = Some("script".into());
        exchange.inferred_mime = Some("HTML".into());
        assert_eq!(exchange.mime_summary(), "HTML -- script");
    }

    #[test]
    fn content_hash_hex_roundtrip() {
        let hash = ContentHash::new([0xab; 16]);
        assert_eq!(hash.to_hex().len(), 32);
        assert_eq!(hash.to_hex(), "ab".repeat(16));
        assert_eq!(format!("{hash}"), hash.to_hex());
    }
}
