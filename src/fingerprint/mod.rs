//! Content fingerprinting.
//!
//! Computes the stable identity of a script body (an MD5 digest, used
//! strictly as an identity key) plus the descriptive metadata carried
//! alongside it. The digest covers the bytes actually submitted for
//! reformatting, so the same script embedded in different pages produces
//! the same fingerprint.

use chrono::Utc;
use md5::{Digest, Md5};

use crate::models::{ContentHash, Exchange, Fingerprint};

/// Hashes `source` and pairs the digest with the exchange's host, URL and
/// the current timestamp.
pub fn fingerprint_source(exchange: &Exchange, source: &[u8]) -> Fingerprint {
    Fingerprint {
        host: exchange.url.host_str().unwrap_or_default().to_owned(),
        url: exchange.url.to_string(),
        content_hash: hash_content(source),
        captured_at: Utc::now(),
    }
}

/// MD5 digest of a content body.
pub fn hash_content(content: &[u8]) -> ContentHash {
    let mut hasher = Md5::new();
    hasher.update(content);
    ContentHash::new(hasher.finalize().into())
}
