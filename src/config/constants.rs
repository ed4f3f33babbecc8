//! Configuration constants.
//!
//! Defaults for the recognized options plus operational limits and the
//! advisory header names.

/// URL path extensions that classify a response as JavaScript outright.
/// Matched case-insensitively against the final path segment's extension.
pub const DEFAULT_SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "jsx"];

/// Substring tokens that identify a JavaScript MIME type.
///
/// Substring matching (not equality) because real `Content-Type` values
/// carry parameters after the type token, e.g.
/// `application/javascript; charset=utf-8`. `script` also covers the
/// interception framework's own stated-MIME vocabulary.
pub const DEFAULT_SCRIPT_MIME_TYPES: &[&str] = &["javascript", "ecmascript", "jscript", "script"];

/// Content types that may embed inline `<script>` blocks.
pub const DEFAULT_CONTAINS_SCRIPT_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml"];

/// Number of beautify worker threads.
pub const DEFAULT_WORKER_POOL_SIZE: usize = 4;

/// Capacity of the bounded reformat queue. A full queue drops new jobs
/// rather than blocking the traffic-processing path.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default directory for beautified output and the results journal.
pub const DEFAULT_STORAGE_PATH: &str = "./beautified";

/// File name of the append-only result journal inside the storage path.
pub const RESULTS_JOURNAL_FILENAME: &str = "results.jsonl";

/// Extension given to beautified output files.
pub const BEAUTIFIED_FILE_EXTENSION: &str = "js";

/// Global symbol the bundled beautify routine must expose.
pub const BEAUTIFY_SYMBOL: &str = "beautify";

/// Maximum script source size in bytes (2MB). Larger sources are skipped
/// to keep the engine thread from being monopolized by one pathological
/// response.
pub const MAX_SOURCE_BYTES: usize = 2 * 1024 * 1024;

/// Memory limit for the embedded QuickJS runtime (32MB).
pub const ENGINE_MEMORY_LIMIT: usize = 32 * 1024 * 1024;

// Header names used for traffic inspection and the advisory debug headers.

/// Response header consulted for MIME classification.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Advisory header: the response was classified as a script.
pub const IS_SCRIPT_HEADER: &str = "Is-Script";

/// Advisory header: the response was classified as containing scripts.
pub const CONTAINS_SCRIPT_HEADER: &str = "Contains-Script";

/// Advisory header: the observed MIME hints, `"<inferred> -- <declared>"`.
pub const MIME_TYPES_HEADER: &str = "MIMETYPEs";
