//! Configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::constants::{
    DEFAULT_CONTAINS_SCRIPT_CONTENT_TYPES, DEFAULT_QUEUE_CAPACITY, DEFAULT_SCRIPT_EXTENSIONS,
    DEFAULT_SCRIPT_MIME_TYPES, DEFAULT_STORAGE_PATH, DEFAULT_WORKER_POOL_SIZE,
};

/// Logging level for the library.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// Serde-serializable so the host tool can persist it in its own settings
/// store. All components receive this value (or the parts they need) at
/// construction time.
///
/// # Examples
///
/// ```no_run
/// use script_sift::SiftConfig;
/// use std::path::PathBuf;
///
/// let config = SiftConfig {
///     storage_path: PathBuf::from("/tmp/beautified"),
///     worker_pool_size: 8,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiftConfig {
    /// URL path extensions treated as JavaScript (case-insensitive match).
    pub script_extensions: Vec<String>,

    /// Substring tokens identifying a JavaScript MIME type.
    pub script_mime_types: Vec<String>,

    /// Content-type tokens for responses that may embed inline scripts.
    pub contains_script_content_types: Vec<String>,

    /// Whether to surface highlight hints in the process outcome.
    pub highlight_enabled: bool,

    /// Whether to compute the advisory debug header values.
    pub debug_headers_enabled: bool,

    /// Number of beautify worker threads.
    pub worker_pool_size: usize,

    /// Capacity of the bounded reformat queue.
    pub queue_capacity: usize,

    /// Directory that receives beautified files and the results journal.
    pub storage_path: PathBuf,
}

impl Default for SiftConfig {
    fn default() -> Self {
        SiftConfig {
            script_extensions: to_owned_vec(DEFAULT_SCRIPT_EXTENSIONS),
            script_mime_types: to_owned_vec(DEFAULT_SCRIPT_MIME_TYPES),
            contains_script_content_types: to_owned_vec(DEFAULT_CONTAINS_SCRIPT_CONTENT_TYPES),
            highlight_enabled: true,
            debug_headers_enabled: false,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

fn to_owned_vec(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
