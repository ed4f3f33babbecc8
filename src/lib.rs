//! script_sift library: JavaScript discovery and beautification for
//! intercepted HTTP traffic
//!
//! This library watches HTTP exchanges flowing through a proxy-style host
//! tool, detects responses that are (or contain) JavaScript, extracts the
//! script source, and asynchronously reformats each distinct script exactly
//! once into a human-readable file on disk. The host feeds every exchange
//! to [`ScriptSift::process_exchange`] and reads back findings from the
//! result sink.
//!
//! # Example
//!
//! ```no_run
//! use script_sift::{Exchange, ScriptSift, SiftConfig};
//! use url::Url;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SiftConfig {
//!     storage_path: std::path::PathBuf::from("./beautified"),
//!     ..Default::default()
//! };
//! let mut sift = ScriptSift::new(config)?;
//!
//! let exchange = Exchange {
//!     url: Url::parse("https://example.net/bundle.js")?,
//!     headers: vec![("Content-Type".into(), "application/javascript".into())],
//!     body: b"var a=1;if(a){a=2;}".to_vec(),
//!     declared_mime: Some("script".into()),
//!     inferred_mime: None,
//! };
//! let outcome = sift.process_exchange(&exchange);
//! println!("classified {:?}, queued: {}", outcome.classification, outcome.submitted);
//!
//! sift.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! `process_exchange` is safe to call from any number of traffic threads
//! concurrently; it never blocks on the reformatting backlog. Beautification
//! runs on an internal worker pool and is serialized through a single
//! embedded interpreter.

#![warn(missing_docs)]

mod beautify;
mod classify;
pub mod config;
mod dispatch;
mod error_handling;
mod extract;
mod fingerprint;
pub mod initialization;
mod models;
mod pipeline;
mod sink;

// Re-export public API
pub use beautify::BeautifyEngine;
pub use classify::classify;
pub use config::{LogFormat, LogLevel, SiftConfig};
pub use dispatch::{Claim, DedupLedger, LedgerState, WorkDispatcher};
pub use error_handling::{EngineError, InitializationError, ProcessingStats, SiftEvent};
pub use extract::extract_inline_scripts;
pub use fingerprint::{fingerprint_source, hash_content};
pub use models::{
    Classification, ContentHash, Exchange, Fingerprint, RecordStatus, ReformatJob, ResultRecord,
};
pub use pipeline::{AdvisoryHeaders, Highlight, ProcessOutcome, ScriptSift};
pub use sink::ResultSink;
