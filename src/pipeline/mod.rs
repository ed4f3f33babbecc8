//! Per-exchange processing pipeline.
//!
//! [`ScriptSift`] wires the components together: classification and
//! extraction run synchronously on whatever thread delivers the exchange
//! (they are fast, pure functions gating live traffic), while
//! beautification is handed to the dispatcher fire-and-forget. The caller
//! gets a [`ProcessOutcome`] describing what was detected and whether a
//! job was queued — never an error, and never a blocking wait.

use std::sync::Arc;

use crate::beautify::BeautifyEngine;
use crate::classify::classify;
use crate::config::constants::{
    BEAUTIFIED_FILE_EXTENSION, CONTAINS_SCRIPT_HEADER, IS_SCRIPT_HEADER, MAX_SOURCE_BYTES,
    MIME_TYPES_HEADER, RESULTS_JOURNAL_FILENAME,
};
use crate::config::SiftConfig;
use crate::dispatch::{DedupLedger, WorkDispatcher};
use crate::error_handling::{InitializationError, ProcessingStats, SiftEvent};
use crate::extract::extract_inline_scripts;
use crate::fingerprint::fingerprint_source;
use crate::models::{Classification, Exchange, ReformatJob};
use crate::sink::ResultSink;

/// Review-highlight hint for the host tool's proxy history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// The response is JavaScript.
    Cyan,
    /// The response contains inline JavaScript.
    Yellow,
}

/// Advisory header values computed for an exchange when debug headers are
/// enabled.
///
/// The core computes these but does not write them onto the wire; the
/// header-mutation collaborator applies them.
#[derive(Debug, Clone)]
pub struct AdvisoryHeaders {
    /// Whether the response was classified as a script.
    pub is_script: bool,
    /// Whether the response was classified as containing scripts.
    pub contains_script: bool,
    /// Observed MIME hints, formatted `"<inferred> -- <declared>"`.
    pub observed_mime_types: String,
}

impl AdvisoryHeaders {
    fn new(exchange: &Exchange, classification: Classification) -> Self {
        AdvisoryHeaders {
            is_script: classification == Classification::IsScript,
            contains_script: classification == Classification::ContainsScript,
            observed_mime_types: exchange.mime_summary(),
        }
    }

    /// Renders the advisory values as header name/value pairs.
    pub fn as_header_pairs(&self) -> Vec<(String, String)> {
        vec![
            (IS_SCRIPT_HEADER.to_owned(), self.is_script.to_string()),
            (
                CONTAINS_SCRIPT_HEADER.to_owned(),
                self.contains_script.to_string(),
            ),
            (
                MIME_TYPES_HEADER.to_owned(),
                self.observed_mime_types.clone(),
            ),
        ]
    }
}

/// What processing one exchange produced.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// How the response was classified.
    pub classification: Classification,
    /// Whether a reformat job was accepted onto the queue.
    pub submitted: bool,
    /// Whether the content was skipped as already-known duplicate work.
    pub duplicate: bool,
    /// Highlight hint, when highlighting is enabled and something matched.
    pub highlight: Option<Highlight>,
    /// Advisory header values, when debug headers are enabled.
    pub advisory_headers: Option<AdvisoryHeaders>,
}

impl ProcessOutcome {
    fn new(classification: Classification) -> Self {
        ProcessOutcome {
            classification,
            submitted: false,
            duplicate: false,
            highlight: None,
            advisory_headers: None,
        }
    }
}

/// The JavaScript discovery and beautification pipeline.
///
/// Construct once with a [`SiftConfig`], call
/// [`process_exchange`](Self::process_exchange) for every intercepted
/// exchange, and [`shutdown`](Self::shutdown) when the host tool unloads.
///
/// # Example
///
/// ```no_run
/// use script_sift::{Exchange, ScriptSift, SiftConfig};
/// use url::Url;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sift = ScriptSift::new(SiftConfig::default())?;
/// let exchange = Exchange {
///     url: Url::parse("https://example.net/app.js")?,
///     headers: vec![("Content-Type".into(), "application/javascript".into())],
///     body: b"var a=1;".to_vec(),
///     declared_mime: Some("script".into()),
///     inferred_mime: None,
/// };
/// let outcome = sift.process_exchange(&exchange);
/// assert!(outcome.classification.is_script_bearing());
/// sift.shutdown();
/// # Ok(())
/// # }
/// ```
pub struct ScriptSift {
    config: SiftConfig,
    engine: Arc<BeautifyEngine>,
    ledger: Arc<DedupLedger>,
    sink: Arc<ResultSink>,
    stats: Arc<ProcessingStats>,
    dispatcher: WorkDispatcher,
}

impl ScriptSift {
    /// Builds the pipeline: storage directory, engine, worker pool.
    ///
    /// # Errors
    ///
    /// Fails fast if the storage directory or results journal cannot be
    /// created, the embedded beautify routine does not load, or the worker
    /// pool cannot be spawned. None of these are retried per request.
    pub fn new(config: SiftConfig) -> Result<Self, InitializationError> {
        std::fs::create_dir_all(&config.storage_path).map_err(|e| {
            InitializationError::StorageSetupError(format!(
                "failed to create {}: {e}",
                config.storage_path.display()
            ))
        })?;

        let engine = Arc::new(BeautifyEngine::initialize()?);

        let journal_path = config.storage_path.join(RESULTS_JOURNAL_FILENAME);
        let sink = Arc::new(ResultSink::with_journal(&journal_path).map_err(|e| {
            InitializationError::StorageSetupError(format!(
                "failed to open {}: {e}",
                journal_path.display()
            ))
        })?);

        let ledger = Arc::new(DedupLedger::new());
        let stats = Arc::new(ProcessingStats::new());

        let dispatcher = WorkDispatcher::new(
            config.worker_pool_size,
            config.queue_capacity,
            Arc::clone(&engine),
            Arc::clone(&ledger),
            Arc::clone(&sink),
            Arc::clone(&stats),
        )
        .map_err(|e| InitializationError::WorkerSpawnError(e.to_string()))?;

        log::debug!(
            "Script sift ready: {} workers, storage at {}",
            config.worker_pool_size,
            config.storage_path.display()
        );

        Ok(ScriptSift {
            config,
            engine,
            ledger,
            sink,
            stats,
            dispatcher,
        })
    }

    /// Processes one intercepted exchange.
    ///
    /// Classification, extraction and fingerprinting happen inline;
    /// reformatting, if any, is queued fire-and-forget. This never blocks
    /// on the reformatting backlog and never returns an error — per-request
    /// anomalies degrade to a neutral outcome.
    pub fn process_exchange(&self, exchange: &Exchange) -> ProcessOutcome {
        let classification = classify(exchange, &self.config);
        let mut outcome = ProcessOutcome::new(classification);

        if self.config.debug_headers_enabled {
            outcome.advisory_headers = Some(AdvisoryHeaders::new(exchange, classification));
        }

        let source = match classification {
            Classification::IsScript => {
                self.stats.increment(SiftEvent::ScriptResponse);
                if self.config.highlight_enabled {
                    outcome.highlight = Some(Highlight::Cyan);
                }
                if exchange.body.is_empty() {
                    log::debug!("Empty script response for {}; nothing to queue", exchange.url);
                    return outcome;
                }
                String::from_utf8_lossy(&exchange.body).into_owned()
            }
            Classification::ContainsScript => {
                self.stats.increment(SiftEvent::ContainsScriptResponse);
                if self.config.highlight_enabled {
                    outcome.highlight = Some(Highlight::Yellow);
                }
                extract_inline_scripts(&exchange.body)
            }
            Classification::Neither => return outcome,
        };

        if source.trim().is_empty() {
            self.stats.increment(SiftEvent::EmptyScriptSource);
            log::debug!("No inline JavaScript found in {}", exchange.url);
            return outcome;
        }
        if source.len() > MAX_SOURCE_BYTES {
            self.stats.increment(SiftEvent::OversizedSource);
            log::warn!(
                "Script source from {} is {} bytes (limit {MAX_SOURCE_BYTES}); skipping",
                exchange.url,
                source.len()
            );
            return outcome;
        }

        let fingerprint = fingerprint_source(exchange, source.as_bytes());
        let hash = fingerprint.content_hash;

        // Cheap pre-submit check; the worker-side claim stays authoritative.
        if self.ledger.state(&hash).is_some() {
            outcome.duplicate = true;
            self.stats.increment(SiftEvent::DuplicateContent);
            log::debug!(
                "Content {hash} from {} already processed; skipping submission",
                exchange.url
            );
            return outcome;
        }

        let destination = self
            .config
            .storage_path
            .join(format!("{}.{BEAUTIFIED_FILE_EXTENSION}", hash.to_hex()));
        let job = ReformatJob {
            source,
            fingerprint,
            destination,
        };

        outcome.submitted = self.dispatcher.submit(job);
        if outcome.submitted {
            self.stats.increment(SiftEvent::JobSubmitted);
        }
        outcome
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    /// Processing statistics, shared with the worker pool.
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// The result stream for the display collaborator.
    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// The dedup ledger.
    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    /// The beautify engine handle (exposes the invocation counter).
    pub fn engine(&self) -> &BeautifyEngine {
        &self.engine
    }

    /// Drains the reformat queue, stops the workers and the engine, and
    /// logs a processing summary.
    pub fn shutdown(&mut self) {
        self.dispatcher.shutdown();
        if let Some(engine) = Arc::get_mut(&mut self.engine) {
            engine.shutdown();
        }
        self.stats.log_summary();
    }
}
