//! Error and event type definitions.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
///
/// Any of these means the library must refuse to become ready; none of them
/// is retried per request.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error creating the storage directory or the results journal.
    #[error("Storage setup error: {0}")]
    StorageSetupError(String),

    /// The embedded beautify engine failed to start.
    #[error("Beautify engine initialization error: {0}")]
    EngineError(#[from] EngineError),

    /// A beautify worker thread could not be spawned.
    #[error("Worker pool initialization error: {0}")]
    WorkerSpawnError(String),
}

/// Error types for the embedded beautify engine.
///
/// Startup variants (`RuntimeCreation` through `SymbolNotCallable`) are
/// fatal and surface through [`InitializationError`]; the rest are per-job
/// and are contained by the dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The QuickJS runtime could not be created.
    #[error("Failed to create QuickJS runtime: {0}")]
    RuntimeCreation(String),

    /// The QuickJS context could not be created.
    #[error("Failed to create QuickJS context: {0}")]
    ContextCreation(String),

    /// The bundled beautify routine failed to evaluate.
    #[error("Bundled beautify routine failed to evaluate: {0}")]
    ResourceEval(String),

    /// The routine loaded but does not expose a callable `beautify`.
    #[error("`beautify` is undefined or not a function")]
    SymbolNotCallable,

    /// The routine threw while beautifying a source.
    #[error("Beautify invocation failed: {0}")]
    Invocation(String),

    /// The routine returned something other than a string.
    #[error("Beautify returned a non-string value")]
    NonStringResult,

    /// The engine thread is no longer running.
    #[error("Beautify engine is not running")]
    EngineStopped,
}

/// Notable events counted during traffic processing.
///
/// These are operational metrics, not errors: they let an operator see what
/// the add-on has been doing (and dropping) without trawling logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum SiftEvent {
    /// A response was classified as JavaScript.
    ScriptResponse,
    /// A response was classified as possibly containing JavaScript.
    ContainsScriptResponse,
    /// A script-bearing response yielded no usable source text.
    EmptyScriptSource,
    /// A source exceeded the size limit and was skipped.
    OversizedSource,
    /// Content was seen again and skipped as duplicate work.
    DuplicateContent,
    /// A reformat job was accepted onto the queue.
    JobSubmitted,
    /// A reformat job was dropped because the queue was full.
    JobDropped,
    /// A reformat job completed and its output was written.
    JobCompleted,
    /// The engine failed (or produced nothing) for a job.
    BeautifyFailed,
    /// Beautified output could not be written to disk.
    OutputWriteFailed,
}

impl SiftEvent {
    /// Human-readable label used in the statistics summary.
    pub fn description(&self) -> &'static str {
        match self {
            SiftEvent::ScriptResponse => "script responses",
            SiftEvent::ContainsScriptResponse => "contains-script responses",
            SiftEvent::EmptyScriptSource => "responses without usable script source",
            SiftEvent::OversizedSource => "oversized sources skipped",
            SiftEvent::DuplicateContent => "duplicate content skipped",
            SiftEvent::JobSubmitted => "jobs submitted",
            SiftEvent::JobDropped => "jobs dropped (queue full)",
            SiftEvent::JobCompleted => "jobs completed",
            SiftEvent::BeautifyFailed => "beautify failures",
            SiftEvent::OutputWriteFailed => "output write failures",
        }
    }
}
