//! Error types and processing statistics.
//!
//! The error taxonomy follows the propagation policy of the pipeline:
//! only startup failures ([`InitializationError`]) may halt the system;
//! per-job engine failures ([`EngineError`]) are contained to the job that
//! raised them; per-request anomalies never surface as errors at all, they
//! degrade to neutral results inside the classifier/extractor.

mod stats;
mod types;

pub use stats::ProcessingStats;
pub use types::{EngineError, InitializationError, SiftEvent};
