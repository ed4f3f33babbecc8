//! Library configuration.
//!
//! This module provides:
//! - Configuration constants (defaults, limits, header names)
//! - The [`SiftConfig`] value passed to every component at construction
//! - Logging option types
//!
//! There is no ambient global configuration: the host tool builds a
//! `SiftConfig` (or deserializes a persisted one) and hands it to
//! [`crate::ScriptSift::new`].

pub mod constants;
mod types;

pub use constants::*;
pub use types::{LogFormat, LogLevel, SiftConfig};
