//! Library initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logging (plain or JSON formats)
//!
//! All initialization functions return proper error types for error handling.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
