//! The beautify engine.
//!
//! Wraps exactly one embedded QuickJS interpreter that evaluates the
//! bundled `beautify.js` resource at startup and then reformats JavaScript
//! sources on demand. The interpreter's evaluation context is not
//! reentrant, so all invocations are serialized on a single dedicated
//! engine thread; see [`engine::BeautifyEngine`].

mod engine;

pub use engine::BeautifyEngine;
