//! Configuration objects for the sink.
//!
//! This module contains re-exported configurations that are needed by docsink.

// Re-exports.
pub use docsink_config::*;
