//! Common types used throughout the sink.

mod document;
mod intent;

pub use document::*;
pub use intent::*;
