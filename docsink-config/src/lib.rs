//! Shared configuration types for the docsink document-store sink.
//!
//! All types deserialize from the sink's startup configuration and expose a
//! `validate` method that is expected to be called once before any batch is
//! processed. Validation failures are reported through [`ValidationError`].

mod diff;
mod sink;
mod validation;

pub use diff::{DiffConfig, StreamDiffConfig};
pub use sink::{FieldMappings, SinkConfig};
pub use validation::ValidationError;
