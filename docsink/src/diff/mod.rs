//! Structural diffing and change-event generation.
//!
//! Turns "incoming record" plus "stored prior document" into a change-event
//! document describing the field-level difference, and fans that computation
//! out over a batch with bounded concurrency.

mod coordinator;
mod engine;
mod event;

pub use coordinator::run_change_events;
pub use engine::{DocumentDiff, diff_documents};
pub use event::{DEFAULT_IGNORED_FIELDS, build_change_event, compile_ignore_patterns};
