//! Record transformation and change-event engine for document stores.
//!
//! docsink turns batches of semi-structured records into write intents
//! against a document store: it renders the destination index name from a
//! template, extracts configured sub-fields from nested records, resolves a
//! stable document identity so repeated deliveries update rather than
//! duplicate, and optionally computes structural change events describing
//! what changed between the stored and incoming version of a document.
//!
//! Transport, bulk-write execution and index provisioning are the concern of
//! [`destination`] trait implementors; the engine itself only produces
//! [`types::WriteIntent`]s.

pub mod config;
pub mod destination;
pub mod diff;
pub mod error;
pub mod extract;
pub mod fields;
pub mod identity;
mod macros;
pub mod ops;
pub mod sink;
pub mod template;
pub mod types;
