//! Document store interfaces and the in-memory implementation.

pub mod base;
pub mod memory;

pub use base::{StoreReader, StoreWriter};
pub use memory::MemoryStore;
