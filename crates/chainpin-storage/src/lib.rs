//! chainpin-storage — durable checkpoint backends for ChainPin.
//!
//! Backends:
//! - [`file`] — a single plain-text file holding the height to resume from
//!
//! The in-memory store lives in `chainpin-core` next to the trait.

pub mod file;

pub use file::FileCheckpointStore;
