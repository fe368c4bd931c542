//! chainpin-core — scan batcher inbox transactions and pin the CIDs they carry.
//!
//! # Architecture
//!
//! ```text
//! Scanner (state machine)
//!     ├── BlockSource        (ledger collaborator: blocks by number)
//!     ├── validator          (inbox recipient + recovered batcher sender + 0xFC tag)
//!     ├── ContentReference   (multibase string + structured CID → /ipfs/<cid>)
//!     ├── PinRequester       (bounded call into a PinClient)
//!     └── CheckpointManager  (resume height, best-effort persistence)
//! ```

pub mod builder;
pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod pin;
pub mod scanner;
pub mod source;
pub mod types;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_utils;

pub use builder::ScannerBuilder;
pub use checkpoint::{CheckpointManager, CheckpointStore, MemoryCheckpointStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ScannerConfig;
pub use content::ContentReference;
pub use error::{CheckpointError, ContentError, ScanError};
pub use pin::{PinClient, PinRequester};
pub use scanner::{RestartCause, ScanState, ScanStats, Scanner};
pub use source::BlockSource;
pub use types::{BatcherConfig, Block};
pub use validator::{validate, Validation, BATCH_TAG};
