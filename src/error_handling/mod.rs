//! Error handling and processing statistics.
//!
//! This module provides:
//! - Classified error types (network, encoding, queue, initialization)
//! - Processing statistics tracking (errors and info metrics)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{EncodingError, ErrorType, FetchError, InfoType, InitializationError, QueueError};
