//! Command-level glue used by the binary.

pub mod check;
pub mod shutdown;

// Re-export public API
pub use check::{check_urls, write_histories};
pub use shutdown::cancel_on_signal;
