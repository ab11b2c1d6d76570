//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - The logger
//! - HTTP clients for redirect walking and the reachability probe

mod client;
mod logger;

// Re-export public API
pub use client::{init_probe_client, init_redirect_client};
pub use logger::init_logger_with;
