//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, URL tables)
//! - The immutable runtime [`Config`]
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

pub use cli::{Command, ConfigArgs, Opt};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
