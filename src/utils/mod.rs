//! Small shared helpers.
//!
//! This module provides:
//! - CSS selector parsing with a non-panicking fallback
//! - Pidfile creation

mod pidfile;
mod selector;

pub use pidfile::create_pidfile;
pub use selector::parse_selector_with_fallback;
