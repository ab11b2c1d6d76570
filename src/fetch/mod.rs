//! Redirect chain fetching.
//!
//! This module provides:
//! - Single-request execution with redirects disabled (`request`)
//! - Single-hop classification into transport redirect, meta refresh,
//!   terminal page or failure (`hop`)
//! - Chain resolution with a hop bound and counter detection (`redirects`)

mod hop;
mod redirects;
mod request;

// Re-export public API
pub use hop::{classify_response, is_soft_terminal, Fetcher, HopKind, HopOutcome, HttpFetcher};
pub use redirects::{
    get_redirect_history, is_terminal_url, HistoryResolver, RedirectHistory, RedirectResolver,
};
pub use request::{make_request, RawResponse};
