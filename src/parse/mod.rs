//! HTML content inspection.
//!
//! This module extracts the two things the resolver needs from a fetched page:
//! - A meta-refresh redirect target
//! - The set of tracking counters embedded in the page
//!
//! Meta tags are located using CSS selectors via the `scraper` crate; counters
//! are matched with a precompiled `RegexSet`.

mod counters;
mod meta;

// Re-export public API
pub use counters::{get_counters, Counter, CounterSet};
pub use meta::check_for_meta;

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
