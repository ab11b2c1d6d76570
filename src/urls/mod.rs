//! URL normalization and deep-link rewriting.

mod market;
mod normalize;

pub use market::{fix_market_url, is_market_url};
pub use normalize::{normalize_url, prepare_url};
