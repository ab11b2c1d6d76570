//! Redirect chain resolution.
//!
//! Follows a chain hop by hop through a [`Fetcher`], recording how each hop
//! was discovered, and scans the last page reached for tracking counters.

use async_trait::async_trait;
use log::{debug, info};
use regex::RegexSet;
use serde::ser::{Serialize, Serializer};
use std::sync::{Arc, LazyLock};

use crate::config::TERMINAL_URL_PATTERNS;
use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::fetch::hop::{Fetcher, HopKind, HopOutcome};
use crate::parse::{get_counters, CounterSet};
use crate::urls::normalize_url;

static TERMINAL_URL_RE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(TERMINAL_URL_PATTERNS).unwrap_or_else(|e| {
        panic!(
            "Failed to compile terminal URL patterns: {}. This is a programming error.",
            e
        )
    })
});

/// The recorded redirect chain of one URL.
///
/// `history_urls` always has exactly one more entry than `history_types`:
/// element 0 is the (normalized) start URL and element `i + 1` is where hop
/// `i` led. Serializes as the 3-element array `[types, urls, counters]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirectHistory {
    pub history_types: Vec<HopKind>,
    pub history_urls: Vec<String>,
    pub counters: CounterSet,
}

impl RedirectHistory {
    fn starting_at(url: String) -> Self {
        RedirectHistory {
            history_types: Vec::new(),
            history_urls: vec![url],
            counters: CounterSet::new(),
        }
    }

    fn push(&mut self, kind: HopKind, url: String) {
        self.history_types.push(kind);
        self.history_urls.push(url);
    }

    /// True if the chain contains at least one real redirect.
    pub fn has_redirects(&self) -> bool {
        !self.history_types.is_empty()
    }

    /// True if the chain ended in a failed fetch.
    pub fn ended_in_error(&self) -> bool {
        self.history_types.last() == Some(&HopKind::Error)
    }

    /// The last URL reached.
    pub fn final_url(&self) -> &str {
        self.history_urls.last().map(String::as_str).unwrap_or("")
    }
}

impl Serialize for RedirectHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.history_types, &self.history_urls, &self.counters).serialize(serializer)
    }
}

/// Returns true if `url` is terminal by policy and must not be fetched.
pub fn is_terminal_url(url: &str) -> bool {
    TERMINAL_URL_RE.is_match(url)
}

/// Resolves a URL into its redirect history.
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> RedirectHistory;
}

/// Follows the redirect chain starting at `url`.
///
/// The start URL is normalized first (falling back to the raw input if its
/// host cannot be encoded). Empty URLs and URLs that are terminal by policy
/// are returned as a single-entry history without any network access.
///
/// At most `max_redirects` hops are recorded. Every hop target is recorded
/// as returned, including targets already visited. A failed fetch records the
/// requested URL with [`HopKind::Error`] and ends the chain. Counters come
/// from the body of the last successful fetch.
pub async fn get_redirect_history(
    fetcher: &dyn Fetcher,
    url: &str,
    max_redirects: usize,
    stats: Option<&ProcessingStats>,
) -> RedirectHistory {
    let start = match normalize_url(url) {
        Ok(normalized) => normalized,
        Err(e) => {
            log::warn!("{}; using URL as given", e);
            if let Some(stats) = stats {
                stats.increment_error(ErrorType::UrlEncoding);
            }
            url.to_string()
        }
    };

    let mut history = RedirectHistory::starting_at(start.clone());
    if start.is_empty() {
        return history;
    }
    if is_terminal_url(&start) {
        debug!("{} is terminal by policy, not fetching", start);
        if let Some(stats) = stats {
            stats.increment_info(InfoType::TerminalShortcut);
        }
        return history;
    }

    let mut current = start;
    let last_body = loop {
        let outcome = fetcher.fetch(&current).await;
        // Bound reached: the page at the last recorded URL still supplies counters.
        if history.history_types.len() >= max_redirects {
            break outcome.body().map(str::to_string);
        }
        match outcome {
            HopOutcome::Terminal { body } => break Some(body),
            HopOutcome::Redirect { target, kind, .. } => {
                debug!("{} hop {} -> {}", kind, current, target);
                history.push(kind, target.clone());
                current = target;
            }
            HopOutcome::Failed => {
                history.push(HopKind::Error, current.clone());
                break None;
            }
        }
    };

    if let Some(body) = last_body {
        history.counters = get_counters(&body);
    }
    info!(
        "Resolved {} in {} hop(s) to {}",
        history.history_urls[0],
        history.history_types.len(),
        history.final_url()
    );
    history
}

/// [`RedirectResolver`] that fetches through a [`Fetcher`].
pub struct HistoryResolver<F> {
    fetcher: F,
    max_redirects: usize,
    stats: Arc<ProcessingStats>,
}

impl<F: Fetcher> HistoryResolver<F> {
    pub fn new(fetcher: F, max_redirects: usize, stats: Arc<ProcessingStats>) -> Self {
        HistoryResolver {
            fetcher,
            max_redirects,
            stats,
        }
    }
}

#[async_trait]
impl<F: Fetcher> RedirectResolver for HistoryResolver<F> {
    async fn resolve(&self, url: &str) -> RedirectHistory {
        get_redirect_history(&self.fetcher, url, self.max_redirects, Some(&self.stats)).await
    }
}
