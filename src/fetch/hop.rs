//! Single-hop fetching.
//!
//! One call to [`Fetcher::fetch`] issues at most one request and reports
//! whether the page redirects somewhere, and how.

use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::config::SOFT_TERMINAL_PATTERN;
use crate::error_handling::{InfoType, ProcessingStats};
use crate::fetch::request::make_request;
use crate::parse::check_for_meta;
use crate::urls::{fix_market_url, is_market_url, prepare_url};

/// Transport redirects into this area are followed by the browser through an
/// interstitial page, so they are not counted as redirects.
static SOFT_TERMINAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SOFT_TERMINAL_PATTERN).unwrap_or_else(|e| {
        panic!(
            "Failed to compile soft-terminal pattern: {}. This is a programming error.",
            e
        )
    })
});

/// How a hop was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HopKind {
    /// A 3xx response with a `Location` header.
    #[serde(rename = "http_status")]
    HttpStatus,
    /// A `<meta http-equiv="refresh">` tag in the page body.
    #[serde(rename = "meta_tag")]
    MetaTag,
    /// The fetch failed; always the last recorded hop.
    #[serde(rename = "ERROR")]
    Error,
}

impl HopKind {
    /// Wire name used in result envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            HopKind::HttpStatus => "http_status",
            HopKind::MetaTag => "meta_tag",
            HopKind::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for HopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of fetching a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopOutcome {
    /// The page does not redirect anywhere.
    Terminal { body: String },
    /// The page redirects to `target`.
    Redirect {
        target: String,
        kind: HopKind,
        body: String,
    },
    /// The request failed. The resolver records the requested URL with
    /// [`HopKind::Error`] and stops.
    Failed,
}

impl HopOutcome {
    /// Body of the fetched page, if one was read.
    pub fn body(&self) -> Option<&str> {
        match self {
            HopOutcome::Terminal { body } | HopOutcome::Redirect { body, .. } => Some(body),
            HopOutcome::Failed => None,
        }
    }
}

/// Fetches one URL and classifies the outcome.
///
/// Implementations never return an error: transport failures surface as
/// [`HopOutcome::Failed`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> HopOutcome;
}

/// Returns true if a transport redirect to `url` should be treated as terminal.
pub fn is_soft_terminal(url: &str) -> bool {
    SOFT_TERMINAL_RE.is_match(url)
}

/// Rewrites `market://` links onto the store web URL, then normalizes.
fn rewrite_target(target: &str, stats: Option<&ProcessingStats>) -> String {
    let target = if is_market_url(target) {
        if let Some(stats) = stats {
            stats.increment_info(InfoType::MarketRewrite);
        }
        fix_market_url(target)
    } else {
        target.to_string()
    };
    prepare_url(Some(&target)).unwrap_or(target)
}

/// Classifies a completed response.
///
/// A transport redirect wins over a meta refresh unless its target is
/// soft-terminal, in which case the body is scanned like any other page.
/// Targets of both kinds have `market://` links rewritten and are normalized.
pub fn classify_response(
    url: &str,
    redirect_url: Option<&str>,
    body: String,
    stats: Option<&ProcessingStats>,
) -> HopOutcome {
    if let Some(target) = redirect_url.filter(|target| !is_soft_terminal(target)) {
        if let Some(stats) = stats {
            stats.increment_info(InfoType::HttpRedirect);
        }
        return HopOutcome::Redirect {
            target: rewrite_target(target, stats),
            kind: HopKind::HttpStatus,
            body,
        };
    }

    if let Some(target) = redirect_url {
        debug!("Redirect from {} to {} treated as terminal", url, target);
    }

    match check_for_meta(&body, url) {
        Some(target) => {
            if let Some(stats) = stats {
                stats.increment_info(InfoType::MetaRedirect);
            }
            HopOutcome::Redirect {
                target: rewrite_target(&target, stats),
                kind: HopKind::MetaTag,
                body,
            }
        }
        None => HopOutcome::Terminal { body },
    }
}

/// [`Fetcher`] backed by a `reqwest` client with redirects disabled.
pub struct HttpFetcher {
    client: Arc<reqwest::Client>,
    timeout: Duration,
    user_agent: Option<String>,
    stats: Arc<ProcessingStats>,
}

impl HttpFetcher {
    pub fn new(
        client: Arc<reqwest::Client>,
        timeout: Duration,
        user_agent: Option<String>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        HttpFetcher {
            client,
            timeout,
            user_agent,
            stats,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> HopOutcome {
        match make_request(&self.client, url, self.timeout, self.user_agent.as_deref()).await {
            Ok(response) => classify_response(
                url,
                response.redirect_url.as_deref(),
                response.body,
                Some(&self.stats),
            ),
            Err(e) => {
                warn!("{}", e);
                self.stats.increment_error(e.error_type());
                HopOutcome::Failed
            }
        }
    }
}
