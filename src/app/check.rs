//! One-shot resolution for operators.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::fetch::{HistoryResolver, HttpFetcher, RedirectHistory, RedirectResolver};
use crate::initialization::init_redirect_client;

#[derive(Serialize)]
struct CheckLine<'a> {
    url: &'a str,
    result: &'a RedirectHistory,
}

/// Resolves each URL in turn and writes one JSON object per line to `out`.
pub async fn write_histories<W: Write>(
    resolver: &dyn RedirectResolver,
    urls: &[String],
    out: &mut W,
) -> Result<()> {
    for url in urls {
        let history = resolver.resolve(url).await;
        let line = serde_json::to_string(&CheckLine {
            url,
            result: &history,
        })?;
        writeln!(out, "{}", line).context("Failed to write result")?;
    }
    Ok(())
}

/// Resolves `urls` with the configured fetch settings and prints the
/// histories to stdout.
pub async fn check_urls(config: &Config, urls: &[String]) -> Result<()> {
    let stats = Arc::new(ProcessingStats::new());
    let client = init_redirect_client(config).context("Failed to initialize HTTP client")?;
    let fetcher = HttpFetcher::new(
        client,
        config.fetch_timeout,
        config.user_agent.clone(),
        Arc::clone(&stats),
    );
    let resolver = HistoryResolver::new(fetcher, config.max_redirects, Arc::clone(&stats));

    let mut out = std::io::stdout();
    write_histories(&resolver, urls, &mut out).await?;
    out.flush().context("Failed to flush stdout")?;

    if stats.total_errors() > 0 {
        log::info!("Errors while checking:");
        stats.log_summary();
    }
    Ok(())
}
