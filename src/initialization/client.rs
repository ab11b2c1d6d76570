//! HTTP client initialization.

use std::sync::Arc;

use crate::config::Config;
use reqwest::ClientBuilder;

/// Initializes the client used to walk redirect chains.
///
/// Redirects are disabled so that every hop is seen and classified.
/// Certificate verification is off: a chain through a host with a broken
/// certificate is still a chain worth recording. The user agent is set per
/// request by the fetcher.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_redirect_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(config.fetch_timeout)
        .danger_accept_invalid_certs(true)
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the client used by the supervisor's reachability probe.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new().timeout(config.http_timeout).build()?;
    Ok(Arc::new(client))
}
