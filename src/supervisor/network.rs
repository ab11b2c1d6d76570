//! Network reachability probe.

use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use std::time::Duration;

/// Answers whether the outside network is usable right now.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Requests `url` once and reports whether a successful response came back.
///
/// Any failure counts as unreachable: an invalid URL, a connection error, a
/// timeout, or an error status.
pub async fn check_network_status(client: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .and_then(|response| response.error_for_status());
    match response {
        Ok(_) => true,
        Err(e) => {
            warn!("Network check against {} failed: {}", url, e);
            false
        }
    }
}

/// [`NetworkProbe`] that requests a fixed URL.
pub struct HttpNetworkProbe {
    client: Arc<reqwest::Client>,
    url: String,
    timeout: Duration,
}

impl HttpNetworkProbe {
    pub fn new(client: Arc<reqwest::Client>, url: impl Into<String>, timeout: Duration) -> Self {
        HttpNetworkProbe {
            client,
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl NetworkProbe for HttpNetworkProbe {
    async fn is_reachable(&self) -> bool {
        check_network_status(&self.client, &self.url, self.timeout).await
    }
}
