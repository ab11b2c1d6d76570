//! Single HTTP request execution.
//!
//! Exactly one request is sent per call; redirects are never followed by the
//! client. A redirect response is reported through [`RawResponse::redirect_url`]
//! so the caller can decide what to do with it.

use log::debug;
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::Url;
use std::time::Duration;

use crate::error_handling::FetchError;

/// What the transport saw for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Status code of the response.
    pub status: u16,
    /// Absolute redirect target, present only for 3xx responses carrying a
    /// usable `Location` header.
    pub redirect_url: Option<String>,
    /// Response body decoded as text. Empty bodies are kept as `""`.
    pub body: String,
}

/// Sends a single GET to `url` and reads the whole body.
///
/// The client must have redirects disabled. `timeout` bounds the whole request
/// including the body read; `user_agent`, when given, replaces the client's
/// default `User-Agent` header.
///
/// # Errors
///
/// Returns [`FetchError::Request`] when the request cannot be built or sent,
/// and [`FetchError::Body`] when the body cannot be read.
pub async fn make_request(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<RawResponse, FetchError> {
    let mut builder = client.get(url).timeout(timeout);
    if let Some(agent) = user_agent {
        builder = builder.header(USER_AGENT, agent);
    }

    let response = builder.send().await.map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    let redirect_url = if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok());
        match location {
            Some(location) => resolve_location(response.url(), location),
            None => {
                log::warn!(
                    "Redirect status {} for {} but no Location header",
                    status.as_u16(),
                    url
                );
                None
            }
        }
    } else {
        None
    };

    let body = response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;

    debug!(
        "GET {} -> {} ({} bytes, redirect: {:?})",
        url,
        status.as_u16(),
        body.len(),
        redirect_url
    );

    Ok(RawResponse {
        status: status.as_u16(),
        redirect_url,
        body,
    })
}

/// Resolves a `Location` header value against the URL that produced it.
///
/// Absolute locations are taken verbatim so that non-HTTP deep links such as
/// `market://` survive untouched.
fn resolve_location(base: &Url, location: &str) -> Option<String> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }
    if Url::parse(location).is_ok() {
        return Some(location.to_string());
    }
    match base.join(location) {
        Ok(joined) => Some(joined.to_string()),
        Err(e) => {
            log::warn!("Cannot resolve Location '{}' against {}: {}", location, base, e);
            None
        }
    }
}
