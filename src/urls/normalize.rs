//! URL normalization.
//!
//! Splits a URL into scheme, netloc, path, params, query and fragment (params
//! being the text after the last `;` of the final path segment), encodes the
//! host for the network and percent-encodes unsafe characters in the path and
//! params. Query and fragment are passed through untouched.

use std::fmt::Write;

use log::warn;

use crate::error_handling::EncodingError;

/// Characters (besides ASCII alphanumerics) left as-is in path and params.
/// `%` and `+` are included so that normalizing twice changes nothing.
const SAFE_PATH_CHARS: &[u8] = b"/_.-~%:@!$&'()*+,;=";

/// Longest DNS label accepted by the host encoder.
const MAX_LABEL_LEN: usize = 63;

/// A URL split into its six components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct UrlParts<'a> {
    scheme: Option<&'a str>,
    netloc: Option<&'a str>,
    path: &'a str,
    params: Option<&'a str>,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn split_url(url: &str) -> UrlParts<'_> {
    let mut parts = UrlParts::default();
    let mut rest = url;

    if let Some((scheme, after)) = rest.split_once(':') {
        if is_scheme(scheme) {
            parts.scheme = Some(scheme);
            rest = after;
        }
    }

    if let Some(after_slashes) = rest.strip_prefix("//") {
        let end = after_slashes
            .find(['/', '?', '#'])
            .unwrap_or(after_slashes.len());
        parts.netloc = Some(&after_slashes[..end]);
        rest = &after_slashes[end..];
    }

    if let Some((before, fragment)) = rest.split_once('#') {
        parts.fragment = Some(fragment);
        rest = before;
    }
    if let Some((before, query)) = rest.split_once('?') {
        parts.query = Some(query);
        rest = before;
    }

    let last_segment_start = rest.rfind('/').unwrap_or(0);
    match rest[last_segment_start..].find(';') {
        Some(offset) => {
            let split_at = last_segment_start + offset;
            parts.path = &rest[..split_at];
            parts.params = Some(&rest[split_at + 1..]);
        }
        None => parts.path = rest,
    }

    parts
}

fn quote(input: &str, space_as_plus: bool) -> String {
    let mut quoted = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte == b' ' && space_as_plus {
            quoted.push('+');
        } else if byte.is_ascii_alphanumeric() || SAFE_PATH_CHARS.contains(&byte) {
            quoted.push(byte as char);
        } else {
            // Writing to a String cannot fail
            let _ = write!(quoted, "%{:02X}", byte);
        }
    }
    quoted
}

fn encode_label(label: &str) -> Option<String> {
    let encoded = if label.is_ascii() {
        label.to_string()
    } else {
        url::quirks::domain_to_ascii(label)
    };
    (!encoded.is_empty() && encoded.len() <= MAX_LABEL_LEN).then_some(encoded)
}

/// IDNA-encodes the host part of a netloc, keeping userinfo and port intact.
fn encode_netloc(netloc: &str, url: &str) -> Result<String, EncodingError> {
    let (userinfo, host_port) = match netloc.rsplit_once('@') {
        Some((userinfo, host_port)) => (Some(userinfo), host_port),
        None => (None, netloc),
    };

    // Bracketed IPv6 literals and empty hosts need no encoding
    if host_port.is_empty() || host_port.starts_with('[') {
        return Ok(netloc.to_string());
    }

    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => (host, Some(port)),
        _ => (host_port, None),
    };

    let encoding_error = || EncodingError {
        url: url.to_string(),
        host: host.to_string(),
    };

    let labels = host.strip_suffix('.').unwrap_or(host);
    let mut encoded_labels = Vec::new();
    for label in labels.split('.') {
        encoded_labels.push(encode_label(label).ok_or_else(encoding_error)?);
    }

    let mut encoded = String::with_capacity(netloc.len());
    if let Some(userinfo) = userinfo {
        encoded.push_str(userinfo);
        encoded.push('@');
    }
    encoded.push_str(&encoded_labels.join("."));
    if host.ends_with('.') {
        encoded.push('.');
    }
    if let Some(port) = port {
        encoded.push(':');
        encoded.push_str(port);
    }
    Ok(encoded)
}

/// Normalizes a URL for fetching.
///
/// Spaces in the path become `%20`, spaces in the params become `+`, other
/// unsafe bytes are percent-encoded. Applying it twice yields the same result.
///
/// # Errors
///
/// Returns `EncodingError` when the host cannot be encoded (for example a host
/// with an empty label such as `.netloc`).
pub fn normalize_url(url: &str) -> Result<String, EncodingError> {
    let parts = split_url(url);

    let mut normalized = String::with_capacity(url.len() + 8);
    if let Some(scheme) = parts.scheme {
        normalized.push_str(&scheme.to_ascii_lowercase());
        normalized.push(':');
    }
    if let Some(netloc) = parts.netloc {
        normalized.push_str("//");
        normalized.push_str(&encode_netloc(netloc, url)?);
    }
    normalized.push_str(&quote(parts.path, false));
    if let Some(params) = parts.params {
        normalized.push(';');
        normalized.push_str(&quote(params, true));
    }
    if let Some(query) = parts.query.filter(|q| !q.is_empty()) {
        normalized.push('?');
        normalized.push_str(query);
    }
    if let Some(fragment) = parts.fragment.filter(|f| !f.is_empty()) {
        normalized.push('#');
        normalized.push_str(fragment);
    }
    Ok(normalized)
}

/// Normalizes an optional URL, never failing.
///
/// Absent input passes through. A URL whose host cannot be encoded is logged
/// and returned unchanged so that the resolver can still attempt it.
pub fn prepare_url(url: Option<&str>) -> Option<String> {
    let url = url?;
    match normalize_url(url) {
        Ok(normalized) => Some(normalized),
        Err(e) => {
            warn!("{e}; using URL as given");
            Some(url.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_components() {
        let parts = split_url("http://netloc/a/path;params?query=argument#fragment");
        assert_eq!(parts.scheme, Some("http"));
        assert_eq!(parts.netloc, Some("netloc"));
        assert_eq!(parts.path, "/a/path");
        assert_eq!(parts.params, Some("params"));
        assert_eq!(parts.query, Some("query=argument"));
        assert_eq!(parts.fragment, Some("fragment"));
    }

    #[test]
    fn test_split_url_params_only_in_last_segment() {
        let parts = split_url("http://netloc/a;b/c");
        assert_eq!(parts.path, "/a;b/c");
        assert_eq!(parts.params, None);
    }

    #[test]
    fn test_normalize_url_unchanged() {
        let url = "http://netloc/path;parameters?query=argument#fragment";
        assert_eq!(normalize_url(url).unwrap(), url);
    }

    #[test]
    fn test_normalize_url_params_spaces_become_plus() {
        assert_eq!(
            normalize_url("http://netloc/path;qs quote plus?query=argument#fragment").unwrap(),
            "http://netloc/path;qs+quote+plus?query=argument#fragment"
        );
    }

    #[test]
    fn test_normalize_url_path_spaces_become_percent20() {
        assert_eq!(
            normalize_url("http://netloc/ p a t h ;parameters?query=argument#fragment").unwrap(),
            "http://netloc/%20p%20a%20t%20h%20;parameters?query=argument#fragment"
        );
    }

    #[test]
    fn test_normalize_url_leaves_query_alone() {
        assert_eq!(
            normalize_url("http://netloc/p?q=a b&c=<d>").unwrap(),
            "http://netloc/p?q=a b&c=<d>"
        );
    }

    #[test]
    fn test_normalize_url_encodes_non_ascii_path_and_host() {
        assert_eq!(
            normalize_url("http://пример.рф/путь").unwrap(),
            "http://xn--e1afmkfd.xn--p1ai/%D0%BF%D1%83%D1%82%D1%8C"
        );
    }

    #[test]
    fn test_normalize_url_keeps_userinfo_and_port() {
        assert_eq!(
            normalize_url("http://user:pw@example.com:8080/x").unwrap(),
            "http://user:pw@example.com:8080/x"
        );
    }

    #[test]
    fn test_normalize_url_rejects_leading_dot_host() {
        let err = normalize_url("http://.netloc/path;parameters?query=argument#fragment")
            .unwrap_err();
        assert_eq!(err.host, ".netloc");
    }

    #[test]
    fn test_normalize_url_is_idempotent() {
        for url in [
            "http://netloc/ p a t h ;qs quote plus?query=argument#fragment",
            "https://example.com/a%20b/c+d;x y",
            "http://пример.рф/путь?q=1",
            "relative/path with space",
            "",
        ] {
            let once = normalize_url(url).unwrap();
            assert_eq!(normalize_url(&once).unwrap(), once, "input: {url}");
        }
    }

    #[test]
    fn test_prepare_url_none() {
        assert_eq!(prepare_url(None), None);
    }

    #[test]
    fn test_prepare_url_passes_bad_host_through() {
        let url = "http://.netloc/path;parameters?query=argument#fragment";
        assert_eq!(prepare_url(Some(url)), Some(url.to_string()));
    }
}
