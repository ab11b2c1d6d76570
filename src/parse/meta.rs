//! Meta-refresh redirect detection.

use reqwest::Url;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::urls::normalize_url;

const META_REFRESH_SELECTOR_STR: &str = "meta[http-equiv]";

static META_REFRESH_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    crate::utils::parse_selector_with_fallback(META_REFRESH_SELECTOR_STR, "meta refresh detection")
});

/// Extracts the `url=` value from a refresh `content` attribute such as
/// `5; url=http://example.com/`.
///
/// The attribute must split into exactly two `;`-separated parts.
fn refresh_target(content: &str) -> Option<&str> {
    let mut parts = content.split(';');
    let (_delay, target, None) = (parts.next()?, parts.next()?, parts.next()) else {
        return None;
    };

    let target = target.trim();
    if !target.get(..4)?.eq_ignore_ascii_case("url=") {
        return None;
    }
    let value = target[4..].trim().trim_matches(['\'', '"']);
    (!value.is_empty()).then_some(value)
}

/// Looks for a `<meta http-equiv="refresh">` redirect in an HTML document.
///
/// The target is normalized and, when relative, joined against `base_url`; a
/// target that fails normalization or joining yields `None`.
///
/// # Arguments
///
/// * `content` - The raw HTML body
/// * `base_url` - URL the body was fetched from
///
/// # Returns
///
/// The absolute redirect target, or `None` when the page carries no usable
/// meta refresh.
pub fn check_for_meta(content: &str, base_url: &str) -> Option<String> {
    let document = Html::parse_document(content);
    let meta = document.select(&META_REFRESH_SELECTOR).find(|element| {
        element
            .value()
            .attr("http-equiv")
            .is_some_and(|value| value.eq_ignore_ascii_case("refresh"))
    })?;

    let target = refresh_target(meta.value().attr("content")?)?;
    let normalized = normalize_url(target).ok()?;

    let joined = join_target(base_url, &normalized);
    if joined.is_none() {
        log::debug!("Ignoring meta refresh target '{normalized}' on {base_url}");
    }
    joined
}

/// Resolves `target` against `base_url` without re-serializing it.
///
/// An absolute target is returned as given. For a relative one only the part
/// before `?` or `#` is joined; the query and fragment are appended verbatim.
fn join_target(base_url: &str, target: &str) -> Option<String> {
    if Url::parse(target).is_ok() {
        return Some(target.to_string());
    }

    let base = Url::parse(base_url).ok()?;
    let (reference, suffix) = target.split_at(target.find(['?', '#']).unwrap_or(target.len()));
    let mut joined = base.join(reference).ok()?;
    if !suffix.is_empty() {
        joined.set_query(None);
        joined.set_fragment(None);
    }
    Some(format!("{joined}{suffix}"))
}
