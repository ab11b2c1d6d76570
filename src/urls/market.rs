//! App-store deep link rewriting.

use crate::config::{MARKET_BASE_URL, MARKET_SCHEME_PREFIX};

/// Returns true when the URL uses the `market` scheme.
pub fn is_market_url(url: &str) -> bool {
    url.split_once(':')
        .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case("market"))
}

/// Rewrites a `market://` deep link onto the Play Store web URL.
///
/// The base is prepended unconditionally: input that does not start with the
/// literal `market://` prefix is appended whole.
pub fn fix_market_url(url: &str) -> String {
    let remainder = url.strip_prefix(MARKET_SCHEME_PREFIX).unwrap_or(url);
    format!("{MARKET_BASE_URL}{remainder}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_market_url_market_scheme() {
        assert_eq!(
            fix_market_url("market://bestOfTheBestUrl"),
            "http://play.google.com/store/apps/bestOfTheBestUrl"
        );
    }

    #[test]
    fn test_fix_market_url_other_input_is_appended_whole() {
        assert_eq!(
            fix_market_url("not-market://bestOfTheBestUrl"),
            "http://play.google.com/store/apps/not-market://bestOfTheBestUrl"
        );
        assert_eq!(
            fix_market_url("other"),
            "http://play.google.com/store/apps/other"
        );
    }

    #[test]
    fn test_is_market_url() {
        assert!(is_market_url("market://details?id=com.example"));
        assert!(is_market_url("MARKET://details"));
        assert!(!is_market_url("http://market.example.com/"));
        assert!(!is_market_url("not-market://x"));
    }
}
