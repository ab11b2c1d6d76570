//! Tracking counter detection.
//!
//! Scans page content for the loader scripts of known tracking counters.

use regex::RegexSet;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// A known tracking counter.
///
/// Variants are declared in alphabetical order of their canonical names, so
/// the derived ordering is the canonical ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Counter {
    #[serde(rename = "DOUBLECLICK")]
    Doubleclick,
    #[serde(rename = "GOOGLE_ANALYTICS")]
    GoogleAnalytics,
    #[serde(rename = "LI_RU")]
    LiRu,
    #[serde(rename = "RAMBLER_TOP100")]
    RamblerTop100,
    #[serde(rename = "TOP_MAIL_RU")]
    TopMailRu,
    #[serde(rename = "VISTRAC")]
    Vistrac,
    #[serde(rename = "YA_METRICA")]
    YaMetrica,
}

impl Counter {
    /// Canonical identifier, as written to result envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Doubleclick => "DOUBLECLICK",
            Counter::GoogleAnalytics => "GOOGLE_ANALYTICS",
            Counter::LiRu => "LI_RU",
            Counter::RamblerTop100 => "RAMBLER_TOP100",
            Counter::TopMailRu => "TOP_MAIL_RU",
            Counter::Vistrac => "VISTRAC",
            Counter::YaMetrica => "YA_METRICA",
        }
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters found on a page, deduplicated and in canonical order.
pub type CounterSet = BTreeSet<Counter>;

/// Script substrings identifying each counter. One counter may have several.
const COUNTER_SIGNATURES: &[(Counter, &str)] = &[
    (Counter::GoogleAnalytics, "google-analytics.com/ga.js"),
    (Counter::YaMetrica, "mc.yandex.ru/metrika/watch.js"),
    (Counter::TopMailRu, "top-fwz1.mail.ru/counter"),
    (Counter::TopMailRu, "top.mail.ru/jump?from"),
    (
        Counter::Doubleclick,
        "//googleads.g.doubleclick.net/pagead/viewthroughconversion",
    ),
    (Counter::Vistrac, "vistrac.com/static/vt.js"),
    (Counter::LiRu, "/counter.yadro.ru/hit"),
    (Counter::RamblerTop100, "counter.rambler.ru/top100"),
];

static COUNTER_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    let patterns = COUNTER_SIGNATURES
        .iter()
        .map(|(_, needle)| format!("(?i){}", regex::escape(needle)));
    RegexSet::new(patterns).unwrap_or_else(|e| {
        panic!(
            "Failed to compile counter signatures: {}. This is a programming error.",
            e
        )
    })
});

/// Returns the set of tracking counters referenced by `content`.
///
/// Empty content yields an empty set.
pub fn get_counters(content: &str) -> CounterSet {
    COUNTER_PATTERNS
        .matches(content)
        .into_iter()
        .map(|index| COUNTER_SIGNATURES[index].0)
        .collect()
}
