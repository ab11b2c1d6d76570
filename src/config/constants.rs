//! Configuration constants.
//!
//! Defaults for every configurable value plus the fixed URL tables used by the
//! redirect resolver.

use std::time::Duration;

/// Number of worker processes the supervisor keeps alive
pub const DEFAULT_WORKER_POOL_SIZE: usize = 10;
/// Supervisor interval between reachability probes
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(10);
/// URL probed to decide whether the network is reachable
pub const DEFAULT_CHECK_URL: &str = "http://example.com";
/// Timeout of the reachability probe
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(3);

pub const DEFAULT_QUEUE_HOST: &str = "127.0.0.1";
pub const DEFAULT_QUEUE_PORT: u16 = 6379;
pub const DEFAULT_QUEUE_SPACE: &str = "redirect_checker";
pub const DEFAULT_INPUT_TUBE: &str = "url_check_input";
pub const DEFAULT_OUTPUT_TUBE: &str = "url_check_output";
/// How long a worker blocks on `take()` before re-checking its parent
pub const DEFAULT_QUEUE_TAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-hop HTTP fetch timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum number of recorded hops per resolution
pub const DEFAULT_MAX_REDIRECTS: usize = 30;

/// Base URL that `market://` deep links are rewritten onto.
pub const MARKET_BASE_URL: &str = "http://play.google.com/store/apps/";
pub const MARKET_SCHEME_PREFIX: &str = "market://";

/// Redirect targets matching this are treated as terminal even though the
/// transport reported a redirect.
pub const SOFT_TERMINAL_PATTERN: &str = r"(?i)^https?://(www\.)?odnoklassniki\.ru/.*st\.redirect";

/// First-party URL shapes that are terminal by policy; resolution skips the
/// network entirely for these.
pub const TERMINAL_URL_PATTERNS: &[&str] = &[
    r"(?i)^https?://(www\.)?my\.mail\.ru/apps/",
    r"(?i)^https?://(www\.)?odnoklassniki\.ru/",
];

/// `check_type` stamped on every result envelope.
pub const CHECK_TYPE_NORMAL: &str = "normal";
