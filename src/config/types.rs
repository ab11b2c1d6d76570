//! Configuration types.
//!
//! This module defines the immutable runtime configuration and the enums used
//! for logging options.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::*;
use crate::error_handling::InitializationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Name clap accepts for `value` on the command line.
fn value_arg<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|possible| possible.get_name().to_string())
        .unwrap_or_default()
}

/// Runtime configuration.
///
/// Built once at startup and never mutated afterwards. The supervisor hands the
/// same values to every worker process through [`Config::worker_args`].
///
/// # Examples
///
/// ```
/// use redirect_checker::Config;
///
/// let config = Config {
///     worker_pool_size: 4,
///     max_redirects: 10,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of worker processes kept alive by the supervisor
    pub worker_pool_size: usize,
    /// Supervisor interval between iterations
    pub sleep: Duration,
    /// URL used by the reachability probe
    pub check_url: String,
    /// Timeout of the reachability probe
    pub http_timeout: Duration,
    /// Queue backend host
    pub queue_host: String,
    /// Queue backend port
    pub queue_port: u16,
    /// Key namespace inside the queue backend
    pub queue_space: String,
    /// Tube tasks are taken from (and resubmitted to)
    pub input_tube: String,
    /// Tube final results are written to
    pub output_tube: String,
    /// Bounded wait of a single `take()`
    pub queue_take_timeout: Duration,
    /// Per-hop HTTP timeout
    pub fetch_timeout: Duration,
    /// Maximum number of recorded redirect hops
    pub max_redirects: usize,
    /// Optional User-Agent override for fetches
    pub user_agent: Option<String>,
    /// Log level
    pub log_level: LogLevel,
    /// Log format
    pub log_format: LogFormat,
    /// Supervisor pidfile
    pub pidfile: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            sleep: DEFAULT_SLEEP,
            check_url: DEFAULT_CHECK_URL.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            queue_host: DEFAULT_QUEUE_HOST.to_string(),
            queue_port: DEFAULT_QUEUE_PORT,
            queue_space: DEFAULT_QUEUE_SPACE.to_string(),
            input_tube: DEFAULT_INPUT_TUBE.to_string(),
            output_tube: DEFAULT_OUTPUT_TUBE.to_string(),
            queue_take_timeout: DEFAULT_QUEUE_TAKE_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            pidfile: None,
        }
    }
}

impl Config {
    /// Rejects configurations the workers cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if self.max_redirects == 0 {
            return Err(InitializationError::InvalidConfig(
                "max_redirects must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(InitializationError::InvalidConfig(
                "fetch_timeout must be positive".to_string(),
            ));
        }
        if self.queue_take_timeout.is_zero() {
            return Err(InitializationError::InvalidConfig(
                "queue_take_timeout must be positive".to_string(),
            ));
        }
        if self.input_tube == self.output_tube {
            return Err(InitializationError::InvalidConfig(format!(
                "input and output tubes must differ (both are '{}')",
                self.input_tube
            )));
        }
        Ok(())
    }

    /// Renders this configuration back into the global CLI flags understood by
    /// [`crate::config::ConfigArgs`], so a spawned worker re-parses exactly the
    /// same values. The pidfile is left out since only the supervisor owns it.
    pub fn worker_args(&self) -> Vec<String> {
        let mut args = vec![
            "--worker-pool-size".to_string(),
            self.worker_pool_size.to_string(),
            "--sleep".to_string(),
            self.sleep.as_secs().to_string(),
            "--check-url".to_string(),
            self.check_url.clone(),
            "--http-timeout".to_string(),
            self.http_timeout.as_secs().to_string(),
            "--queue-host".to_string(),
            self.queue_host.clone(),
            "--queue-port".to_string(),
            self.queue_port.to_string(),
            "--queue-space".to_string(),
            self.queue_space.clone(),
            "--input-tube".to_string(),
            self.input_tube.clone(),
            "--output-tube".to_string(),
            self.output_tube.clone(),
            "--queue-take-timeout".to_string(),
            self.queue_take_timeout.as_secs().to_string(),
            "--fetch-timeout".to_string(),
            self.fetch_timeout.as_secs().to_string(),
            "--max-redirects".to_string(),
            self.max_redirects.to_string(),
            "--log-level".to_string(),
            value_arg(&self.log_level),
            "--log-format".to_string(),
            value_arg(&self.log_format),
        ];
        if let Some(user_agent) = &self.user_agent {
            args.push("--user-agent".to_string());
            args.push(user_agent.clone());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.worker_pool_size, 10);
        assert_eq!(config.max_redirects, 30);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, None);
        assert_eq!(config.pidfile, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_redirects() {
        let config = Config {
            max_redirects: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_redirects"));
    }

    #[test]
    fn test_validate_rejects_shared_tube() {
        let config = Config {
            output_tube: DEFAULT_INPUT_TUBE.to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_allows_empty_pool() {
        let config = Config {
            worker_pool_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_args_carry_user_agent_but_not_pidfile() {
        let config = Config {
            user_agent: Some("checker/1.0".to_string()),
            pidfile: Some(PathBuf::from("/tmp/rc.pid")),
            ..Default::default()
        };
        let args = config.worker_args();
        let ua_pos = args.iter().position(|a| a == "--user-agent").unwrap();
        assert_eq!(args[ua_pos + 1], "checker/1.0");
        assert!(!args.iter().any(|a| a == "--pidfile"));
    }

    #[test]
    fn test_worker_args_use_clap_value_names() {
        let config = Config {
            log_level: LogLevel::Debug,
            log_format: LogFormat::Json,
            ..Default::default()
        };
        let args = config.worker_args();
        let level_pos = args.iter().position(|a| a == "--log-level").unwrap();
        let format_pos = args.iter().position(|a| a == "--log-format").unwrap();
        assert_eq!(args[level_pos + 1], "debug");
        assert_eq!(args[format_pos + 1], "json");
    }
}
