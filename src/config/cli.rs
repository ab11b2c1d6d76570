//! Command-line options.
//!
//! Every configuration flag can also be supplied through an environment
//! variable (or a `.env` file loaded by the binary before parsing).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::*;
use crate::config::types::{Config, LogFormat, LogLevel};

/// Command-line options and configuration.
///
/// # Examples
///
/// ```bash
/// # Run the supervisor with four workers
/// redirect_checker --worker-pool-size 4 supervise
///
/// # Resolve a couple of URLs without touching the queue
/// redirect_checker check http://example.com market://details?id=app
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "redirect_checker",
    about = "Resolves URL redirect chains pulled from a work queue."
)]
pub struct Opt {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Process roles.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Keep a pool of worker processes alive while the network is reachable
    Supervise,
    /// Run a single worker loop (spawned by `supervise`)
    Worker {
        /// Pid of the supervisor; the worker exits once it disappears
        #[arg(long)]
        parent_pid: u32,
    },
    /// Resolve URLs directly and print one JSON line per URL
    Check {
        /// URLs to resolve
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

/// Global configuration flags.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Number of worker processes to keep alive
    #[arg(long, env = "REDIRECT_CHECKER_WORKER_POOL_SIZE", default_value_t = DEFAULT_WORKER_POOL_SIZE)]
    pub worker_pool_size: usize,

    /// Seconds between supervisor iterations
    #[arg(long, env = "REDIRECT_CHECKER_SLEEP", default_value_t = DEFAULT_SLEEP.as_secs())]
    pub sleep: u64,

    /// URL probed to decide whether the network is reachable
    #[arg(long, env = "REDIRECT_CHECKER_CHECK_URL", default_value = DEFAULT_CHECK_URL)]
    pub check_url: String,

    /// Reachability probe timeout in seconds
    #[arg(long, env = "REDIRECT_CHECKER_HTTP_TIMEOUT", default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs())]
    pub http_timeout: u64,

    /// Queue backend host
    #[arg(long, env = "REDIRECT_CHECKER_QUEUE_HOST", default_value = DEFAULT_QUEUE_HOST)]
    pub queue_host: String,

    /// Queue backend port
    #[arg(long, env = "REDIRECT_CHECKER_QUEUE_PORT", default_value_t = DEFAULT_QUEUE_PORT)]
    pub queue_port: u16,

    /// Key namespace inside the queue backend
    #[arg(long, env = "REDIRECT_CHECKER_QUEUE_SPACE", default_value = DEFAULT_QUEUE_SPACE)]
    pub queue_space: String,

    /// Tube that check tasks are taken from
    #[arg(long, env = "REDIRECT_CHECKER_INPUT_TUBE", default_value = DEFAULT_INPUT_TUBE)]
    pub input_tube: String,

    /// Tube that results are written to
    #[arg(long, env = "REDIRECT_CHECKER_OUTPUT_TUBE", default_value = DEFAULT_OUTPUT_TUBE)]
    pub output_tube: String,

    /// Seconds a worker blocks waiting for a task
    #[arg(long, env = "REDIRECT_CHECKER_QUEUE_TAKE_TIMEOUT", default_value_t = DEFAULT_QUEUE_TAKE_TIMEOUT.as_secs())]
    pub queue_take_timeout: u64,

    /// Per-hop fetch timeout in seconds
    #[arg(long, env = "REDIRECT_CHECKER_FETCH_TIMEOUT", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout: u64,

    /// Maximum number of redirect hops recorded per URL
    #[arg(long, env = "REDIRECT_CHECKER_MAX_REDIRECTS", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// User-Agent header sent with every fetch
    #[arg(long, env = "REDIRECT_CHECKER_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, env = "REDIRECT_CHECKER_LOG_LEVEL", default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, env = "REDIRECT_CHECKER_LOG_FORMAT", default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Write the supervisor pid to this file
    #[arg(long, env = "REDIRECT_CHECKER_PIDFILE")]
    pub pidfile: Option<PathBuf>,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Config {
            worker_pool_size: args.worker_pool_size,
            sleep: Duration::from_secs(args.sleep),
            check_url: args.check_url,
            http_timeout: Duration::from_secs(args.http_timeout),
            queue_host: args.queue_host,
            queue_port: args.queue_port,
            queue_space: args.queue_space,
            input_tube: args.input_tube,
            output_tube: args.output_tube,
            queue_take_timeout: Duration::from_secs(args.queue_take_timeout),
            fetch_timeout: Duration::from_secs(args.fetch_timeout),
            max_redirects: args.max_redirects,
            user_agent: args.user_agent.filter(|ua| !ua.is_empty()),
            log_level: args.log_level,
            log_format: args.log_format,
            pidfile: args.pidfile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supervise_defaults() {
        let opt = Opt::try_parse_from(["redirect_checker", "supervise"]).unwrap();
        assert_eq!(opt.command, Command::Supervise);
        let config = Config::from(opt.config);
        assert_eq!(config.worker_pool_size, DEFAULT_WORKER_POOL_SIZE);
        assert_eq!(config.input_tube, DEFAULT_INPUT_TUBE);
    }

    #[test]
    fn test_parse_worker_requires_parent_pid() {
        assert!(Opt::try_parse_from(["redirect_checker", "worker"]).is_err());
        let opt =
            Opt::try_parse_from(["redirect_checker", "worker", "--parent-pid", "42"]).unwrap();
        assert_eq!(opt.command, Command::Worker { parent_pid: 42 });
    }

    #[test]
    fn test_check_requires_urls() {
        assert!(Opt::try_parse_from(["redirect_checker", "check"]).is_err());
    }

    #[test]
    fn test_worker_args_reparse_to_same_config() {
        let original = Config {
            worker_pool_size: 3,
            sleep: Duration::from_secs(7),
            max_redirects: 5,
            user_agent: Some("checker/1.0".to_string()),
            log_level: LogLevel::Debug,
            log_format: LogFormat::Json,
            ..Default::default()
        };

        let mut argv = vec!["redirect_checker".to_string()];
        argv.extend(original.worker_args());
        argv.extend(["worker", "--parent-pid", "1"].map(String::from));

        let opt = Opt::try_parse_from(argv).unwrap();
        assert_eq!(Config::from(opt.config), original);
    }
}
