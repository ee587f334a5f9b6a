//! Command line interface.

use clap::{Parser, ValueEnum};
use core_async::FailurePolicy;
use core_runtime::config::{
    AppConfig, GroupNaming, HttpSettings, PollPolicy, DEFAULT_API_VERSION,
    DEFAULT_INPUT_FILE, DEFAULT_MANAGED_PREFIX, DEFAULT_NAME_SEPARATOR,
};
use core_runtime::logging::{LogFormat, LogLevel, LoggingConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Sync CSV-derived UNIX server groups into QRadar IP reference sets
#[derive(Debug, Parser)]
#[command(name = "refset-sync", version)]
#[command(about = "Reconcile managed QRadar reference sets with a server inventory")]
pub struct Cli {
    /// Base URL of the QRadar Console
    #[arg(long, env = "QRADAR_BASE_URL")]
    pub url: Option<String>,

    /// Security token of a QRadar authorized service
    #[arg(long, env = "QRADAR_SEC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// UNIX server list (CSV: host, ip, grouping columns...)
    #[arg(long, default_value = DEFAULT_INPUT_FILE)]
    pub file: PathBuf,

    /// Log the planned changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// What to do with running units when one fails
    #[arg(long, value_enum, default_value_t = PolicyArg::BestEffort)]
    pub policy: PolicyArg,

    /// Delete task status lookups before giving up
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub poll_attempts: u32,

    /// Pause between delete task status lookups
    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Prefix marking reference sets owned by this tool
    #[arg(long, default_value = DEFAULT_MANAGED_PREFIX)]
    pub prefix: String,

    /// REST API version header
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Overall timeout for one API request
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Timeout for TCP connect plus TLS handshake
    #[arg(long, default_value_t = 3)]
    pub connect_timeout_secs: u64,

    /// Skip TLS certificate validation
    #[arg(long)]
    pub insecure: bool,

    #[arg(long, value_enum, default_value_t = LogFormatArg::Compact)]
    pub log_format: LogFormatArg,

    #[arg(long, value_enum, default_value_t = LogLevelArg::Info)]
    pub log_level: LogLevelArg,

    /// Full filter directive, e.g. "core_sync=debug,provider_qradar=trace"
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    BestEffort,
    FailFast,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::BestEffort => FailurePolicy::BestEffort,
            PolicyArg::FailFast => FailurePolicy::FailFast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Compact => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Trace => LogLevel::Trace,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Error => LogLevel::Error,
        }
    }
}

impl Cli {
    pub fn logging_config(&self) -> LoggingConfig {
        let config = LoggingConfig::default()
            .with_format(self.log_format.into())
            .with_level(self.log_level.into());

        match &self.log_filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }

    /// Validated run configuration. Absent URL or token is reported here.
    pub fn app_config(&self) -> core_runtime::Result<AppConfig> {
        let mut builder = AppConfig::builder()
            .input_path(self.file.clone())
            .api_version(self.api_version.clone())
            .naming(GroupNaming::new(self.prefix.as_str(), DEFAULT_NAME_SEPARATOR))
            .http(HttpSettings {
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                accept_invalid_certs: self.insecure,
            })
            .poll(PollPolicy {
                max_attempts: self.poll_attempts,
                interval: Duration::from_millis(self.poll_interval_ms),
            })
            .failure_policy(self.policy.into())
            .dry_run(self.dry_run);

        if let Some(url) = &self.url {
            builder = builder.base_url(url.clone());
        }
        if let Some(token) = &self.token {
            builder = builder.sec_token(token.clone());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["refset-sync"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--url", "https://qradar.example.com", "--token", "t"]);

        assert_eq!(cli.file, PathBuf::from("USS-UNIX-Servers.csv"));
        assert_eq!(cli.policy, PolicyArg::BestEffort);
        assert_eq!(cli.poll_attempts, 5);
        assert_eq!(cli.poll_interval_ms, 1000);
        assert_eq!(cli.prefix, "Managed UNIX Devices - ");
        assert!(!cli.insecure);
        assert!(!cli.dry_run);

        let config = cli.app_config().unwrap();
        assert_eq!(config.poll.interval, Duration::from_secs(1));
        assert_eq!(config.http.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&[
            "--url",
            "https://qradar.example.com",
            "--token",
            "t",
            "--file",
            "/srv/servers.csv",
            "--dry-run",
            "--policy",
            "fail-fast",
            "--poll-attempts",
            "10",
            "--poll-interval-ms",
            "250",
            "--insecure",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ]);

        let config = cli.app_config().unwrap();
        assert!(config.dry_run);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.poll.max_attempts, 10);
        assert_eq!(config.poll.interval, Duration::from_millis(250));
        assert!(config.http.accept_invalid_certs);
        assert_eq!(config.input_path, PathBuf::from("/srv/servers.csv"));

        let logging = cli.logging_config();
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_zero_poll_attempts_rejected_by_parser() {
        let result = Cli::try_parse_from(["refset-sync", "--poll-attempts", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_token_reported() {
        let cli = Cli {
            token: None,
            ..parse(&["--url", "https://qradar.example.com", "--token", "t"])
        };

        let error = cli.app_config().unwrap_err();
        assert!(matches!(
            error,
            core_runtime::Error::MissingSetting { ref setting, .. } if setting == "token"
        ));
    }
}
