//! # Configuration Module
//!
//! Provides configuration management for refset-sync.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an
//! [`AppConfig`]. The builder applies defaults for everything except the API
//! location and credentials and fails fast with an actionable message when
//! those are missing. Only presence is checked; the shape of the URL and token
//! is left to the remote API to judge.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::AppConfig;
//!
//! let config = AppConfig::builder()
//!     .base_url("https://qradar.example.com")
//!     .sec_token("0000-1111")
//!     .input_path("servers.csv")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.api_version, "9.1");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::AppConfig;
//!
//! // Missing base URL and token
//! let config = AppConfig::builder()
//!     .input_path("servers.csv")
//!     .build()
//!     .expect("Should fail - missing API location");
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use core_async::FailurePolicy;
use std::path::PathBuf;
use std::time::Duration;

/// REST API version header value sent with every request
pub const DEFAULT_API_VERSION: &str = "9.1";

/// Prefix that marks reference sets owned by this tool
pub const DEFAULT_MANAGED_PREFIX: &str = "Managed UNIX Devices - ";

/// Separator joining grouping columns in fine-grained set names
pub const DEFAULT_NAME_SEPARATOR: &str = " - ";

/// Inventory file read when no path is given
pub const DEFAULT_INPUT_FILE: &str = "USS-UNIX-Servers.csv";

/// How group names are derived from grouping columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNaming {
    /// Marks a reference set as owned by this tool
    pub prefix: String,
    /// Joins grouping columns in fine-grained names
    pub separator: String,
}

impl Default for GroupNaming {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_MANAGED_PREFIX.to_string(),
            separator: DEFAULT_NAME_SEPARATOR.to_string(),
        }
    }
}

impl GroupNaming {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    pub fn coarse_name(&self, column: &str) -> String {
        format!("{}{}", self.prefix, column)
    }

    pub fn fine_name(&self, columns: &[&str]) -> String {
        format!("{}{}", self.prefix, columns.join(self.separator.as_str()))
    }

    /// Whether a remote set name falls under this tool's ownership.
    pub fn is_managed(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

/// Transport settings for the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Overall bound for one request
    pub request_timeout: Duration,
    /// Bound for TCP connect plus TLS handshake
    pub connect_timeout: Duration,
    /// Skip server certificate validation. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(3),
            accept_invalid_certs: false,
        }
    }
}

/// Retry budget for fixed-interval delete task polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Status lookups before giving up
    pub max_attempts: u32,
    /// Pause after each lookup that did not report completion
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(1),
        }
    }
}

/// Complete configuration for one sync run.
///
/// Use [`AppConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the console, without trailing slash
    pub base_url: String,

    /// Authorized service token sent in the `SEC` header
    pub sec_token: String,

    /// CSV inventory of servers
    pub input_path: PathBuf,

    pub api_version: String,

    pub naming: GroupNaming,

    pub http: HttpSettings,

    pub poll: PollPolicy,

    /// What happens to sibling units when one fails
    pub failure_policy: FailurePolicy,

    /// Plan only, never mutate remote state
    pub dry_run: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("base_url", &self.base_url)
            .field(
                "sec_token",
                &redact_if_sensitive("sec_token", &self.sec_token),
            )
            .field("input_path", &self.input_path)
            .field("api_version", &self.api_version)
            .field("naming", &self.naming)
            .field("http", &self.http)
            .field("poll", &self.poll)
            .field("failure_policy", &self.failure_policy)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Base URL and token are present
    /// - Input path, API version and naming prefix are not empty
    /// - Timeouts are non-zero
    /// - At least one poll attempt is allowed
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(missing_base_url());
        }

        if self.sec_token.trim().is_empty() {
            return Err(missing_sec_token());
        }

        if self.input_path.as_os_str().is_empty() {
            return Err(Error::Config("Input file path cannot be empty".to_string()));
        }

        if self.api_version.trim().is_empty() {
            return Err(Error::Config("API version cannot be empty".to_string()));
        }

        if self.naming.prefix.is_empty() {
            return Err(Error::Config(
                "Managed set prefix cannot be empty; every set on the console would be treated as managed"
                    .to_string(),
            ));
        }

        if self.http.request_timeout.is_zero() || self.http.connect_timeout.is_zero() {
            return Err(Error::Config(
                "Request and connect timeouts must be greater than zero".to_string(),
            ));
        }

        if self.poll.max_attempts == 0 {
            return Err(Error::Config(
                "Poll attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn missing_base_url() -> Error {
    Error::MissingSetting {
        setting: "url".to_string(),
        hint: "Pass --url or set QRADAR_BASE_URL to the console base URL".to_string(),
    }
}

fn missing_sec_token() -> Error {
    Error::MissingSetting {
        setting: "token".to_string(),
        hint: "Pass --token or set QRADAR_SEC_TOKEN to an authorized service token".to_string(),
    }
}

/// Builder for constructing [`AppConfig`] instances.
#[derive(Default)]
pub struct AppConfigBuilder {
    base_url: Option<String>,
    sec_token: Option<String>,
    input_path: Option<PathBuf>,
    api_version: Option<String>,
    naming: Option<GroupNaming>,
    http: Option<HttpSettings>,
    poll: Option<PollPolicy>,
    failure_policy: FailurePolicy,
    dry_run: bool,
}

impl AppConfigBuilder {
    /// Sets the console base URL, e.g. `https://qradar.example.com`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn sec_token(mut self, token: impl Into<String>) -> Self {
        self.sec_token = Some(token.into());
        self
    }

    pub fn input_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Overrides the managed prefix, keeping the separator.
    pub fn managed_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut naming = self.naming.unwrap_or_default();
        naming.prefix = prefix.into();
        self.naming = Some(naming);
        self
    }

    pub fn naming(mut self, naming: GroupNaming) -> Self {
        self.naming = Some(naming);
        self
    }

    pub fn http(mut self, http: HttpSettings) -> Self {
        self.http = Some(http);
        self
    }

    pub fn poll(mut self, poll: PollPolicy) -> Self {
        self.poll = Some(poll);
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builds the final `AppConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingSetting`] if the base URL or token is absent or blank
    /// - [`Error::Config`] if any other value is invalid
    pub fn build(self) -> Result<AppConfig> {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(missing_base_url)?;

        let sec_token = self
            .sec_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(missing_sec_token)?;

        let config = AppConfig {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            sec_token,
            input_path: self
                .input_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE)),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            naming: self.naming.unwrap_or_default(),
            http: self.http.unwrap_or_default(),
            poll: self.poll.unwrap_or_default(),
            failure_policy: self.failure_policy,
            dry_run: self.dry_run,
        };

        config.validate()?;

        Ok(config)
    }
}
