//! Integration tests for logging and configuration

use core_runtime::config::{AppConfig, HttpSettings, PollPolicy};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LogLevel, LoggingConfig};
use core_runtime::Error;
use std::time::Duration;

#[test]
fn test_logging_initializes_once_per_process() {
    // Only this test installs a global subscriber in this binary.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).expect("first initialization succeeds");
    tracing::info!(set_name = "Managed UNIX Devices - A", "logging is live");

    let second = init_logging(config);
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Compact);
}

#[test]
fn test_token_never_reaches_debug_output() {
    let config = AppConfig::builder()
        .base_url("https://qradar.example.com")
        .sec_token("8f0c-secret-token")
        .build()
        .unwrap();

    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("8f0c-secret-token"));
    assert_eq!(redact_if_sensitive("sec_token", &config.sec_token), "[REDACTED]");
}

#[test]
fn test_full_config_overrides() {
    let config = AppConfig::builder()
        .base_url("  https://qradar.example.com//  ")
        .sec_token("token")
        .input_path("/srv/inventory/servers.csv")
        .api_version("12.0")
        .http(HttpSettings {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(1),
            accept_invalid_certs: true,
        })
        .poll(PollPolicy {
            max_attempts: 2,
            interval: Duration::from_millis(250),
        })
        .dry_run(true)
        .build()
        .unwrap();

    assert_eq!(config.base_url, "https://qradar.example.com");
    assert_eq!(config.api_version, "12.0");
    assert!(config.http.accept_invalid_certs);
    assert_eq!(config.poll.max_attempts, 2);
    assert!(config.dry_run);
}

#[test]
fn test_missing_settings_reported_in_order() {
    let error = AppConfig::builder().build().unwrap_err();
    assert!(error.to_string().contains("url"));

    let error = AppConfig::builder()
        .base_url("https://qradar.example.com")
        .build()
        .unwrap_err();
    assert!(error.to_string().contains("token"));
}
