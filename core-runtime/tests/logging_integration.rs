//! Integration tests for logging system

use bridge_traits::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

#[test]
fn test_logging_initializes_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    // Only one global subscriber can exist per process
    init_logging(config.clone()).unwrap();
    tracing::info!(target: "core_sync", station_id = 0, "Logging ready");

    assert!(init_logging(config).is_err());
}

#[test]
fn test_invalid_filter_is_config_error() {
    let config = LoggingConfig::default().with_filter("core_catalog=[[[");
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Invalid log filter"));
}
