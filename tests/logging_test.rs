// ABOUTME: Unit tests for logging functionality
// ABOUTME: Validates environment-driven logging configuration and filter construction
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use pierre_intervals::logging::{LogFormat, LoggingConfig, DEFAULT_SERVICE_NAME};
use serial_test::serial;
use std::env;

fn clear_logging_env() {
    for var in [
        "RUST_LOG",
        "LOG_FORMAT",
        "ENVIRONMENT",
        "SERVICE_NAME",
        "LOG_INCLUDE_LOCATION",
        "LOG_INCLUDE_THREAD",
    ] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_logging_config_from_env() {
    clear_logging_env();
    env::set_var("RUST_LOG", "debug");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("SERVICE_NAME", "test-service");

    let config = LoggingConfig::from_env();
    clear_logging_env();

    assert_eq!(config.level, "debug");
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.environment, "production");
    assert_eq!(config.service_name, "test-service");
    assert!(config.include_location);
}

#[test]
#[serial]
fn test_production_defaults_to_json() {
    clear_logging_env();
    env::set_var("ENVIRONMENT", "production");

    let config = LoggingConfig::from_env();
    clear_logging_env();

    assert_eq!(config.format, LogFormat::Json);
}

#[test]
#[serial]
fn test_development_defaults() {
    clear_logging_env();

    let config = LoggingConfig::from_env();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
    assert!(!config.include_location);
    assert!(!config.include_thread);
}

#[test]
#[serial]
fn test_unknown_format_falls_back_to_pretty() {
    clear_logging_env();
    env::set_var("LOG_FORMAT", "xml");

    let config = LoggingConfig::from_env();
    clear_logging_env();

    assert_eq!(config.format, LogFormat::Pretty);
}

#[test]
fn test_env_filter_quiets_dependencies() {
    let config = LoggingConfig {
        level: "debug".into(),
        ..LoggingConfig::default()
    };

    let filter = config.env_filter().to_string();

    assert!(filter.contains("sqlx=warn"));
    assert!(filter.contains("hyper=warn"));
}
