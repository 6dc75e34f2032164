// ABOUTME: Logging configuration and structured logging setup for the interval annotation server
// ABOUTME: Configures log levels, output format and noise reduction for HTTP/database crates
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Structured logging configuration

use anyhow::{Context, Result};
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use pierre_intelligence::{AnalysisOutcome, SkipReason};

/// Default service name reported in startup logs
pub const DEFAULT_SERVICE_NAME: &str = "pierre-intervals-server";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            service_name: DEFAULT_SERVICE_NAME.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        let format = env::var("LOG_FORMAT").map_or(
            if is_production {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            |value| LogFormat::parse(&value),
        );

        Self {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: env::var("LOG_INCLUDE_THREAD").is_ok(),
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.into()),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment,
        }
    }

    /// Build the filter: configured level plus noise reduction for dependencies
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(&self.level);
        for directive in [
            "hyper=warn",
            "hyper::proto=warn",
            "reqwest=warn",
            "sqlx=warn",
            "tower_http=info",
        ] {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
        filter
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout)
                    .with_span_events(FmtSpan::NONE)
                    .json();
                registry.with(layer).try_init()
            }
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_thread_ids(self.include_thread)
                    .with_target(true)
                    .with_writer(io::stdout);
                registry.with(layer).try_init()
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stdout);
                registry.with(layer).try_init()
            }
        }
        .context("Failed to install tracing subscriber")?;

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            log.location = self.include_location,
            "Logging configured"
        );
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Application-specific structured log events
pub struct AppLogger;

impl AppLogger {
    /// Log `OAuth` events
    pub fn log_oauth_event(athlete_id: u64, event: &str, success: bool) {
        info!(
            athlete_id,
            oauth.provider = "strava",
            oauth.event = %event,
            oauth.success = success,
            "OAuth event"
        );
    }

    /// Log an incoming webhook event
    pub fn log_webhook_event(event_id: &str, object_type: &str, aspect_type: &str, object_id: u64) {
        info!(
            event_id = %event_id,
            webhook.object_type = %object_type,
            webhook.aspect_type = %aspect_type,
            activity_id = object_id,
            "Webhook event received"
        );
    }

    /// Log the result of one activity analysis
    pub fn log_analysis_outcome(trigger: &str, outcome: &AnalysisOutcome) {
        info!(
            trigger = %trigger,
            activity_id = outcome.activity_id,
            state = outcome.state.as_str(),
            success = outcome.success,
            processed = outcome.processed,
            reason = outcome.reason.map(SkipReason::as_str),
            "Analysis finished: {}",
            outcome.message
        );
    }
}
