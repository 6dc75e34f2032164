// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database URL, Strava credentials, webhook dispatch and cron settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use anyhow::{bail, Context, Result};
use pierre_intelligence::IntervalDetectionConfig;
use pierre_providers::{HttpClientTimeouts, StravaOAuth};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use url::Url;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default `SQLite` database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/intervals.db";

/// Path of the `OAuth` callback relative to `BASE_URL`
pub const OAUTH_CALLBACK_PATH: &str = "/api/auth/callback";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Whether secure-only cookies should be issued
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Strava application registration
#[derive(Debug, Clone, Default)]
pub struct StravaAppConfig {
    /// `OAuth` client id
    pub client_id: Option<String>,
    /// `OAuth` client secret
    pub client_secret: Option<String>,
    /// Token expected on push-subscription validation
    pub webhook_verify_token: Option<String>,
    /// Override for the REST API base URL
    pub api_base_url: Option<String>,
}

/// Batch analysis endpoint settings
#[derive(Debug, Clone)]
pub struct CronConfig {
    /// Bearer secret required on `/api/cron`, open when unset
    pub secret: Option<String>,
    /// Most recent activities analyzed per athlete
    pub activity_count: u32,
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            secret: None,
            activity_count: 1,
        }
    }
}

/// Webhook dispatch queue settings
#[derive(Debug, Clone, Copy)]
pub struct WebhookConfig {
    /// Worker tasks draining the queue
    pub workers: usize,
    /// Bounded queue capacity
    pub queue_capacity: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 256,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Listen address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// `SQLite` connection string
    pub database_url: String,
    /// Public base URL, used to build the `OAuth` redirect URI
    pub base_url: String,
    /// Comma-separated CORS origins, `*` for any
    pub cors_allowed_origins: String,
    /// Strava credentials
    pub strava: StravaAppConfig,
    /// Batch endpoint settings
    pub cron: CronConfig,
    /// Webhook queue settings
    pub webhook: WebhookConfig,
    /// Outbound HTTP timeouts
    pub http_client: HttpClientTimeouts,
    /// Interval detection tunables injected into the analyzer
    pub intervals: IntervalDetectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            host: "0.0.0.0".to_owned(),
            environment: Environment::default(),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            base_url: format!("http://localhost:{DEFAULT_HTTP_PORT}"),
            cors_allowed_origins: "*".to_owned(),
            strava: StravaAppConfig::default(),
            cron: CronConfig::default(),
            webhook: WebhookConfig::default(),
            http_client: HttpClientTimeouts::default(),
            intervals: IntervalDetectionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or if
    /// the resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port = parse_env("HTTP_PORT", DEFAULT_HTTP_PORT)?;
        let defaults = HttpClientTimeouts::default();

        let config = Self {
            http_port,
            host: env_var_or("HOST", "0.0.0.0"),
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            base_url: env_var_or("BASE_URL", &format!("http://localhost:{http_port}"))
                .trim_end_matches('/')
                .to_owned(),
            cors_allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            strava: StravaAppConfig {
                client_id: optional_env("STRAVA_CLIENT_ID"),
                client_secret: optional_env("STRAVA_CLIENT_SECRET"),
                webhook_verify_token: optional_env("STRAVA_WEBHOOK_VERIFY_TOKEN"),
                api_base_url: optional_env("STRAVA_API_BASE_URL"),
            },
            cron: CronConfig {
                secret: optional_env("CRON_SECRET"),
                activity_count: parse_env("CRON_ACTIVITY_COUNT", 1)?,
            },
            webhook: WebhookConfig {
                workers: parse_env("WEBHOOK_WORKERS", 2)?,
                queue_capacity: parse_env("WEBHOOK_QUEUE_CAPACITY", 256)?,
            },
            http_client: HttpClientTimeouts {
                request_secs: parse_env("HTTP_CLIENT_TIMEOUT_SECS", defaults.request_secs)?,
                connect_secs: parse_env(
                    "HTTP_CLIENT_CONNECT_TIMEOUT_SECS",
                    defaults.connect_secs,
                )?,
            },
            intervals: IntervalDetectionConfig::from_environment()
                .context("Invalid interval detection configuration")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            bail!("HTTP_PORT must be non-zero");
        }
        if self.webhook.workers == 0 {
            bail!("WEBHOOK_WORKERS must be at least 1");
        }
        if self.webhook.queue_capacity == 0 {
            bail!("WEBHOOK_QUEUE_CAPACITY must be at least 1");
        }
        if self.cron.activity_count == 0 {
            bail!("CRON_ACTIVITY_COUNT must be at least 1");
        }
        if self.http_client.request_secs == 0 || self.http_client.connect_secs == 0 {
            bail!("HTTP client timeouts must be non-zero");
        }
        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid BASE_URL: {}", self.base_url))?;
        Ok(())
    }

    /// `OAuth` redirect URI registered with Strava
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}{OAUTH_CALLBACK_PATH}", self.base_url)
    }

    /// Whether Strava `OAuth` credentials are present
    #[must_use]
    pub fn strava_configured(&self) -> bool {
        self.strava.client_id.is_some() && self.strava.client_secret.is_some()
    }

    /// Build the `OAuth` helper for the configured application
    #[must_use]
    pub fn strava_oauth(&self) -> StravaOAuth {
        StravaOAuth::new(
            self.strava.client_id.clone().unwrap_or_default(),
            self.strava.client_secret.clone().unwrap_or_default(),
            self.redirect_uri(),
        )
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Pierre Intervals Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Base URL: {}\n\
             - Database: {}\n\
             - Strava OAuth: {}\n\
             - Webhook Verification: {}\n\
             - Webhook Dispatch: {} workers, queue {}\n\
             - Cron: {} activities per athlete, {}\n\
             - Tempo Annotation: {}",
            self.environment,
            self.host,
            self.http_port,
            self.base_url,
            if self.database_url.contains(":memory:") {
                "SQLite (in-memory)"
            } else {
                "SQLite"
            },
            enabled(self.strava_configured()),
            enabled(self.strava.webhook_verify_token.is_some()),
            self.webhook.workers,
            self.webhook.queue_capacity,
            self.cron.activity_count,
            if self.cron.secret.is_some() {
                "secret required"
            } else {
                "open"
            },
            enabled(self.intervals.annotate_tempo_runs),
        )
    }
}

const fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PRODUCTION"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("test"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default("staging"),
            Environment::Development
        );
    }

    #[test]
    fn test_redirect_uri_uses_base_url() {
        let config = ServerConfig {
            base_url: "https://intervals.example.com".to_owned(),
            ..ServerConfig::default()
        };
        assert_eq!(
            config.redirect_uri(),
            "https://intervals.example.com/api/auth/callback"
        );
    }

    #[test]
    fn test_summary_hides_secrets() {
        let config = ServerConfig {
            strava: StravaAppConfig {
                client_id: Some("1234".to_owned()),
                client_secret: Some("super-secret".to_owned()),
                webhook_verify_token: Some("verify-me".to_owned()),
                api_base_url: None,
            },
            cron: CronConfig {
                secret: Some("cron-secret".to_owned()),
                activity_count: 3,
            },
            ..ServerConfig::default()
        };
        let summary = config.summary();
        assert!(summary.contains("Strava OAuth: Enabled"));
        assert!(summary.contains("3 activities per athlete"));
        assert!(!summary.contains("super-secret"));
        assert!(!summary.contains("verify-me"));
        assert!(!summary.contains("cron-secret"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = ServerConfig {
            webhook: WebhookConfig {
                workers: 0,
                queue_capacity: 8,
            },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
