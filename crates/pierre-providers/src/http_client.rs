// ABOUTME: Shared HTTP client with connection pooling for Strava API and OAuth calls
// ABOUTME: Timeouts are configured once at server startup, defaults apply otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;

use pierre_core::errors::ProviderError;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// User agent sent with every provider request
const USER_AGENT: &str = concat!("pierre-intervals/", env!("CARGO_PKG_VERSION"));

/// Timeouts applied to the shared client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientTimeouts {
    /// Whole-request timeout in seconds
    pub request_secs: u64,
    /// Connection establishment timeout in seconds
    pub connect_secs: u64,
}

impl Default for HttpClientTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

static CLIENT_TIMEOUTS: OnceLock<HttpClientTimeouts> = OnceLock::new();

static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Record the timeouts used by [`shared_client`]
///
/// Must be called before the first provider request; later calls are ignored.
pub fn initialize_shared_client(timeouts: HttpClientTimeouts) {
    if CLIENT_TIMEOUTS.set(timeouts).is_err() {
        tracing::debug!("Shared HTTP client timeouts already initialized");
    }
}

/// Pooled client shared by every Strava call
pub fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        let timeouts = CLIENT_TIMEOUTS.get().copied().unwrap_or_default();
        ClientBuilder::new()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Map a transport failure (no HTTP status) to a provider error
pub fn network_error(provider: &str, error: &reqwest::Error) -> ProviderError {
    ProviderError::Network {
        provider: provider.to_owned(),
        message: error.to_string(),
    }
}
