// ABOUTME: Provider error type for failures talking to external fitness APIs
// ABOUTME: Distinguishes network, auth, rate-limit, not-found and malformed-response failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// Errors raised by fitness provider clients (fetches and write-backs)
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, TLS, timeout)
    #[error("network error calling {provider}: {message}")]
    Network {
        /// Provider name
        provider: String,
        /// Underlying transport error
        message: String,
    },

    /// The provider answered with a non-success status
    #[error("{provider} API returned {status}: {message}")]
    Api {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// Access token missing, expired or revoked
    #[error("{provider} rejected the access token")]
    Unauthorized {
        /// Provider name
        provider: String,
    },

    /// Requested resource does not exist
    #[error("{resource} not found on {provider}")]
    NotFound {
        /// Provider name
        provider: String,
        /// Resource description
        resource: String,
    },

    /// Provider rate limit exceeded
    #[error("{provider} rate limit exceeded")]
    RateLimited {
        /// Provider name
        provider: String,
        /// Seconds until the limit resets, when advertised
        retry_after_secs: Option<u64>,
    },

    /// Response could not be parsed or failed validation at the ingestion boundary
    #[error("invalid response from {provider}: {message}")]
    InvalidResponse {
        /// Provider name
        provider: String,
        /// What was wrong with the payload
        message: String,
    },

    /// Client is missing credentials or endpoints
    #[error("provider configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Whether retrying the same call later could succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimited { .. })
            || matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}
