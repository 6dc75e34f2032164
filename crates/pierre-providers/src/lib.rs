// ABOUTME: Fitness data provider implementations for the interval annotation service
// ABOUTME: Strava REST client, OAuth flow, webhook payloads and the shared HTTP client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Fitness data provider implementations.
//!
//! Provider payloads are validated into `pierre_core` models here, so the
//! analysis engine never sees partially populated records.

/// Shared HTTP client for provider API calls
pub mod http_client;
/// Strava API provider
pub mod strava;

pub use http_client::{initialize_shared_client, shared_client, HttpClientTimeouts};
pub use pierre_core::errors::ProviderError;
pub use strava::{StravaClient, StravaOAuth, StravaTokenResponse, StravaWebhookEvent};
