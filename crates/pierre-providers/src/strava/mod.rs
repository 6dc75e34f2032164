// ABOUTME: Strava provider module: REST client, OAuth flow and API payload models
// ABOUTME: Re-exports the client, OAuth helper and webhook/token DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// REST client
pub mod client;
/// API payload models
pub mod models;
/// OAuth 2.0 flow
pub mod oauth;

pub use client::{StravaClient, STRAVA_API_BASE_URL};
pub use models::{
    StravaActivityResponse, StravaAthleteSummary, StravaLapResponse, StravaTokenResponse,
    StravaWebhookEvent,
};
pub use oauth::{verify_subscription, StravaOAuth, STRAVA_SCOPES};
