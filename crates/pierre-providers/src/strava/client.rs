// ABOUTME: Strava REST client for activities, laps, activity lists and write-back
// ABOUTME: Maps HTTP statuses to ProviderError and implements the analyzer's ActivityProvider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use pierre_core::constants::oauth_providers;
use pierre_core::errors::ProviderError;
use pierre_core::models::{Activity, ActivityUpdate, Lap};
use pierre_intelligence::ActivityProvider;
use reqwest::{header, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{laps_from_response, StravaActivityResponse, StravaLapResponse};
use crate::http_client::{network_error, shared_client};

/// Strava REST API base URL
pub const STRAVA_API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Upper bound Strava accepts for `per_page`
const MAX_PER_PAGE: u32 = 200;

/// Authenticated Strava client for one athlete
#[derive(Clone)]
pub struct StravaClient {
    access_token: String,
    base_url: String,
}

impl StravaClient {
    /// Create a client against the public API
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, STRAVA_API_BASE_URL)
    }

    /// Create a client against another base URL (proxies, test servers)
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Response, ProviderError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| network_error(oauth_providers::STRAVA, &e))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response, resource).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        resource: &str,
    ) -> Result<T, ProviderError> {
        let response = self.send(shared_client().get(self.url(endpoint)), resource).await?;
        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                provider: oauth_providers::STRAVA.to_owned(),
                message: format!("failed to parse {resource}: {e}"),
            })
    }

    /// Fetch the detailed representation of an activity
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on transport, HTTP or validation failure
    pub async fn get_activity(&self, activity_id: u64) -> Result<Activity, ProviderError> {
        let resource = format!("activity {activity_id}");
        let response: StravaActivityResponse = self
            .get_json(&format!("activities/{activity_id}"), &resource)
            .await?;
        response.into_activity()
    }

    /// Fetch the laps of an activity in recorded order
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on transport, HTTP or validation failure
    pub async fn get_activity_laps(&self, activity_id: u64) -> Result<Vec<Lap>, ProviderError> {
        let resource = format!("laps of activity {activity_id}");
        let laps: Vec<StravaLapResponse> = self
            .get_json(&format!("activities/{activity_id}/laps"), &resource)
            .await?;
        debug!(activity_id, lap_count = laps.len(), "Fetched Strava laps");
        laps_from_response(laps)
    }

    /// Most recent activities of the authenticated athlete (summary representation)
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on transport, HTTP or validation failure
    pub async fn list_athlete_activities(
        &self,
        per_page: u32,
    ) -> Result<Vec<Activity>, ProviderError> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let activities: Vec<StravaActivityResponse> = self
            .get_json(
                &format!("athlete/activities?per_page={per_page}&page=1"),
                "athlete activities",
            )
            .await?;
        activities
            .into_iter()
            .map(StravaActivityResponse::into_activity)
            .collect()
    }

    /// Write a new title and/or description
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on transport or HTTP failure
    pub async fn update_activity(
        &self,
        activity_id: u64,
        update: &ActivityUpdate,
    ) -> Result<(), ProviderError> {
        let resource = format!("activity {activity_id}");
        let request = shared_client()
            .put(self.url(&format!("activities/{activity_id}")))
            .json(update);
        self.send(request, &resource).await?;
        debug!(
            activity_id,
            title_updated = update.name.is_some(),
            "Strava activity updated"
        );
        Ok(())
    }
}

/// Convert a non-success response into a typed provider error
async fn error_from_response(response: Response, resource: &str) -> ProviderError {
    let status = response.status();
    let retry_after_secs = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok());
    let body = response.text().await.unwrap_or_default();
    let error = error_from_status(status, resource, retry_after_secs, &body);
    warn!(status = status.as_u16(), resource, "Strava API request failed: {error}");
    error
}

/// Map a status code and body to a provider error
#[must_use]
pub fn error_from_status(
    status: StatusCode,
    resource: &str,
    retry_after_secs: Option<u64>,
    body: &str,
) -> ProviderError {
    let provider = oauth_providers::STRAVA.to_owned();
    match status {
        StatusCode::UNAUTHORIZED => ProviderError::Unauthorized { provider },
        StatusCode::NOT_FOUND => ProviderError::NotFound {
            provider,
            resource: resource.to_owned(),
        },
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
            provider,
            retry_after_secs,
        },
        _ => ProviderError::Api {
            provider,
            status: status.as_u16(),
            message: api_message(body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned()),
        },
    }
}

/// Strava error bodies look like `{"message": "...", "errors": [...]}`
fn api_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}

#[async_trait]
impl ActivityProvider for StravaClient {
    async fn fetch_activity(&self, activity_id: u64) -> Result<Activity, ProviderError> {
        self.get_activity(activity_id).await
    }

    async fn fetch_laps(&self, activity_id: u64) -> Result<Vec<Lap>, ProviderError> {
        self.get_activity_laps(activity_id).await
    }

    async fn update_activity(
        &self,
        activity_id: u64,
        update: &ActivityUpdate,
    ) -> Result<(), ProviderError> {
        Self::update_activity(self, activity_id, update).await
    }
}
