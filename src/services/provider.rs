// ABOUTME: Trait seams over the Strava REST client and OAuth helper
// ABOUTME: Lets handlers and workers build per-athlete providers without naming the concrete client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use pierre_core::models::Activity;
use pierre_intelligence::ActivityProvider;
use pierre_providers::{ProviderError, StravaClient, StravaOAuth, StravaTokenResponse};
use std::sync::Arc;

/// Activity provider that can also list an athlete's recent activities
#[async_trait]
pub trait AthleteActivityProvider: ActivityProvider {
    /// Most recent activities, newest first
    async fn recent_activities(&self, count: u32) -> Result<Vec<Activity>, ProviderError>;

    /// View as the analyzer's provider seam
    fn as_activity_provider(&self) -> &dyn ActivityProvider;
}

#[async_trait]
impl AthleteActivityProvider for StravaClient {
    async fn recent_activities(&self, count: u32) -> Result<Vec<Activity>, ProviderError> {
        self.list_athlete_activities(count).await
    }

    fn as_activity_provider(&self) -> &dyn ActivityProvider {
        self
    }
}

/// Builds an authenticated provider for one access token
pub trait ProviderFactory: Send + Sync {
    /// Provider acting on behalf of the token's athlete
    fn connect(&self, access_token: &str) -> Arc<dyn AthleteActivityProvider>;
}

/// Factory for the real Strava API
#[derive(Debug, Clone, Default)]
pub struct StravaProviderFactory {
    api_base_url: Option<String>,
}

impl StravaProviderFactory {
    /// Factory against the public API, or `api_base_url` when set
    #[must_use]
    pub const fn new(api_base_url: Option<String>) -> Self {
        Self { api_base_url }
    }
}

impl ProviderFactory for StravaProviderFactory {
    fn connect(&self, access_token: &str) -> Arc<dyn AthleteActivityProvider> {
        let client = self.api_base_url.as_deref().map_or_else(
            || StravaClient::new(access_token),
            |base_url| StravaClient::with_base_url(access_token, base_url),
        );
        Arc::new(client)
    }
}

/// `OAuth` operations the server needs
#[async_trait]
pub trait OAuthExchange: Send + Sync {
    /// Consent URL for the browser
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` when credentials are missing
    fn authorization_url(&self) -> Result<String, ProviderError>;

    /// Trade an authorization code for tokens
    async fn exchange_code(&self, code: &str) -> Result<StravaTokenResponse, ProviderError>;

    /// Trade a refresh token for a new access token
    async fn refresh_token(&self, refresh_token: &str)
        -> Result<StravaTokenResponse, ProviderError>;
}

#[async_trait]
impl OAuthExchange for StravaOAuth {
    fn authorization_url(&self) -> Result<String, ProviderError> {
        Self::authorization_url(self)
    }

    async fn exchange_code(&self, code: &str) -> Result<StravaTokenResponse, ProviderError> {
        Self::exchange_code(self, code).await
    }

    async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<StravaTokenResponse, ProviderError> {
        Self::refresh_token(self, refresh_token).await
    }
}
