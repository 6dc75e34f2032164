// ABOUTME: Access-token lifecycle for connected athletes
// ABOUTME: Refreshes tokens expiring within five minutes and persists the rotated pair

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::{Database, StravaTokens, User};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use pierre_providers::StravaTokenResponse;
use std::sync::Arc;
use tracing::{info, warn};

use super::provider::OAuthExchange;

/// Tokens expiring within this window are refreshed before use
pub const REFRESH_WINDOW_SECS: i64 = 300;

/// Whether `tokens` must be refreshed at `now`
#[must_use]
pub fn needs_refresh(tokens: &StravaTokens, now: DateTime<Utc>) -> bool {
    tokens.expires_at <= now + Duration::seconds(REFRESH_WINDOW_SECS)
}

/// Convert a token response, keeping `previous_refresh_token` when Strava omits a new one
///
/// # Errors
///
/// Returns an error when no refresh token is available or the expiry is out of range
pub fn tokens_from_response(
    response: &StravaTokenResponse,
    previous_refresh_token: Option<&str>,
) -> AppResult<StravaTokens> {
    let refresh_token = response
        .refresh_token
        .as_deref()
        .or(previous_refresh_token)
        .ok_or_else(|| AppError::external_service("strava", "token response without refresh token"))?;

    Ok(StravaTokens {
        access_token: response.access_token.clone(),
        refresh_token: refresh_token.to_owned(),
        expires_at: response.expires_at_utc()?,
    })
}

/// Hands out access tokens that are valid for at least the refresh window
#[derive(Clone)]
pub struct TokenService {
    database: Database,
    oauth: Arc<dyn OAuthExchange>,
}

impl TokenService {
    /// Create the service
    #[must_use]
    pub fn new(database: Database, oauth: Arc<dyn OAuthExchange>) -> Self {
        Self { database, oauth }
    }

    /// Current access token for `user`, refreshed and persisted when close to expiry
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh call or the database update fails
    pub async fn valid_access_token(&self, user: &User) -> AppResult<String> {
        if !needs_refresh(&user.tokens, Utc::now()) {
            return Ok(user.tokens.access_token.clone());
        }

        info!(
            user_id = %user.id,
            athlete_id = user.strava_id,
            expires_at = %user.tokens.expires_at,
            "Refreshing Strava access token"
        );

        let response = self
            .oauth
            .refresh_token(&user.tokens.refresh_token)
            .await
            .map_err(|e| {
                warn!(user_id = %user.id, error = %e, "Strava token refresh failed");
                AppError::from(e)
            })?;

        let tokens = tokens_from_response(&response, Some(&user.tokens.refresh_token))?;
        self.database.update_user_tokens(user.id, &tokens).await?;
        Ok(tokens.access_token)
    }
}
