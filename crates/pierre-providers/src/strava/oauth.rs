// ABOUTME: Strava OAuth 2.0 flow: authorization URL, code exchange and token refresh
// ABOUTME: Also validates push-subscription verification tokens in constant time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_core::constants::oauth_providers;
use pierre_core::errors::ProviderError;
use subtle::ConstantTimeEq;
use tracing::info;
use url::Url;

use super::client::error_from_status;
use super::models::StravaTokenResponse;
use crate::http_client::{network_error, shared_client};

/// Authorization endpoint
pub const STRAVA_AUTH_URL: &str = "https://www.strava.com/oauth/authorize";

/// Token endpoint (code exchange and refresh)
pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Scopes needed to read laps and rewrite titles/descriptions
pub const STRAVA_SCOPES: &str = "activity:read_all,activity:write";

/// OAuth application credentials
#[derive(Debug, Clone)]
pub struct StravaOAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
}

impl StravaOAuth {
    /// Create the OAuth helper for an application registration
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            token_url: STRAVA_TOKEN_URL.to_owned(),
        }
    }

    /// Use another token endpoint
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Redirect URI registered with Strava
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// URL the browser is sent to for consent
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if the client id is missing
    pub fn authorization_url(&self) -> Result<String, ProviderError> {
        if self.client_id.is_empty() {
            return Err(ProviderError::Configuration(
                "STRAVA_CLIENT_ID is not configured".to_owned(),
            ));
        }
        let url = Url::parse_with_params(
            STRAVA_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("approval_prompt", "auto"),
                ("scope", STRAVA_SCOPES),
            ],
        )
        .map_err(|e| ProviderError::Configuration(format!("invalid authorization URL: {e}")))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens and the athlete profile
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` when Strava rejects the code or is unreachable
    pub async fn exchange_code(&self, code: &str) -> Result<StravaTokenResponse, ProviderError> {
        info!("Exchanging Strava authorization code");
        self.token_request(&[("code", code), ("grant_type", "authorization_code")])
            .await
    }

    /// Obtain a fresh access token from a refresh token
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` when Strava rejects the refresh token or is unreachable
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<StravaTokenResponse, ProviderError> {
        info!("Refreshing Strava access token");
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn token_request(
        &self,
        grant: &[(&str, &str)],
    ) -> Result<StravaTokenResponse, ProviderError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        form.extend_from_slice(grant);

        let response = shared_client()
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| network_error(oauth_providers::STRAVA, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, "OAuth token", None, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                provider: oauth_providers::STRAVA.to_owned(),
                message: format!("failed to parse token response: {e}"),
            })
    }
}

/// Answer to Strava's push-subscription validation request
///
/// Returns the challenge to echo when the mode is `subscribe` and the token
/// matches the configured verify token.
#[must_use]
pub fn verify_subscription<'a>(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&'a str>,
    expected_token: &str,
) -> Option<&'a str> {
    if mode != Some("subscribe") || expected_token.is_empty() {
        return None;
    }
    let token = token?;
    let matches: bool = token.as_bytes().ct_eq(expected_token.as_bytes()).into();
    if matches {
        challenge
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_contains_write_scope() {
        let oauth = StravaOAuth::new("12345", "secret", "https://example.com/api/auth/callback");
        let url = oauth.authorization_url().unwrap();
        assert!(url.starts_with(STRAVA_AUTH_URL));
        assert!(url.contains("client_id=12345"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=activity%3Aread_all%2Cactivity%3Awrite"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fapi%2Fauth%2Fcallback"));
    }

    #[test]
    fn test_missing_client_id_is_configuration_error() {
        let oauth = StravaOAuth::new("", "secret", "http://localhost/api/auth/callback");
        assert!(matches!(
            oauth.authorization_url(),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn test_subscription_verification() {
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("tok"), Some("abc"), "tok"),
            Some("abc")
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("bad"), Some("abc"), "tok"),
            None
        );
        assert_eq!(
            verify_subscription(Some("unsubscribe"), Some("tok"), Some("abc"), "tok"),
            None
        );
    }
}
