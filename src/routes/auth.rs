// ABOUTME: Strava OAuth and browser session routes
// ABOUTME: Authorization URL, code callback, session status and logout over the user_id cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes
//!
//! The browser session is a single `HttpOnly` cookie holding the internal user
//! id. It is set by the `OAuth` callback and read by the analysis routes.

use crate::database::User;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::security::cookies::{clear_user_cookie, get_cookie_value, set_user_cookie, USER_ID_COOKIE};
use crate::server::ServerResources;
use crate::services::tokens::tokens_from_response;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// `OAuth` callback query
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
}

/// Resolve the session cookie to a stored athlete
///
/// # Errors
///
/// Returns `AuthRequired` when the cookie is missing, malformed or unknown
pub async fn session_user(headers: &HeaderMap, resources: &ServerResources) -> AppResult<User> {
    let cookie = get_cookie_value(headers, USER_ID_COOKIE).ok_or_else(AppError::auth_required)?;
    let user_id = Uuid::parse_str(&cookie).map_err(|_| AppError::auth_invalid("Invalid session"))?;
    resources
        .database
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::auth_invalid("Unknown session"))
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/url", get(Self::handle_auth_url))
            .route("/api/auth/callback", get(Self::handle_callback))
            .route("/api/auth/status", get(Self::handle_status))
            .route("/api/auth/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    async fn handle_auth_url(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Json<Value>, AppError> {
        let url = resources.oauth.authorization_url()?;
        Ok(Json(json!({ "url": url })))
    }

    /// Exchange the code, store the athlete, open the session and go home
    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<CallbackQuery>,
    ) -> Result<Response, AppError> {
        if let Some(error) = query.error {
            warn!(error = %error, "Strava authorization denied");
            return Err(AppError::auth_invalid(format!("Authorization denied: {error}")));
        }
        let code = query
            .code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AppError::invalid_input("Missing authorization code"))?;

        let response = resources.oauth.exchange_code(&code).await?;
        let athlete = response.athlete.as_ref().ok_or_else(|| {
            AppError::external_service("strava", "token response without athlete")
        })?;
        let tokens = tokens_from_response(&response, None)?;

        let user = resources
            .database
            .upsert_strava_user(athlete.id, &athlete.display_name(), &tokens)
            .await?;
        AppLogger::log_oauth_event(athlete.id, "authorization_code", true);
        info!(user_id = %user.id, athlete_id = user.strava_id, "Athlete connected");

        let mut headers = HeaderMap::new();
        set_user_cookie(&mut headers, &user.id.to_string(), resources.secure_cookies());
        Ok((headers, Redirect::to("/")).into_response())
    }

    async fn handle_status(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Json<Value> {
        match session_user(&headers, &resources).await {
            Ok(user) => Json(json!({
                "isAuthenticated": true,
                "user": user.summary(),
            })),
            Err(_) => Json(json!({ "isAuthenticated": false })),
        }
    }

    async fn handle_logout(State(resources): State<Arc<ServerResources>>) -> Response {
        let mut headers = HeaderMap::new();
        clear_user_cookie(&mut headers, resources.secure_cookies());
        (headers, Json(json!({ "success": true }))).into_response()
    }
}
