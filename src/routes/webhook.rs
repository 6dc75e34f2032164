// ABOUTME: Strava push subscription endpoint: validation handshake and event ingestion
// ABOUTME: Events are audited, queued for the workers and acknowledged immediately
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Webhook routes
//!
//! Strava expects an answer within two seconds, so `POST /api/webhook` never
//! analyzes inline: it stores a `RECEIVED` audit row and hands the event to
//! the dispatcher.

use crate::database::WebhookEventStatus;
use crate::errors::{AppError, ErrorCode};
use crate::logging::AppLogger;
use crate::server::ServerResources;
use crate::services::WebhookJob;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use pierre_providers::strava::verify_subscription;
use pierre_providers::StravaWebhookEvent;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Subscription validation query (`GET /api/webhook`)
#[derive(Debug, Deserialize)]
struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

/// Webhook routes
pub struct WebhookRoutes;

impl WebhookRoutes {
    /// Create the webhook routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/webhook",
                get(Self::handle_verification).post(Self::handle_event),
            )
            .with_state(resources)
    }

    /// Echo the challenge when the verify token matches
    async fn handle_verification(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<SubscriptionQuery>,
    ) -> Result<Json<Value>, AppError> {
        let expected = resources
            .config
            .strava
            .webhook_verify_token
            .as_deref()
            .unwrap_or_default();

        verify_subscription(
            query.mode.as_deref(),
            query.verify_token.as_deref(),
            query.challenge.as_deref(),
            expected,
        )
        .map_or_else(
            || {
                warn!(mode = ?query.mode, "Rejected webhook subscription validation");
                Err(AppError::permission_denied("Webhook verification failed"))
            },
            |challenge| {
                info!("Webhook subscription validated");
                Ok(Json(json!({ "hub.challenge": challenge })))
            },
        )
    }

    /// Audit, enqueue and acknowledge an event
    async fn handle_event(
        State(resources): State<Arc<ServerResources>>,
        Json(event): Json<StravaWebhookEvent>,
    ) -> Result<Json<Value>, AppError> {
        let event_id = resources.database.record_webhook_event(&event).await?;
        AppLogger::log_webhook_event(
            &event_id.to_string(),
            &event.object_type,
            &event.aspect_type,
            event.object_id,
        );

        if let Err(e) = resources.dispatcher.enqueue(WebhookJob { event_id, event }) {
            warn!(%event_id, error = %e, "Webhook event could not be queued");
            resources
                .database
                .update_webhook_event_status(event_id, WebhookEventStatus::Failed, Some(&e.to_string()))
                .await?;
            return Err(AppError::new(ErrorCode::ResourceUnavailable, e.to_string()));
        }

        Ok(Json(json!({
            "message": "Event received",
            "eventId": event_id,
        })))
    }
}
