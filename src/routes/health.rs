// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness at /health, readiness (database reachable) at /ready
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring

use crate::server::ServerResources;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": "pierre-intervals",
            "strava": resources.config.strava_configured(),
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339()
        }))
    }

    /// Ready once the database answers; reports webhook queue pressure
    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> (StatusCode, Json<Value>) {
        let queue = json!({
            "pending": resources.dispatcher.pending(),
            "capacity": resources.dispatcher.capacity(),
        });

        let (status, label) = match resources.database.ping().await {
            Ok(()) => (StatusCode::OK, "ready"),
            Err(e) => {
                warn!(error = %e, "Readiness check failed");
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
            }
        };

        (
            status,
            Json(json!({
                "status": label,
                "database": status == StatusCode::OK,
                "webhookQueue": queue,
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
    }
}
