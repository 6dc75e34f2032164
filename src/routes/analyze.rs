// ABOUTME: Manual analysis trigger for one activity of the signed-in athlete
// ABOUTME: Fetches the activity and returns the analyzer outcome as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::routes::auth::session_user;
use crate::server::ServerResources;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use pierre_intelligence::{ActivityProvider, AnalysisOutcome};
use std::sync::Arc;

/// Manual analysis routes
pub struct AnalyzeRoutes;

impl AnalyzeRoutes {
    /// Create the analysis routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analyze/:activity_id", get(Self::handle_analyze))
            .with_state(resources)
    }

    /// Analyze one activity now; skips and failures are reported in the outcome body
    async fn handle_analyze(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(activity_id): Path<u64>,
    ) -> Result<Json<AnalysisOutcome>, AppError> {
        let user = session_user(&headers, &resources).await?;
        let provider = resources.processor.provider_for(&user).await?;
        let activity = provider.fetch_activity(activity_id).await?;

        let outcome = resources
            .analyzer
            .analyze_activity(&activity, provider.as_activity_provider())
            .await;
        AppLogger::log_analysis_outcome("manual", &outcome);
        Ok(Json(outcome))
    }
}
