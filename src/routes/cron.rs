// ABOUTME: Batch analysis endpoint for scheduled runs
// ABOUTME: Analyzes the most recent activities of every connected athlete behind an optional bearer secret
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Batch analysis route
//!
//! Meant to be hit by an external scheduler. Athletes are processed one after
//! the other; a failure for one athlete is reported in the body and does not
//! stop the batch.

use crate::database::User;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::server::ServerResources;
use axum::{extract::State, routing::get, Json, Router};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use pierre_intelligence::{has_enhanced_title, AnalysisOutcome};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

/// Per-athlete batch result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronUserResult {
    /// Internal user id
    pub user_id: Uuid,
    /// Strava athlete id
    pub athlete_id: u64,
    /// Set when the athlete's activities could not be listed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// One outcome per analyzed activity
    pub outcomes: Vec<AnalysisOutcome>,
}

/// Batch run summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronReport {
    /// Athletes visited
    pub users: usize,
    /// Activities analyzed across all athletes
    pub analyzed: usize,
    /// Activities rewritten
    pub processed: usize,
    /// Per-athlete detail
    pub results: Vec<CronUserResult>,
}

/// Batch analysis routes
pub struct CronRoutes;

impl CronRoutes {
    /// Create the batch routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/cron", get(Self::handle_cron))
            .with_state(resources)
    }

    async fn handle_cron(
        State(resources): State<Arc<ServerResources>>,
        bearer: Option<TypedHeader<Authorization<Bearer>>>,
    ) -> Result<Json<CronReport>, AppError> {
        if let Some(secret) = resources.config.cron.secret.as_deref() {
            let presented = bearer.as_ref().map_or("", |TypedHeader(auth)| auth.token());
            if !bool::from(presented.as_bytes().ct_eq(secret.as_bytes())) {
                warn!("Rejected batch analysis request with invalid secret");
                return Err(AppError::auth_invalid("Invalid cron secret"));
            }
        }

        let users = resources.database.list_users().await?;
        let count = resources.config.cron.activity_count;
        info!(users = users.len(), count, "Starting batch analysis");

        let mut results = Vec::with_capacity(users.len());
        for user in &users {
            let result = match Self::analyze_recent(&resources, user, count).await {
                Ok(outcomes) => CronUserResult {
                    user_id: user.id,
                    athlete_id: user.strava_id,
                    error: None,
                    outcomes,
                },
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "Batch analysis failed for athlete");
                    CronUserResult {
                        user_id: user.id,
                        athlete_id: user.strava_id,
                        error: Some(e.to_string()),
                        outcomes: Vec::new(),
                    }
                }
            };
            results.push(result);
        }

        let analyzed = results.iter().map(|r| r.outcomes.len()).sum();
        let processed = results
            .iter()
            .flat_map(|r| &r.outcomes)
            .filter(|outcome| outcome.processed)
            .count();
        info!(analyzed, processed, "Batch analysis finished");

        Ok(Json(CronReport {
            users: users.len(),
            analyzed,
            processed,
            results,
        }))
    }

    async fn analyze_recent(
        resources: &ServerResources,
        user: &User,
        count: u32,
    ) -> AppResult<Vec<AnalysisOutcome>> {
        let provider = resources.processor.provider_for(user).await?;
        let activities = provider.recent_activities(count).await?;

        let mut outcomes = Vec::with_capacity(activities.len());
        for summary in activities {
            // Summaries carry no description; enriched titles need the detail for the sentinel
            let activity = if has_enhanced_title(&summary.name) {
                match provider.as_activity_provider().fetch_activity(summary.id).await {
                    Ok(detailed) => detailed,
                    Err(error) => {
                        warn!(activity_id = summary.id, error = %error, "Activity detail unavailable");
                        summary
                    }
                }
            } else {
                summary
            };
            let outcome = resources
                .analyzer
                .analyze_activity(&activity, provider.as_activity_provider())
                .await;
            AppLogger::log_analysis_outcome("cron", &outcome);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
