// ABOUTME: Recent activity listing for the signed-in athlete
// ABOUTME: Marks which activities already show a generated annotation
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use crate::routes::auth::session_user;
use crate::server::ServerResources;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use pierre_core::models::Activity;
use pierre_intelligence::shows_annotation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of activities returned
const DEFAULT_COUNT: u32 = 5;

/// Largest page Strava serves
const MAX_COUNT: u32 = 200;

#[derive(Debug, Deserialize)]
struct ActivitiesQuery {
    count: Option<u32>,
}

/// One listed activity
#[derive(Debug, Serialize)]
pub struct ActivityListItem {
    /// Activity as returned by Strava
    #[serde(flatten)]
    pub activity: Activity,
    /// Description or enriched title shows a generated annotation
    pub analyzed: bool,
}

/// Activity listing routes
pub struct ActivityRoutes;

impl ActivityRoutes {
    /// Create the activity routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/activities", get(Self::handle_list))
            .with_state(resources)
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ActivitiesQuery>,
    ) -> Result<Json<Vec<ActivityListItem>>, AppError> {
        let user = session_user(&headers, &resources).await?;
        let count = query.count.unwrap_or(DEFAULT_COUNT).clamp(1, MAX_COUNT);

        let provider = resources.processor.provider_for(&user).await?;
        let activities = provider.recent_activities(count).await?;

        Ok(Json(
            activities
                .into_iter()
                .map(|activity| ActivityListItem {
                    analyzed: shows_annotation(&activity),
                    activity,
                })
                .collect(),
        ))
    }
}
