// ABOUTME: Processes one Strava activity webhook event end to end
// ABOUTME: Filters event kinds, resolves the athlete and token, fetches the activity and runs the analyzer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::{Database, User};
use crate::errors::AppError;
use pierre_intelligence::{ActivityAnalyzer, AnalysisOutcome};
use pierre_providers::StravaWebhookEvent;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::provider::{AthleteActivityProvider, ProviderFactory};
use super::tokens::TokenService;

/// Result of processing one webhook event
#[derive(Debug, Clone, Serialize)]
pub struct WebhookProcessingResult {
    /// False when processing failed
    pub success: bool,
    /// True when the activity was rewritten
    pub processed: bool,
    /// Human-readable summary
    pub message: String,
    /// Analyzer outcome, when the analyzer ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AnalysisOutcome>,
}

impl WebhookProcessingResult {
    fn ignored(message: impl Into<String>) -> Self {
        Self {
            success: true,
            processed: false,
            message: message.into(),
            outcome: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            processed: false,
            message: message.into(),
            outcome: None,
        }
    }

    fn from_outcome(outcome: AnalysisOutcome) -> Self {
        Self {
            success: outcome.success,
            processed: outcome.processed,
            message: outcome.message.clone(),
            outcome: Some(outcome),
        }
    }
}

/// Everything needed to turn a webhook event into an analysis
#[derive(Clone)]
pub struct WebhookProcessor {
    database: Database,
    tokens: TokenService,
    providers: Arc<dyn ProviderFactory>,
    analyzer: Arc<ActivityAnalyzer>,
}

impl WebhookProcessor {
    /// Create the processor
    #[must_use]
    pub fn new(
        database: Database,
        tokens: TokenService,
        providers: Arc<dyn ProviderFactory>,
        analyzer: Arc<ActivityAnalyzer>,
    ) -> Self {
        Self {
            database,
            tokens,
            providers,
            analyzer,
        }
    }

    /// Authenticated provider for a stored athlete
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be refreshed
    pub async fn provider_for(
        &self,
        user: &User,
    ) -> Result<Arc<dyn AthleteActivityProvider>, AppError> {
        let access_token = self.tokens.valid_access_token(user).await?;
        Ok(self.providers.connect(&access_token))
    }

    /// Analyze the activity an event points at
    ///
    /// Never fails: every error becomes an unsuccessful result.
    pub async fn process_activity_webhook(
        &self,
        event: &StravaWebhookEvent,
    ) -> WebhookProcessingResult {
        if !event.is_activity() {
            debug!(object_type = %event.object_type, "Ignoring non-activity webhook event");
            return WebhookProcessingResult::ignored(format!(
                "Ignored {} event",
                event.object_type
            ));
        }
        if !event.is_create_or_update() {
            debug!(aspect_type = %event.aspect_type, activity_id = event.object_id, "Ignoring webhook aspect");
            return WebhookProcessingResult::ignored(format!(
                "Ignored activity {} event",
                event.aspect_type
            ));
        }

        let user = match self.database.get_user_by_strava_id(event.owner_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(athlete_id = event.owner_id, "Webhook event for unknown athlete");
                return WebhookProcessingResult::failed(format!(
                    "Athlete {} is not connected",
                    event.owner_id
                ));
            }
            Err(e) => return WebhookProcessingResult::failed(e.message),
        };

        let provider = match self.provider_for(&user).await {
            Ok(provider) => provider,
            Err(e) => return WebhookProcessingResult::failed(e.message),
        };

        let activity = match provider.fetch_activity(event.object_id).await {
            Ok(activity) => activity,
            Err(e) => {
                warn!(activity_id = event.object_id, error = %e, "Failed to fetch webhook activity");
                return WebhookProcessingResult::failed(e.to_string());
            }
        };

        let outcome = self
            .analyzer
            .analyze_activity(&activity, provider.as_activity_provider())
            .await;
        WebhookProcessingResult::from_outcome(outcome)
    }
}
