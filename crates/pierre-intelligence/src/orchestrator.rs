// ABOUTME: Activity analysis orchestrator running classify, segment, format, compose and update
// ABOUTME: Converts every failure into an AnalysisOutcome and re-checks the sentinel before writing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Activity Analysis Orchestrator
//!
//! ```text
//! RECEIVED -> CLASSIFYING -> SKIPPED
//!                         -> SEGMENTING -> FORMATTING -> COMPOSING -> UPDATING -> COMPLETED
//!                         -> FAILED (from any non-terminal state)
//! ```
//!
//! The orchestrator holds no mutable state and may run concurrently for
//! different activities. Duplicate deliveries of the same activity are
//! narrowed by re-reading the description right before the write-back.

use async_trait::async_trait;
use pierre_core::errors::ProviderError;
use pierre_core::models::{Activity, ActivityUpdate, Lap};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::classifier::{Classification, SegmentClassifier, SkipReason};
use crate::composer::{
    compose_interval_description, compose_tempo_description, generate_enhanced_title,
    DescriptionStats,
};
use crate::config::IntervalDetectionConfig;
use crate::error::AnalysisError;
use crate::formatter::{format_pace, StatisticsFormatter};
use crate::segmenter::IntervalSegmenter;

/// Source of activity data and target of the write-back
#[async_trait]
pub trait ActivityProvider: Send + Sync {
    /// Fetch the current state of an activity
    async fn fetch_activity(&self, activity_id: u64) -> Result<Activity, ProviderError>;

    /// Fetch the ordered laps of an activity
    async fn fetch_laps(&self, activity_id: u64) -> Result<Vec<Lap>, ProviderError>;

    /// Write a new title and/or description
    async fn update_activity(
        &self,
        activity_id: u64,
        update: &ActivityUpdate,
    ) -> Result<(), ProviderError>;
}

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisState {
    /// Activity accepted for analysis
    Received,
    /// Running the segment classifier
    Classifying,
    /// Terminal: activity left untouched
    Skipped,
    /// Partitioning laps
    Segmenting,
    /// Deriving statistics
    Formatting,
    /// Building title and description
    Composing,
    /// Writing back to the provider
    Updating,
    /// Terminal: activity annotated
    Completed,
    /// Terminal: analysis failed, activity untouched
    Failed,
}

impl AnalysisState {
    /// Upper-case state name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Classifying => "CLASSIFYING",
            Self::Skipped => "SKIPPED",
            Self::Segmenting => "SEGMENTING",
            Self::Formatting => "FORMATTING",
            Self::Composing => "COMPOSING",
            Self::Updating => "UPDATING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// False only when the run failed
    pub success: bool,
    /// True when the activity was rewritten
    pub processed: bool,
    /// Terminal state reached
    pub state: AnalysisState,
    /// Human-readable summary
    pub message: String,
    /// Why the activity was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    /// Activity identifier
    pub activity_id: u64,
    /// Activity as written, when processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
}

impl AnalysisOutcome {
    fn skipped(activity: &Activity, reason: SkipReason, detail: Option<&str>) -> Self {
        let message = detail.map_or_else(
            || format!("Activity \"{}\" skipped: {reason}", activity.name),
            |detail| format!("Activity \"{}\" skipped: {reason} ({detail})", activity.name),
        );
        Self {
            success: true,
            processed: false,
            state: AnalysisState::Skipped,
            message,
            reason: Some(reason),
            activity_id: activity.id,
            activity: None,
        }
    }

    fn completed(original_name: &str, annotated: Activity) -> Self {
        Self {
            success: true,
            processed: true,
            state: AnalysisState::Completed,
            message: format!("Activity \"{original_name}\" updated"),
            reason: None,
            activity_id: annotated.id,
            activity: Some(annotated),
        }
    }

    fn failed(activity: &Activity, error: &AnalysisError) -> Self {
        Self {
            success: false,
            processed: false,
            state: AnalysisState::Failed,
            message: error.to_string(),
            reason: None,
            activity_id: activity.id,
            activity: None,
        }
    }
}

fn transition(activity_id: u64, state: AnalysisState) {
    debug!(activity_id, state = state.as_str(), "Analysis state transition");
}

/// Runs the interval pipeline for one activity at a time
pub struct ActivityAnalyzer {
    config: IntervalDetectionConfig,
}

impl ActivityAnalyzer {
    /// Create an analyzer with injected configuration
    #[must_use]
    pub const fn new(config: IntervalDetectionConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &IntervalDetectionConfig {
        &self.config
    }

    /// Analyze an activity and annotate it when it is an interval workout
    ///
    /// Never fails: provider and data errors are reported as a `FAILED` outcome.
    pub async fn analyze_activity(
        &self,
        activity: &Activity,
        provider: &dyn ActivityProvider,
    ) -> AnalysisOutcome {
        transition(activity.id, AnalysisState::Received);
        match self.run(activity, provider).await {
            Ok(outcome) => {
                debug!(
                    activity_id = activity.id,
                    state = outcome.state.as_str(),
                    processed = outcome.processed,
                    "{}",
                    outcome.message
                );
                outcome
            }
            Err(error) => {
                transition(activity.id, AnalysisState::Failed);
                warn!(activity_id = activity.id, error = %error, "Activity analysis failed");
                AnalysisOutcome::failed(activity, &error)
            }
        }
    }

    /// Segment, format and compose the interval annotation for `laps`
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] when no work lap can be identified
    pub fn prepare_interval_update(
        &self,
        activity: &Activity,
        laps: &[Lap],
    ) -> Result<ActivityUpdate, AnalysisError> {
        transition(activity.id, AnalysisState::Segmenting);
        let segmentation =
            IntervalSegmenter::new(&self.config.segmenter).segment_workout(activity, laps);
        if !segmentation.has_work() {
            return Err(AnalysisError::InvalidInput(format!(
                "no work laps found among {} laps",
                laps.len()
            )));
        }

        transition(activity.id, AnalysisState::Formatting);
        let stats = StatisticsFormatter::new(&self.config.formatter).compute(&segmentation);

        transition(activity.id, AnalysisState::Composing);
        let description = compose_interval_description(&stats);
        let title = generate_enhanced_title(&activity.name, &DescriptionStats::from(&stats));
        Ok(ActivityUpdate::new(title, description))
    }

    async fn run(
        &self,
        activity: &Activity,
        provider: &dyn ActivityProvider,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        transition(activity.id, AnalysisState::Classifying);
        if activity.has_generated_annotation() {
            return Ok(Self::skip(activity, SkipReason::AlreadyAnalyzed, None));
        }

        let classifier = SegmentClassifier::new(&self.config.classifier);
        let laps = match classifier.classify_metadata(activity) {
            Some(Classification::Skip(reason)) => return Ok(Self::skip(activity, reason, None)),
            Some(Classification::Interval(_)) => provider.fetch_laps(activity.id).await?,
            None => {
                let laps = match provider.fetch_laps(activity.id).await {
                    Ok(laps) => laps,
                    Err(error) => {
                        let detail = error.to_string();
                        return Ok(Self::skip(
                            activity,
                            SkipReason::SegmentsUnavailable,
                            Some(&detail),
                        ));
                    }
                };
                match classifier.classify_laps(activity, &laps) {
                    Classification::Interval(_) => laps,
                    Classification::Skip(SkipReason::TempoRun)
                        if self.config.annotate_tempo_runs =>
                    {
                        return self.annotate_tempo(activity, &laps, provider).await;
                    }
                    Classification::Skip(reason) => {
                        return Ok(Self::skip(activity, reason, None));
                    }
                }
            }
        };

        let update = self.prepare_interval_update(activity, &laps)?;
        Self::write_back(activity, update, provider).await
    }

    async fn annotate_tempo(
        &self,
        activity: &Activity,
        laps: &[Lap],
        provider: &dyn ActivityProvider,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let classifier = SegmentClassifier::new(&self.config.classifier);
        let Some(main) = classifier.detect_tempo(laps) else {
            return Ok(Self::skip(activity, SkipReason::TempoRun, None));
        };

        transition(activity.id, AnalysisState::Composing);
        let description = compose_tempo_description(
            laps,
            main,
            self.config.formatter.cooldown_min_display_distance_m,
        )
        .ok_or_else(|| AnalysisError::InvalidInput("tempo lap out of range".into()))?;
        let stats = DescriptionStats {
            average_pace: Some(format_pace(laps[main].average_speed)),
            recovery: None,
        };
        let title = generate_enhanced_title(&activity.name, &stats);

        Self::write_back(activity, ActivityUpdate::new(title, description), provider).await
    }

    async fn write_back(
        activity: &Activity,
        update: ActivityUpdate,
        provider: &dyn ActivityProvider,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        transition(activity.id, AnalysisState::Updating);

        let current = provider.fetch_activity(activity.id).await?;
        if current.has_generated_annotation() {
            return Ok(Self::skip(
                activity,
                SkipReason::AlreadyAnalyzed,
                Some("annotated concurrently"),
            ));
        }

        let applied = match provider.update_activity(activity.id, &update).await {
            Ok(()) => update,
            Err(error) => {
                warn!(
                    activity_id = activity.id,
                    error = %error,
                    "Title and description update rejected, retrying with description only"
                );
                let fallback = update.description_only();
                provider.update_activity(activity.id, &fallback).await?;
                fallback
            }
        };

        transition(activity.id, AnalysisState::Completed);
        Ok(AnalysisOutcome::completed(
            &activity.name,
            current.annotated(&applied),
        ))
    }

    fn skip(activity: &Activity, reason: SkipReason, detail: Option<&str>) -> AnalysisOutcome {
        transition(activity.id, AnalysisState::Skipped);
        AnalysisOutcome::skipped(activity, reason, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pierre_core::models::SportType;
    use std::sync::Mutex;

    struct StubProvider {
        laps: Vec<Lap>,
        current: Activity,
        updates: Mutex<Vec<ActivityUpdate>>,
    }

    #[async_trait]
    impl ActivityProvider for StubProvider {
        async fn fetch_activity(&self, _activity_id: u64) -> Result<Activity, ProviderError> {
            Ok(self.current.clone())
        }

        async fn fetch_laps(&self, _activity_id: u64) -> Result<Vec<Lap>, ProviderError> {
            Ok(self.laps.clone())
        }

        async fn update_activity(
            &self,
            _activity_id: u64,
            update: &ActivityUpdate,
        ) -> Result<(), ProviderError> {
            self.updates.lock().unwrap().push(update.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sentinel_written_concurrently_prevents_write() {
        let activity = Activity::new(7, "4x1000", SportType::Run);
        let provider = StubProvider {
            laps: vec![
                Lap::new(1, 1000.0, 240, 240, 4.2),
                Lap::new(2, 300.0, 120, 120, 2.5),
                Lap::new(3, 1000.0, 240, 240, 4.2),
                Lap::new(4, 300.0, 120, 120, 2.5),
            ],
            current: activity
                .clone()
                .with_description("🏃 INTERVALLES 2x4' (R2'):"),
            updates: Mutex::new(Vec::new()),
        };

        let analyzer = ActivityAnalyzer::new(IntervalDetectionConfig::default());
        let outcome = analyzer.analyze_activity(&activity, &provider).await;

        assert_eq!(outcome.state, AnalysisState::Skipped);
        assert_eq!(outcome.reason, Some(SkipReason::AlreadyAnalyzed));
        assert!(provider.updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prepare_rejects_empty_laps() {
        let analyzer = ActivityAnalyzer::new(IntervalDetectionConfig::default());
        let activity = Activity::new(7, "4x1000", SportType::Run);
        assert!(matches!(
            analyzer.prepare_interval_update(&activity, &[]),
            Err(AnalysisError::InvalidInput(_))
        ));
    }
}
