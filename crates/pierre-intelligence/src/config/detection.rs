// ABOUTME: Tunable thresholds for interval workout detection replacing magic numbers
// ABOUTME: Provides defaults, INTERVALS_* environment overrides and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Interval Detection Configuration
//!
//! Every boundary the heuristics use (speed spread, tempo share, warm-up
//! minimums, descriptor tolerances) lives here so it can be tuned per
//! deployment. The configuration is built once at startup and injected into
//! [`crate::ActivityAnalyzer`]; the analysis code never reads the process
//! environment itself.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Interval detection configuration errors
#[derive(Debug, Error)]
pub enum IntervalConfigError {
    /// Environment variable present but not parseable
    #[error("Invalid value for {variable}: {value}")]
    InvalidValue {
        /// Variable name
        variable: &'static str,
        /// Raw value that failed to parse
        value: String,
    },

    /// Configuration values are inconsistent
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Thresholds for the segment classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    /// Case-insensitive keyword marking an endurance run
    pub endurance_keyword: String,
    /// Laps must be strictly longer than this to count (meters)
    pub min_lap_distance_m: f64,
    /// Laps must move strictly longer than this to count (seconds)
    pub min_lap_moving_time_s: u64,
    /// Minimum number of significant laps before heuristics apply
    pub min_significant_laps: usize,
    /// Flag A: (fastest - slowest) must exceed this share of average speed
    pub speed_spread_ratio: f64,
    /// Flag B: fastest / slowest must exceed this ratio
    pub speed_ratio: f64,
    /// Flag C: heart-rate spread must exceed this share of the slow lap's HR
    pub heart_rate_spread_ratio: f64,
    /// Flag D: minimum distance of a single long repetition (meters)
    pub long_lap_distance_m: f64,
    /// Flag D: mid-session long lap must be this much faster than average
    pub long_lap_speed_ratio: f64,
    /// Tempo: share of total distance held by the longest lap
    pub tempo_distance_share: f64,
    /// Tempo: minimum distance of the sustained lap (meters)
    pub tempo_min_distance_m: f64,
}

/// Thresholds for the interval segmenter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterThresholds {
    /// Warm-up lap must be strictly longer than this (meters)
    pub warmup_min_distance_m: f64,
    /// Warm-up lap must move strictly longer than this (seconds)
    pub warmup_min_moving_time_s: u64,
    /// A lap faster than average by this ratio counts as a work lap
    pub fast_lap_speed_ratio: f64,
    /// Trailing laps shorter than this are dropped from the cool-down (seconds)
    pub cooldown_min_moving_time_s: u64,
}

/// Tolerances and display rules for the statistics formatter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterTolerances {
    /// Max deviation from the first lap's elapsed time for a time descriptor (seconds)
    pub time_tolerance_s: u64,
    /// Max deviation from the first lap's distance for a distance descriptor (meters)
    pub distance_tolerance_m: f64,
    /// Cool-down is only shown above this aggregated distance (meters)
    pub cooldown_min_display_distance_m: f64,
}

/// Complete interval detection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalDetectionConfig {
    /// Classifier thresholds
    pub classifier: ClassifierThresholds,
    /// Segmenter thresholds
    pub segmenter: SegmenterThresholds,
    /// Formatter tolerances
    pub formatter: FormatterTolerances,
    /// Write a sustained-effort description for activities classified as tempo runs
    pub annotate_tempo_runs: bool,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            endurance_keyword: "endurance".to_owned(),
            min_lap_distance_m: 100.0,
            min_lap_moving_time_s: 30,
            min_significant_laps: 2,
            speed_spread_ratio: 0.15,
            speed_ratio: 1.2,
            heart_rate_spread_ratio: 0.10,
            long_lap_distance_m: 3000.0,
            long_lap_speed_ratio: 1.15,
            tempo_distance_share: 0.5,
            tempo_min_distance_m: 3000.0,
        }
    }
}

impl Default for SegmenterThresholds {
    fn default() -> Self {
        Self {
            warmup_min_distance_m: 1000.0,
            warmup_min_moving_time_s: 300, // 5 minutes
            fast_lap_speed_ratio: 1.1,
            cooldown_min_moving_time_s: 60,
        }
    }
}

impl Default for FormatterTolerances {
    fn default() -> Self {
        Self {
            time_tolerance_s: 5,
            distance_tolerance_m: 20.0,
            cooldown_min_display_distance_m: 200.0,
        }
    }
}

/// Parse `variable` into `target` when it is set
fn apply_override<T: FromStr>(
    variable: &'static str,
    target: &mut T,
) -> Result<(), IntervalConfigError> {
    if let Ok(value) = env::var(variable) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| IntervalConfigError::InvalidValue { variable, value })?;
    }
    Ok(())
}

impl IntervalDetectionConfig {
    /// Load configuration from environment variables with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an `INTERVALS_*` variable cannot be parsed or the
    /// resulting configuration fails validation
    pub fn from_environment() -> Result<Self, IntervalConfigError> {
        let mut config = Self::default();

        let classifier = &mut config.classifier;
        apply_override("INTERVALS_MIN_LAP_DISTANCE_M", &mut classifier.min_lap_distance_m)?;
        apply_override("INTERVALS_MIN_LAP_MOVING_TIME_S", &mut classifier.min_lap_moving_time_s)?;
        apply_override("INTERVALS_SPEED_SPREAD_RATIO", &mut classifier.speed_spread_ratio)?;
        apply_override("INTERVALS_SPEED_RATIO", &mut classifier.speed_ratio)?;
        apply_override("INTERVALS_HR_SPREAD_RATIO", &mut classifier.heart_rate_spread_ratio)?;
        apply_override("INTERVALS_LONG_LAP_DISTANCE_M", &mut classifier.long_lap_distance_m)?;
        apply_override("INTERVALS_LONG_LAP_SPEED_RATIO", &mut classifier.long_lap_speed_ratio)?;
        apply_override("INTERVALS_TEMPO_DISTANCE_SHARE", &mut classifier.tempo_distance_share)?;
        apply_override("INTERVALS_TEMPO_MIN_DISTANCE_M", &mut classifier.tempo_min_distance_m)?;

        let segmenter = &mut config.segmenter;
        apply_override("INTERVALS_WARMUP_MIN_DISTANCE_M", &mut segmenter.warmup_min_distance_m)?;
        apply_override(
            "INTERVALS_WARMUP_MIN_MOVING_TIME_S",
            &mut segmenter.warmup_min_moving_time_s,
        )?;
        apply_override("INTERVALS_FAST_LAP_SPEED_RATIO", &mut segmenter.fast_lap_speed_ratio)?;

        let formatter = &mut config.formatter;
        apply_override("INTERVALS_TIME_TOLERANCE_S", &mut formatter.time_tolerance_s)?;
        apply_override("INTERVALS_DISTANCE_TOLERANCE_M", &mut formatter.distance_tolerance_m)?;

        apply_override("INTERVALS_ANNOTATE_TEMPO", &mut config.annotate_tempo_runs)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if any threshold is out of range
    pub fn validate(&self) -> Result<(), IntervalConfigError> {
        let classifier = &self.classifier;

        if classifier.endurance_keyword.trim().is_empty() {
            return Err(IntervalConfigError::ValidationFailed(
                "endurance_keyword must not be empty".into(),
            ));
        }

        if classifier.min_significant_laps < 2 {
            return Err(IntervalConfigError::ValidationFailed(
                "min_significant_laps must be >= 2".into(),
            ));
        }

        if classifier.speed_spread_ratio <= 0.0 || classifier.heart_rate_spread_ratio <= 0.0 {
            return Err(IntervalConfigError::ValidationFailed(
                "spread ratios must be > 0".into(),
            ));
        }

        if classifier.speed_ratio <= 1.0 || classifier.long_lap_speed_ratio <= 1.0 {
            return Err(IntervalConfigError::ValidationFailed(
                "speed ratios must be > 1".into(),
            ));
        }

        if !(0.0..1.0).contains(&classifier.tempo_distance_share) {
            return Err(IntervalConfigError::ValidationFailed(
                "tempo_distance_share must be between 0 and 1".into(),
            ));
        }

        if classifier.min_lap_distance_m < 0.0
            || classifier.long_lap_distance_m <= 0.0
            || classifier.tempo_min_distance_m <= 0.0
        {
            return Err(IntervalConfigError::ValidationFailed(
                "distance thresholds must be positive".into(),
            ));
        }

        if self.segmenter.fast_lap_speed_ratio <= 1.0 {
            return Err(IntervalConfigError::ValidationFailed(
                "fast_lap_speed_ratio must be > 1".into(),
            ));
        }

        if self.formatter.distance_tolerance_m < 0.0 {
            return Err(IntervalConfigError::ValidationFailed(
                "distance_tolerance_m must be >= 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IntervalDetectionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_speed_ratio_below_one() {
        let mut config = IntervalDetectionConfig::default();
        config.classifier.speed_ratio = 0.9;
        assert!(matches!(
            config.validate(),
            Err(IntervalConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_rejects_tempo_share_out_of_range() {
        let mut config = IntervalDetectionConfig::default();
        config.classifier.tempo_distance_share = 1.5;
        assert!(config.validate().is_err());
    }
}
