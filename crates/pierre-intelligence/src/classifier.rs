// ABOUTME: Segment classifier deciding whether a run is a structured interval workout
// ABOUTME: Applies type, keyword and name-pattern rules, then lap speed/heart-rate heuristics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Segment Classifier
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. non-`Run` activities are skipped
//! 2. names containing the endurance keyword are skipped
//! 3. names with an explicit `<n>x<m>` token are intervals, laps are not consulted
//! 4. otherwise the lap heuristics decide (tempo detection first, then flags A-D)
//!
//! Rules 1-3 only need the activity, so callers can avoid fetching laps when
//! [`SegmentClassifier::classify_metadata`] already returns a decision.

use pierre_core::models::{Activity, Lap};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ClassifierThresholds;
use crate::pattern::{contains_keyword, has_interval_pattern};

/// Why an activity is left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Activity type is not `Run`
    NotRun,
    /// Title marks an endurance run
    Endurance,
    /// Fewer significant laps than the heuristics need
    InsufficientData,
    /// Single sustained effort between warm-up and cool-down
    TempoRun,
    /// Laps are too uniform to be an interval session
    SteadyEffort,
    /// Laps could not be fetched
    SegmentsUnavailable,
    /// Description already carries a generated annotation
    AlreadyAnalyzed,
}

impl SkipReason {
    /// Stable string form used in outcomes and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRun => "not_run",
            Self::Endurance => "endurance",
            Self::InsufficientData => "insufficient_data",
            Self::TempoRun => "tempo_run",
            Self::SteadyEffort => "steady_effort",
            Self::SegmentsUnavailable => "segments_unavailable",
            Self::AlreadyAnalyzed => "already_analyzed",
        }
    }

    /// Human-readable explanation
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotRun => "not a running activity",
            Self::Endurance => "endurance run",
            Self::InsufficientData => "not enough significant laps",
            Self::TempoRun => "tempo run, not an interval workout",
            Self::SteadyEffort => "no interval structure in laps",
            Self::SegmentsUnavailable => "laps unavailable",
            Self::AlreadyAnalyzed => "already analyzed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Which lap heuristics fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicFlags {
    /// Flag A: fastest/slowest speed gap relative to average speed
    pub speed_spread: bool,
    /// Flag B: fastest/slowest speed ratio
    pub speed_ratio: bool,
    /// Flag C: heart-rate gap between fastest and slowest lap
    pub heart_rate_spread: bool,
    /// Flag D: a single long repetition
    pub long_repetition: bool,
}

impl HeuristicFlags {
    /// Any flag set means interval structure
    #[must_use]
    pub const fn any(self) -> bool {
        self.speed_spread || self.speed_ratio || self.heart_rate_spread || self.long_repetition
    }
}

/// What made the classifier accept an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum IntervalEvidence {
    /// Explicit `<n>x<m>` token in the title
    NamePattern,
    /// Lap heuristics
    LapHeuristics(HeuristicFlags),
}

/// Classifier decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Structured interval workout, should be annotated
    Interval(IntervalEvidence),
    /// Leave the activity untouched
    Skip(SkipReason),
}

impl Classification {
    /// Boolean view of the decision
    #[must_use]
    pub const fn is_interval(&self) -> bool {
        matches!(self, Self::Interval(_))
    }
}

/// Segment classifier over configurable thresholds
pub struct SegmentClassifier<'a> {
    thresholds: &'a ClassifierThresholds,
}

impl<'a> SegmentClassifier<'a> {
    /// Create a classifier borrowing its thresholds
    #[must_use]
    pub const fn new(thresholds: &'a ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    /// Boolean classification over an activity and its laps
    #[must_use]
    pub fn should_process_activity(&self, activity: &Activity, laps: &[Lap]) -> bool {
        self.classify(activity, laps).is_interval()
    }

    /// Full classification over an activity and its laps
    #[must_use]
    pub fn classify(&self, activity: &Activity, laps: &[Lap]) -> Classification {
        self.classify_metadata(activity)
            .unwrap_or_else(|| self.classify_laps(activity, laps))
    }

    /// Rules that only need the activity (type, keyword, name pattern)
    ///
    /// Returns `None` when the lap heuristics must decide.
    #[must_use]
    pub fn classify_metadata(&self, activity: &Activity) -> Option<Classification> {
        if !activity.is_run() {
            return Some(Classification::Skip(SkipReason::NotRun));
        }
        if contains_keyword(&activity.name, &self.thresholds.endurance_keyword) {
            return Some(Classification::Skip(SkipReason::Endurance));
        }
        if has_interval_pattern(&activity.name) {
            return Some(Classification::Interval(IntervalEvidence::NamePattern));
        }
        None
    }

    /// Lap heuristics (rule 4)
    #[must_use]
    pub fn classify_laps(&self, activity: &Activity, laps: &[Lap]) -> Classification {
        let significant = self.significant_laps(laps);
        if significant.len() < self.thresholds.min_significant_laps {
            return Classification::Skip(SkipReason::InsufficientData);
        }

        if self.detect_tempo(laps).is_some() {
            return Classification::Skip(SkipReason::TempoRun);
        }

        let flags = self.heuristic_flags(activity, &significant);
        if flags.any() {
            Classification::Interval(IntervalEvidence::LapHeuristics(flags))
        } else {
            Classification::Skip(SkipReason::SteadyEffort)
        }
    }

    /// Position in `laps` of the sustained tempo lap, if the session is a tempo run
    ///
    /// The longest significant lap must hold more than the configured share
    /// of total distance, reach the minimum tempo distance, and sit strictly
    /// between the first and last significant laps.
    #[must_use]
    pub fn detect_tempo(&self, laps: &[Lap]) -> Option<usize> {
        let positions: Vec<usize> = laps
            .iter()
            .enumerate()
            .filter(|(_, lap)| self.is_significant(lap))
            .map(|(position, _)| position)
            .collect();
        if positions.len() < 3 {
            return None;
        }

        let total_distance: f64 = laps.iter().map(|lap| lap.distance).sum();
        let (rank, &longest) = positions
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| laps[**a].distance.total_cmp(&laps[**b].distance))?;
        let main = &laps[longest];

        let dominant = main.distance > self.thresholds.tempo_distance_share * total_distance;
        let long_enough = main.distance >= self.thresholds.tempo_min_distance_m;
        let in_middle = rank > 0 && rank < positions.len() - 1;

        (dominant && long_enough && in_middle).then_some(longest)
    }

    fn is_significant(&self, lap: &Lap) -> bool {
        lap.is_significant(
            self.thresholds.min_lap_distance_m,
            self.thresholds.min_lap_moving_time_s,
        )
    }

    fn significant_laps<'l>(&self, laps: &'l [Lap]) -> Vec<&'l Lap> {
        laps.iter().filter(|lap| self.is_significant(lap)).collect()
    }

    fn heuristic_flags(&self, activity: &Activity, significant: &[&Lap]) -> HeuristicFlags {
        let t = self.thresholds;
        let Some((fastest, slowest)) = speed_extremes(significant) else {
            return HeuristicFlags::default();
        };
        let average_speed = mean_speed(significant);

        let speed_spread =
            fastest.average_speed - slowest.average_speed > t.speed_spread_ratio * average_speed;

        let speed_ratio = if slowest.average_speed > 0.0 {
            fastest.average_speed / slowest.average_speed > t.speed_ratio
        } else {
            fastest.average_speed > 0.0
        };

        let heart_rate_spread = activity.has_heartrate
            && significant.iter().filter(|lap| lap.heart_rate().is_some()).count() >= 2
            && match (fastest.heart_rate(), slowest.heart_rate()) {
                (Some(fast_hr), Some(slow_hr)) => {
                    fast_hr - slow_hr > t.heart_rate_spread_ratio * slow_hr
                }
                _ => false,
            };

        let long_repetition = significant
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance))
            .is_some_and(|(rank, longest)| {
                let at_edge = rank == 0 || rank == significant.len() - 1;
                longest.distance > t.long_lap_distance_m
                    && (at_edge || longest.average_speed > average_speed * t.long_lap_speed_ratio)
            });

        let flags = HeuristicFlags {
            speed_spread,
            speed_ratio,
            heart_rate_spread,
            long_repetition,
        };
        tracing::debug!(
            activity_id = activity.id,
            fastest = fastest.average_speed,
            slowest = slowest.average_speed,
            average_speed,
            ?flags,
            "Lap heuristics evaluated"
        );
        flags
    }
}

/// Mean of lap speeds, 0 for an empty slice
#[must_use]
pub fn mean_speed(laps: &[&Lap]) -> f64 {
    if laps.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = laps.len() as f64;
    laps.iter().map(|lap| lap.average_speed).sum::<f64>() / count
}

fn speed_extremes<'l>(laps: &[&'l Lap]) -> Option<(&'l Lap, &'l Lap)> {
    let fastest = laps
        .iter()
        .copied()
        .max_by(|a, b| a.average_speed.total_cmp(&b.average_speed))?;
    let slowest = laps
        .iter()
        .copied()
        .min_by(|a, b| a.average_speed.total_cmp(&b.average_speed))?;
    Some((fastest, slowest))
}
