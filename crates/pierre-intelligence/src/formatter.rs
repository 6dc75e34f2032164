// ABOUTME: Statistics formatter deriving pace, heart-rate and descriptor strings from segments
// ABOUTME: Produces recovery and interval-format descriptors with time-then-distance preference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_core::constants::{markers, units};
use pierre_core::models::Lap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FormatterTolerances;
use crate::segmenter::WorkoutSegmentation;

/// Seconds per kilometer for a speed in m/s, rounded to the nearest second
///
/// Non-positive speeds yield 0.
#[must_use]
pub fn pace_seconds(speed: f64) -> u64 {
    if speed <= 0.0 || !speed.is_finite() {
        return 0;
    }
    let seconds = (units::METERS_PER_KM / speed).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = seconds as u64;
    seconds
}

/// `m:ss` pace for a speed in m/s
#[must_use]
pub fn format_pace(speed: f64) -> String {
    let seconds = pace_seconds(speed);
    format!(
        "{}:{:02}",
        seconds / units::SECONDS_PER_MINUTE,
        seconds % units::SECONDS_PER_MINUTE
    )
}

/// `S"` up to a minute, `M'` on whole minutes, `M'SS"` otherwise
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let minutes = seconds / units::SECONDS_PER_MINUTE;
    let rest = seconds % units::SECONDS_PER_MINUTE;
    if seconds <= units::SECONDS_PER_MINUTE {
        format!("{seconds}\"")
    } else if rest == 0 {
        format!("{minutes}'")
    } else {
        format!("{minutes}'{rest:02}\"")
    }
}

/// `D.DD km` from one kilometer, rounded meters below
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters >= units::METERS_PER_KM {
        format!("{:.2} km", meters / units::METERS_PER_KM)
    } else {
        format!("{meters:.0}m")
    }
}

/// Kilometers with two decimals, as printed in description lines
#[must_use]
pub fn format_kilometers(meters: f64) -> String {
    format!("{:.2}", meters / units::METERS_PER_KM)
}

/// Shared shape of a group of laps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SegmentDescriptor {
    /// All laps last the same elapsed time (seconds)
    Duration(u64),
    /// All laps cover the same distance (meters)
    Distance(f64),
    /// Neither time nor distance is consistent
    Variable,
}

impl SegmentDescriptor {
    /// Whether the descriptor is distance-based
    #[must_use]
    pub const fn is_distance(&self) -> bool {
        matches!(self, Self::Distance(_))
    }
}

impl fmt::Display for SegmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration(seconds) => f.write_str(&format_duration(*seconds)),
            Self::Distance(meters) => f.write_str(&format_distance(*meters)),
            Self::Variable => f.write_str(markers::VARIABLE_RECOVERY),
        }
    }
}

/// Summed laps with weighted averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LapAggregate {
    /// Total distance (meters)
    pub distance: f64,
    /// Total moving time (seconds)
    pub moving_time: u64,
    /// Distance-weighted speed (m/s)
    pub average_speed: f64,
    /// Distance-weighted heart rate over laps that recorded one
    pub average_heartrate: Option<f64>,
}

/// One work repetition ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalLine {
    /// 1-based repetition number
    pub number: usize,
    /// `m:ss` pace
    pub pace: String,
    /// Distance (meters)
    pub distance: f64,
    /// Rounded heart rate
    pub heart_rate: Option<u32>,
}

/// Phase summary (warm-up, cool-down, sustained block)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    /// Distance (meters)
    pub distance: f64,
    /// `m:ss` pace
    pub pace: String,
    /// Rounded heart rate
    pub heart_rate: Option<u32>,
}

/// Everything the composer needs to print an interval description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStatistics {
    /// Warm-up summary
    pub warmup: Option<PhaseSummary>,
    /// One line per work repetition
    pub intervals: Vec<IntervalLine>,
    /// `{count}x{descriptor}` when the repetitions share a shape
    pub interval_format: Option<String>,
    /// Whether the repetitions share a distance (per-line distances are then redundant)
    pub distance_based: bool,
    /// Recovery descriptor, absent without recovery laps
    pub recovery: Option<String>,
    /// Mean pace of work laps
    pub average_pace: String,
    /// Time-weighted heart rate of work laps
    pub average_heart_rate: Option<u32>,
    /// Aggregated cool-down
    pub cooldown: Option<PhaseSummary>,
}

/// Statistics formatter over configurable tolerances
pub struct StatisticsFormatter<'a> {
    tolerances: &'a FormatterTolerances,
}

impl<'a> StatisticsFormatter<'a> {
    /// Create a formatter borrowing its tolerances
    #[must_use]
    pub const fn new(tolerances: &'a FormatterTolerances) -> Self {
        Self { tolerances }
    }

    /// Derive display statistics from a segmentation
    #[must_use]
    pub fn compute(&self, segmentation: &WorkoutSegmentation) -> WorkoutStatistics {
        let work_shape = self.describe(&segmentation.work);
        let interval_format = work_shape
            .filter(|shape| *shape != SegmentDescriptor::Variable)
            .map(|shape| format!("{}x{shape}", segmentation.work.len()));

        let intervals = segmentation
            .work
            .iter()
            .enumerate()
            .map(|(position, lap)| IntervalLine {
                number: position + 1,
                pace: format_pace(lap.average_speed),
                distance: lap.distance,
                heart_rate: lap.heart_rate().map(round_bpm),
            })
            .collect();

        let cooldown = aggregate_laps(&segmentation.cooldown)
            .filter(|aggregate| aggregate.distance > self.tolerances.cooldown_min_display_distance_m)
            .map(|aggregate| PhaseSummary::from(&aggregate));

        WorkoutStatistics {
            warmup: segmentation.warmup.as_ref().map(|lap| PhaseSummary {
                distance: lap.distance,
                pace: format_pace(lap.average_speed),
                heart_rate: lap.heart_rate().map(round_bpm),
            }),
            intervals,
            interval_format,
            distance_based: work_shape.is_some_and(|shape| shape.is_distance()),
            recovery: self.recovery_descriptor(&segmentation.recovery),
            average_pace: format_pace(mean_lap_speed(&segmentation.work)),
            average_heart_rate: time_weighted_heart_rate(&segmentation.work).map(round_bpm),
            cooldown,
        }
    }

    /// Recovery descriptor string, `None` without recovery laps
    #[must_use]
    pub fn recovery_descriptor(&self, recovery: &[Lap]) -> Option<String> {
        self.describe(recovery).map(|shape| shape.to_string())
    }

    /// Shared shape of `laps`: time first, then distance, else variable
    #[must_use]
    pub fn describe(&self, laps: &[Lap]) -> Option<SegmentDescriptor> {
        let first = laps.first()?;

        let consistent_time = laps
            .iter()
            .all(|lap| lap.elapsed_time.abs_diff(first.elapsed_time) <= self.tolerances.time_tolerance_s);
        if consistent_time {
            return Some(SegmentDescriptor::Duration(first.elapsed_time));
        }

        let consistent_distance = laps
            .iter()
            .all(|lap| (lap.distance - first.distance).abs() <= self.tolerances.distance_tolerance_m);
        if consistent_distance {
            return Some(SegmentDescriptor::Distance(first.distance));
        }

        Some(SegmentDescriptor::Variable)
    }
}

impl From<&LapAggregate> for PhaseSummary {
    fn from(aggregate: &LapAggregate) -> Self {
        Self {
            distance: aggregate.distance,
            pace: format_pace(aggregate.average_speed),
            heart_rate: aggregate.average_heartrate.map(round_bpm),
        }
    }
}

/// Sum distance and time, weight speed and heart rate by distance
///
/// Returns `None` for an empty slice or zero total distance.
#[must_use]
pub fn aggregate_laps(laps: &[Lap]) -> Option<LapAggregate> {
    let distance: f64 = laps.iter().map(|lap| lap.distance).sum();
    if distance <= 0.0 {
        return None;
    }
    let moving_time = laps.iter().map(|lap| lap.moving_time).sum();
    let average_speed = laps
        .iter()
        .map(|lap| lap.average_speed * lap.distance)
        .sum::<f64>()
        / distance;

    let hr_distance: f64 = laps
        .iter()
        .filter(|lap| lap.heart_rate().is_some())
        .map(|lap| lap.distance)
        .sum();
    let average_heartrate = (hr_distance > 0.0).then(|| {
        laps.iter()
            .filter_map(|lap| lap.heart_rate().map(|hr| hr * lap.distance))
            .sum::<f64>()
            / hr_distance
    });

    Some(LapAggregate {
        distance,
        moving_time,
        average_speed,
        average_heartrate,
    })
}

/// Arithmetic mean of lap speeds (converted to pace afterwards, not mean of paces)
#[must_use]
pub fn mean_lap_speed(laps: &[Lap]) -> f64 {
    if laps.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = laps.len() as f64;
    laps.iter().map(|lap| lap.average_speed).sum::<f64>() / count
}

/// Heart rate weighted by moving time over laps that recorded one
#[must_use]
pub fn time_weighted_heart_rate(laps: &[Lap]) -> Option<f64> {
    let (weighted, weight) = laps
        .iter()
        .filter_map(|lap| lap.heart_rate().map(|hr| (hr, lap.moving_time)))
        .fold((0.0, 0.0), |(weighted, weight), (hr, seconds)| {
            #[allow(clippy::cast_precision_loss)]
            let seconds = seconds as f64;
            (weighted + hr * seconds, weight + seconds)
        });
    (weight > 0.0).then(|| weighted / weight)
}

/// Heart rate as displayed (integer BPM)
#[must_use]
pub fn round_bpm(heart_rate: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bpm = heart_rate.round().max(0.0) as u32;
    bpm
}

/// Heart rate or `N/A`
#[must_use]
pub fn format_heart_rate(heart_rate: Option<u32>) -> String {
    heart_rate.map_or_else(|| markers::HEART_RATE_UNAVAILABLE.to_owned(), |bpm| bpm.to_string())
}
