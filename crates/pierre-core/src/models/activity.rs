// ABOUTME: Activity, Lap and ActivityUpdate models validated at the provider boundary
// ABOUTME: Laps carry the per-segment aggregates the interval heuristics operate on
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SportType;
use crate::constants::markers;

/// A recorded activity as read from the fitness provider
///
/// Activities are created by the provider when an athlete finishes a session.
/// This service only ever rewrites `name` and `description`.
///
/// # Examples
///
/// ```rust
/// use pierre_core::models::{Activity, SportType};
///
/// let activity = Activity::new(42, "5x4", SportType::Run)
///     .with_distance(10_000.0)
///     .with_average_speed(3.5);
///
/// assert!(activity.is_run());
/// assert!(!activity.has_generated_annotation());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    /// Provider identifier
    pub id: u64,
    /// Free-text title, often encodes the interval shape ("5x4", "10 x 400")
    pub name: String,
    /// Activity type
    pub sport_type: SportType,
    /// Free-text description, may already hold a generated annotation
    pub description: Option<String>,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Moving time in seconds
    pub moving_time: u64,
    /// Elapsed wall-clock time in seconds
    pub elapsed_time: u64,
    /// Average speed in meters/second
    pub average_speed: f64,
    /// Whether the activity recorded heart rate
    pub has_heartrate: bool,
    /// Average heart rate over the whole activity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heartrate: Option<f64>,
    /// Start time (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
}

impl Activity {
    /// Create an activity with the identifying fields; numeric fields default to zero
    pub fn new(id: u64, name: impl Into<String>, sport_type: SportType) -> Self {
        Self {
            id,
            name: name.into(),
            sport_type,
            description: None,
            distance_meters: 0.0,
            moving_time: 0,
            elapsed_time: 0,
            average_speed: 0.0,
            has_heartrate: false,
            average_heartrate: None,
            start_date: None,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the total distance in meters
    #[must_use]
    pub const fn with_distance(mut self, distance_meters: f64) -> Self {
        self.distance_meters = distance_meters;
        self
    }

    /// Set the average speed in meters/second
    #[must_use]
    pub const fn with_average_speed(mut self, average_speed: f64) -> Self {
        self.average_speed = average_speed;
        self
    }

    /// Mark the activity as carrying heart-rate data
    #[must_use]
    pub const fn with_heartrate(mut self, average_heartrate: f64) -> Self {
        self.has_heartrate = true;
        self.average_heartrate = Some(average_heartrate);
        self
    }

    /// Only plain runs are eligible for annotation
    #[must_use]
    pub fn is_run(&self) -> bool {
        self.sport_type == SportType::Run
    }

    /// Whether the description carries any annotation this service writes
    #[must_use]
    pub fn has_generated_annotation(&self) -> bool {
        self.description.as_deref().is_some_and(|d| {
            d.contains(markers::INTERVAL_SENTINEL) || d.contains(markers::TEMPO_SENTINEL)
        })
    }

    /// Snapshot of this activity after a successful write-back
    #[must_use]
    pub fn annotated(&self, update: &ActivityUpdate) -> Self {
        let mut activity = self.clone();
        if let Some(name) = &update.name {
            activity.name.clone_from(name);
        }
        activity.description = Some(update.description.clone());
        activity
    }
}

/// One recorded segment ("lap") of an activity
///
/// Laps are temporally ordered and contiguous; `lap_index` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lap {
    /// 1-based position within the activity
    pub lap_index: u32,
    /// Distance in meters
    pub distance: f64,
    /// Elapsed wall-clock time in seconds
    pub elapsed_time: u64,
    /// Moving time in seconds (excludes auto-pause)
    pub moving_time: u64,
    /// Average speed in meters/second, 0 when stationary
    pub average_speed: f64,
    /// Average heart rate in BPM, when recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heartrate: Option<f64>,
}

impl Lap {
    /// Create a lap without heart-rate data
    #[must_use]
    pub const fn new(
        lap_index: u32,
        distance: f64,
        elapsed_time: u64,
        moving_time: u64,
        average_speed: f64,
    ) -> Self {
        Self {
            lap_index,
            distance,
            elapsed_time,
            moving_time,
            average_speed,
            average_heartrate: None,
        }
    }

    /// Attach an average heart rate
    #[must_use]
    pub const fn with_heart_rate(mut self, average_heartrate: f64) -> Self {
        self.average_heartrate = Some(average_heartrate);
        self
    }

    /// Heart rate only when a positive reading exists
    #[must_use]
    pub fn heart_rate(&self) -> Option<f64> {
        self.average_heartrate.filter(|hr| *hr > 0.0)
    }

    /// Laps long enough in both distance and moving time to carry signal
    #[must_use]
    pub fn is_significant(&self, min_distance: f64, min_moving_time: u64) -> bool {
        self.distance > min_distance && self.moving_time > min_moving_time
    }
}

/// Write-back payload for the provider's "update activity" call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityUpdate {
    /// New title, omitted for description-only writes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    pub description: String,
}

impl ActivityUpdate {
    /// Title and description update
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: description.into(),
        }
    }

    /// Same update without the title
    #[must_use]
    pub fn description_only(&self) -> Self {
        Self {
            name: None,
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_annotation_detects_sentinels() {
        let activity = Activity::new(1, "5x4", SportType::Run)
            .with_description("🔥 ÉCHAUFFEMENT: 2.00 km\n\n🏃 INTERVALLES (R1'):");
        assert!(activity.has_generated_annotation());

        let tempo = Activity::new(2, "Tempo", SportType::Run)
            .with_description(format!("{} 6.00 km @ 4:10/km", markers::TEMPO_SENTINEL));
        assert!(tempo.has_generated_annotation());

        let plain = Activity::new(3, "5x4", SportType::Run).with_description("Great session");
        assert!(!plain.has_generated_annotation());
        assert!(!Activity::new(4, "5x4", SportType::Run).has_generated_annotation());
    }

    #[test]
    fn test_annotated_keeps_name_on_description_only_update() {
        let activity = Activity::new(1, "5x4", SportType::Run);
        let update = ActivityUpdate::new("5x4 | 3:30/km", "body").description_only();
        let annotated = activity.annotated(&update);
        assert_eq!(annotated.name, "5x4");
        assert_eq!(annotated.description.as_deref(), Some("body"));
    }

    #[test]
    fn test_zero_heart_rate_is_missing() {
        let lap = Lap::new(1, 1000.0, 240, 240, 4.16).with_heart_rate(0.0);
        assert!(lap.heart_rate().is_none());
    }
}
