// ABOUTME: Sport type enumeration for fitness activities
// ABOUTME: Maps provider activity type strings to a closed set with a passthrough variant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumeration of activity types the service distinguishes
///
/// Only `Run` is eligible for interval annotation. The `Other` variant keeps
/// provider-specific types verbatim so they round-trip unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Outdoor running activity
    Run,
    /// Trail running activity
    TrailRun,
    /// Treadmill running activity
    VirtualRun,
    /// Cycling activity
    Ride,
    /// Walking activity
    Walk,
    /// Hiking activity
    Hike,
    /// Swimming activity
    Swim,
    /// Generic workout
    Workout,
    /// Any other provider type, kept as received
    Other(String),
}

impl SportType {
    /// Parse the provider's activity type string (Strava `type` field)
    #[must_use]
    pub fn from_provider_string(provider_type: &str) -> Self {
        match provider_type {
            "Run" => Self::Run,
            "TrailRun" => Self::TrailRun,
            "VirtualRun" => Self::VirtualRun,
            "Ride" => Self::Ride,
            "Walk" => Self::Walk,
            "Hike" => Self::Hike,
            "Swim" => Self::Swim,
            "Workout" => Self::Workout,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Provider representation of this type
    #[must_use]
    pub fn as_provider_str(&self) -> &str {
        match self {
            Self::Run => "Run",
            Self::TrailRun => "TrailRun",
            Self::VirtualRun => "VirtualRun",
            Self::Ride => "Ride",
            Self::Walk => "Walk",
            Self::Hike => "Hike",
            Self::Swim => "Swim",
            Self::Workout => "Workout",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_provider_str())
    }
}
