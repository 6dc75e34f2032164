// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Wire markers, provider identifiers and unit constants shared across crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Literal markers written into activity descriptions and titles.
///
/// These strings are a de facto wire contract: previously annotated activities are
/// recognized by them, so they must never change byte-for-byte.
pub mod markers {
    /// Header of the interval section; its presence means the activity was already analyzed
    pub const INTERVAL_SENTINEL: &str = "🏃 INTERVALLES";
    /// Header of the sustained-effort section produced for tempo runs
    pub const TEMPO_SENTINEL: &str = "🏃 ALLURE SOUTENUE";
    /// Warm-up section prefix
    pub const WARMUP: &str = "🔥 ÉCHAUFFEMENT";
    /// Average section prefix
    pub const AVERAGE: &str = "📈 MOYENNE";
    /// Cool-down section prefix
    pub const COOLDOWN: &str = "🧊 RETOUR AU CALME";
    /// Value shown when no heart-rate data was recorded
    pub const HEART_RATE_UNAVAILABLE: &str = "N/A";
    /// Recovery descriptor used when neither time nor distance is consistent
    pub const VARIABLE_RECOVERY: &str = "variable";
}

/// Provider identifiers
pub mod oauth_providers {
    /// Strava provider identifier
    pub const STRAVA: &str = "strava";
}

/// Unit conversion constants
pub mod units {
    /// Meters in one kilometer
    pub const METERS_PER_KM: f64 = 1000.0;
    /// Seconds in one minute
    pub const SECONDS_PER_MINUTE: u64 = 60;
}
