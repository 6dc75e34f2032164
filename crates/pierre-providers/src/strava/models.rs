// ABOUTME: Strava API data transfer objects for activities, laps, tokens and webhooks
// ABOUTME: Validates provider payloads into core models at the ingestion boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use pierre_core::constants::oauth_providers;
use pierre_core::errors::ProviderError;
use pierre_core::models::{Activity, Lap, SportType};
use serde::{Deserialize, Serialize};

fn invalid(message: impl Into<String>) -> ProviderError {
    ProviderError::InvalidResponse {
        provider: oauth_providers::STRAVA.to_owned(),
        message: message.into(),
    }
}

fn non_negative(field: &str, value: Option<f64>) -> Result<f64, ProviderError> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(invalid(format!("{field} must be a non-negative number, got {v}"))),
    }
}

/// Strava API response for activity data (detailed and summary representations)
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivityResponse {
    /// Activity id
    pub id: u64,
    /// Title
    pub name: String,
    /// Legacy activity type ("Run", "Ride", ...)
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Description, only present on the detailed representation
    #[serde(default)]
    pub description: Option<String>,
    /// Distance in meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: Option<u64>,
    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: Option<u64>,
    /// Average speed in m/s
    #[serde(default)]
    pub average_speed: Option<f64>,
    /// Whether heart rate was recorded
    #[serde(default)]
    pub has_heartrate: Option<bool>,
    /// Average heart rate
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    /// RFC 3339 start time
    #[serde(default)]
    pub start_date: Option<String>,
}

impl StravaActivityResponse {
    /// Validate into the core activity model
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidResponse` for negative or non-finite
    /// metrics and unparseable start dates
    pub fn into_activity(self) -> Result<Activity, ProviderError> {
        let start_date = self
            .start_date
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|date| date.with_timezone(&Utc))
                    .map_err(|e| invalid(format!("activity {} start_date: {e}", self.id)))
            })
            .transpose()?;

        Ok(Activity {
            id: self.id,
            sport_type: SportType::from_provider_string(&self.activity_type),
            description: self.description,
            distance_meters: non_negative("distance", self.distance)?,
            moving_time: self.moving_time.unwrap_or(0),
            elapsed_time: self.elapsed_time.unwrap_or(0),
            average_speed: non_negative("average_speed", self.average_speed)?,
            has_heartrate: self.has_heartrate.unwrap_or(false),
            average_heartrate: self.average_heartrate.filter(|hr| *hr > 0.0),
            start_date,
            name: self.name,
        })
    }
}

/// Strava API response for one lap
#[derive(Debug, Clone, Deserialize)]
pub struct StravaLapResponse {
    /// 1-based lap index
    #[serde(default)]
    pub lap_index: Option<u32>,
    /// Distance in meters
    pub distance: f64,
    /// Elapsed time in seconds
    pub elapsed_time: u64,
    /// Moving time in seconds
    pub moving_time: u64,
    /// Average speed in m/s
    #[serde(default)]
    pub average_speed: Option<f64>,
    /// Average heart rate
    #[serde(default)]
    pub average_heartrate: Option<f64>,
}

impl StravaLapResponse {
    /// Validate into the core lap model; `position` is the 0-based order in the response
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidResponse` for negative or non-finite metrics
    pub fn into_lap(self, position: usize) -> Result<Lap, ProviderError> {
        let lap_index = match self.lap_index {
            Some(index) => index,
            None => u32::try_from(position + 1)
                .map_err(|_| invalid(format!("lap position {position} out of range")))?,
        };
        let distance = non_negative("lap distance", Some(self.distance))?;
        let average_speed = non_negative("lap average_speed", self.average_speed)?;

        let lap = Lap::new(
            lap_index,
            distance,
            self.elapsed_time,
            self.moving_time,
            average_speed,
        );
        Ok(match self.average_heartrate.filter(|hr| hr.is_finite() && *hr > 0.0) {
            Some(hr) => lap.with_heart_rate(hr),
            None => lap,
        })
    }
}

/// Validate a lap list, preserving order
///
/// # Errors
///
/// Returns the first validation failure
pub fn laps_from_response(laps: Vec<StravaLapResponse>) -> Result<Vec<Lap>, ProviderError> {
    laps.into_iter()
        .enumerate()
        .map(|(position, lap)| lap.into_lap(position))
        .collect()
}

/// Athlete summary embedded in token responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaAthleteSummary {
    /// Athlete id
    pub id: u64,
    /// First name
    #[serde(default)]
    pub firstname: Option<String>,
    /// Last name
    #[serde(default)]
    pub lastname: Option<String>,
}

impl StravaAthleteSummary {
    /// "First Last", falling back to the athlete id
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            format!("Athlete {}", self.id)
        } else {
            parts.join(" ")
        }
    }
}

/// OAuth token endpoint response (code exchange and refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaTokenResponse {
    /// Bearer token for API calls
    pub access_token: String,
    /// Refresh token; may be omitted on refresh, keep the previous one then
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry as a Unix timestamp
    pub expires_at: i64,
    /// Athlete, present on code exchange
    #[serde(default)]
    pub athlete: Option<StravaAthleteSummary>,
}

impl StravaTokenResponse {
    /// Expiry as a UTC timestamp
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidResponse` when `expires_at` is out of range
    pub fn expires_at_utc(&self) -> Result<DateTime<Utc>, ProviderError> {
        DateTime::from_timestamp(self.expires_at, 0)
            .ok_or_else(|| invalid(format!("expires_at {} out of range", self.expires_at)))
    }
}

/// Push subscription event (`POST /api/webhook` body)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaWebhookEvent {
    /// "activity" or "athlete"
    pub object_type: String,
    /// Activity id (or athlete id for athlete events)
    pub object_id: u64,
    /// "create", "update" or "delete"
    pub aspect_type: String,
    /// Athlete id owning the object
    pub owner_id: u64,
    /// Push subscription id
    #[serde(default)]
    pub subscription_id: Option<u64>,
    /// Unix timestamp of the event
    #[serde(default)]
    pub event_time: Option<i64>,
    /// Changed fields for update events
    #[serde(default)]
    pub updates: Option<serde_json::Value>,
}

impl StravaWebhookEvent {
    /// Activity events only
    #[must_use]
    pub fn is_activity(&self) -> bool {
        self.object_type == "activity"
    }

    /// Creation or update, the only aspects that can produce an annotation
    #[must_use]
    pub fn is_create_or_update(&self) -> bool {
        matches!(self.aspect_type.as_str(), "create" | "update")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_validation() {
        let json = r#"{
            "id": 123,
            "name": "5x1000",
            "type": "Run",
            "distance": 10500.5,
            "moving_time": 3000,
            "elapsed_time": 3300,
            "average_speed": 3.5,
            "has_heartrate": true,
            "average_heartrate": 152.3,
            "start_date": "2025-03-04T07:30:00Z"
        }"#;
        let response: StravaActivityResponse = serde_json::from_str(json).unwrap();
        let activity = response.into_activity().unwrap();
        assert!(activity.is_run());
        assert!(activity.has_heartrate);
        assert!(activity.description.is_none());
        assert!(activity.start_date.is_some());
    }

    #[test]
    fn test_negative_speed_is_rejected() {
        let json = r#"{"id": 1, "name": "x", "type": "Run", "average_speed": -1.0}"#;
        let response: StravaActivityResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_activity(),
            Err(ProviderError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_lap_index_defaults_to_position() {
        let json = r#"[
            {"distance": 1000.0, "elapsed_time": 240, "moving_time": 238, "average_speed": 4.2, "average_heartrate": 0.0},
            {"lap_index": 9, "distance": 200.0, "elapsed_time": 90, "moving_time": 90}
        ]"#;
        let laps = laps_from_response(serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(laps[0].lap_index, 1);
        assert!(laps[0].average_heartrate.is_none());
        assert_eq!(laps[1].lap_index, 9);
        assert!(laps[1].average_speed.abs() < f64::EPSILON);
    }

    #[test]
    fn test_webhook_event_filters() {
        let json = r#"{
            "object_type": "activity",
            "object_id": 987,
            "aspect_type": "delete",
            "owner_id": 42,
            "subscription_id": 1,
            "event_time": 1700000000,
            "updates": {}
        }"#;
        let event: StravaWebhookEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_activity());
        assert!(!event.is_create_or_update());
    }

    #[test]
    fn test_athlete_display_name() {
        let athlete = StravaAthleteSummary {
            id: 5,
            firstname: Some("Marie".to_owned()),
            lastname: None,
        };
        assert_eq!(athlete.display_name(), "Marie");
    }
}
