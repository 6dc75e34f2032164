// ABOUTME: Description and title composer for annotated interval and tempo workouts
// ABOUTME: Emits the fixed-order French sections and the idempotent enriched title
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Description/Title Composer
//!
//! The produced text is read back by later runs: the interval header is the
//! "already analyzed" sentinel, and the `m:ss/km` token in the title keeps
//! title enrichment idempotent. Both literals come from
//! [`pierre_core::constants::markers`].

use pierre_core::constants::markers;
use pierre_core::models::{Activity, Lap};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::formatter::{
    aggregate_laps, format_heart_rate, format_kilometers, format_pace, round_bpm, PhaseSummary,
    WorkoutStatistics,
};

/// Pace token already present in an enriched title
static PACE_TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d+:\d+/km").ok());

/// Recovery descriptor in the interval header: `INTERVALLES ... (R1'30"):`
static RECOVERY_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"INTERVALLES[^(\n]*\(R([^)]+)\)").ok());

/// Average pace line: `MOYENNE: 3:45/km`
static AVERAGE_PACE_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"MOYENNE: ([0-9:]+)/km").ok());

/// Title-relevant figures, either computed or read back from a description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionStats {
    /// Average work pace (`m:ss`)
    pub average_pace: Option<String>,
    /// Recovery descriptor
    pub recovery: Option<String>,
}

impl From<&WorkoutStatistics> for DescriptionStats {
    fn from(stats: &WorkoutStatistics) -> Self {
        Self {
            average_pace: Some(stats.average_pace.clone()),
            recovery: stats.recovery.clone(),
        }
    }
}

/// Recover `{average_pace, recovery}` from a generated description
#[must_use]
pub fn extract_stats_from_description(description: &str) -> DescriptionStats {
    let capture = |pattern: &LazyLock<Option<Regex>>| {
        pattern
            .as_ref()
            .and_then(|regex| regex.captures(description))
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().to_owned())
    };
    DescriptionStats {
        average_pace: capture(&AVERAGE_PACE_TOKEN),
        recovery: capture(&RECOVERY_TOKEN),
    }
}

/// Append ` | {pace}/km` and ` | R{recovery}` to the original title
///
/// Titles that already contain a pace token are returned unchanged, as are
/// titles when no average pace is known. Any previous ` | ...` suffix is
/// replaced.
#[must_use]
pub fn generate_enhanced_title(title: &str, stats: &DescriptionStats) -> String {
    if has_enhanced_title(title) {
        return title.to_owned();
    }
    let Some(pace) = &stats.average_pace else {
        return title.to_owned();
    };

    let base = title.split('|').next().unwrap_or(title).trim();
    let mut enhanced = format!("{base} | {pace}/km");
    if let Some(recovery) = &stats.recovery {
        let _ = write!(enhanced, " | R{recovery}");
    }
    enhanced
}

/// Whether `title` already carries a `m:ss/km` pace token
#[must_use]
pub fn has_enhanced_title(title: &str) -> bool {
    PACE_TOKEN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(title))
}

/// Whether Strava already shows an annotation for `activity`
///
/// Summary listings omit the description, so the enriched title is checked too.
#[must_use]
pub fn shows_annotation(activity: &Activity) -> bool {
    activity.has_generated_annotation() || has_enhanced_title(&activity.name)
}

/// Multi-section description of an interval workout
#[must_use]
pub fn compose_interval_description(stats: &WorkoutStatistics) -> String {
    let mut sections = Vec::with_capacity(4);

    if let Some(warmup) = &stats.warmup {
        sections.push(phase_line(markers::WARMUP, warmup, false));
    }

    let mut header = markers::INTERVAL_SENTINEL.to_owned();
    if let Some(format) = &stats.interval_format {
        let _ = write!(header, " {format}");
    }
    if let Some(recovery) = &stats.recovery {
        let _ = write!(header, " (R{recovery})");
    }
    header.push(':');

    let mut intervals = header;
    for line in &stats.intervals {
        let _ = write!(intervals, "\n#{}: {}/km", line.number, line.pace);
        if !stats.distance_based {
            let _ = write!(intervals, " ({}km)", format_kilometers(line.distance));
        }
        let _ = write!(intervals, " @{} bpm", format_heart_rate(line.heart_rate));
    }
    sections.push(intervals);

    let mut average = format!("{}: {}/km", markers::AVERAGE, stats.average_pace);
    if let Some(bpm) = stats.average_heart_rate {
        let _ = write!(average, " @{bpm} bpm");
    }
    sections.push(average);

    if let Some(cooldown) = &stats.cooldown {
        sections.push(phase_line(markers::COOLDOWN, cooldown, true));
    }

    sections.join("\n\n")
}

/// Warm-up / sustained block / cool-down description of a tempo run
///
/// `main` is the position of the sustained lap; laps before and after it
/// are aggregated into warm-up and cool-down. Returns `None` when `main` is
/// out of range.
#[must_use]
pub fn compose_tempo_description(
    laps: &[Lap],
    main: usize,
    cooldown_min_display_distance_m: f64,
) -> Option<String> {
    let effort = laps.get(main)?;
    let mut sections = Vec::with_capacity(3);

    if let Some(warmup) = aggregate_laps(&laps[..main]) {
        sections.push(phase_line(markers::WARMUP, &PhaseSummary::from(&warmup), false));
    }

    let block = PhaseSummary {
        distance: effort.distance,
        pace: format_pace(effort.average_speed),
        heart_rate: effort.heart_rate().map(round_bpm),
    };
    sections.push(phase_line(markers::TEMPO_SENTINEL, &block, true));

    if let Some(cooldown) = aggregate_laps(&laps[main + 1..])
        .filter(|aggregate| aggregate.distance > cooldown_min_display_distance_m)
    {
        sections.push(phase_line(markers::COOLDOWN, &PhaseSummary::from(&cooldown), true));
    }

    Some(sections.join("\n\n"))
}

fn phase_line(label: &str, phase: &PhaseSummary, with_heart_rate: bool) -> String {
    let mut line = format!(
        "{label}: {} km @ {}/km",
        format_kilometers(phase.distance),
        phase.pace
    );
    if with_heart_rate {
        if let Some(bpm) = phase.heart_rate {
            let _ = write!(line, " @{bpm} bpm");
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::IntervalLine;

    fn sample_stats() -> WorkoutStatistics {
        WorkoutStatistics {
            warmup: Some(PhaseSummary {
                distance: 2000.0,
                pace: "5:30".to_owned(),
                heart_rate: Some(140),
            }),
            intervals: vec![
                IntervalLine {
                    number: 1,
                    pace: "3:30".to_owned(),
                    distance: 1000.0,
                    heart_rate: Some(170),
                },
                IntervalLine {
                    number: 2,
                    pace: "3:32".to_owned(),
                    distance: 1000.0,
                    heart_rate: None,
                },
            ],
            interval_format: Some("2x1.00 km".to_owned()),
            distance_based: true,
            recovery: Some("1'30\"".to_owned()),
            average_pace: "3:31".to_owned(),
            average_heart_rate: Some(170),
            cooldown: None,
        }
    }

    #[test]
    fn test_interval_description_layout() {
        let description = compose_interval_description(&sample_stats());
        assert_eq!(
            description,
            "🔥 ÉCHAUFFEMENT: 2.00 km @ 5:30/km\n\n\
             🏃 INTERVALLES 2x1.00 km (R1'30\"):\n\
             #1: 3:30/km @170 bpm\n\
             #2: 3:32/km @N/A bpm\n\n\
             📈 MOYENNE: 3:31/km @170 bpm"
        );
    }

    #[test]
    fn test_distance_shown_when_format_is_not_distance_based() {
        let mut stats = sample_stats();
        stats.distance_based = false;
        stats.interval_format = None;
        stats.recovery = None;
        let description = compose_interval_description(&stats);
        assert!(description.contains("🏃 INTERVALLES:\n"));
        assert!(description.contains("#1: 3:30/km (1.00km) @170 bpm"));
    }

    #[test]
    fn test_extract_stats_round_trips_through_description() {
        let description = compose_interval_description(&sample_stats());
        let stats = extract_stats_from_description(&description);
        assert_eq!(stats.average_pace.as_deref(), Some("3:31"));
        assert_eq!(stats.recovery.as_deref(), Some("1'30\""));
    }

    #[test]
    fn test_title_with_pace_token_is_unchanged() {
        let title = "Tempo Run | 4:15/km | R30\"";
        let stats = DescriptionStats {
            average_pace: Some("3:50".to_owned()),
            recovery: None,
        };
        assert_eq!(generate_enhanced_title(title, &stats), title);
    }

    #[test]
    fn test_enriched_title_shows_annotation_without_description() {
        use pierre_core::models::SportType;

        let summary = Activity::new(1, "5x4 | 3:30/km | R2'", SportType::Run);
        assert!(summary.description.is_none());
        assert!(shows_annotation(&summary));

        let described =
            Activity::new(2, "5x4", SportType::Run).with_description("🏃 INTERVALLES 5x4' (R2'):");
        assert!(shows_annotation(&described));

        assert!(!shows_annotation(&Activity::new(3, "5x4", SportType::Run)));
        assert!(!has_enhanced_title("Sortie 10 km"));
    }

    #[test]
    fn test_title_suffix_is_replaced() {
        let stats = DescriptionStats {
            average_pace: Some("3:31".to_owned()),
            recovery: Some("1'30\"".to_owned()),
        };
        assert_eq!(
            generate_enhanced_title("5x1000 | piste ", &stats),
            "5x1000 | 3:31/km | R1'30\""
        );
        assert_eq!(
            generate_enhanced_title("5x1000", &DescriptionStats::default()),
            "5x1000"
        );
    }

    #[test]
    fn test_tempo_description_sections() {
        let laps = vec![
            Lap::new(1, 2000.0, 660, 660, 2000.0 / 660.0),
            Lap::new(2, 6000.0, 1500, 1500, 4.0).with_heart_rate(168.0),
            Lap::new(3, 2000.0, 680, 680, 2000.0 / 680.0),
        ];
        let description = compose_tempo_description(&laps, 1, 200.0).unwrap();
        let sections: Vec<&str> = description.split("\n\n").collect();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1], "🏃 ALLURE SOUTENUE: 6.00 km @ 4:10/km @168 bpm");
        assert!(!description.contains(markers::INTERVAL_SENTINEL));
    }
}
