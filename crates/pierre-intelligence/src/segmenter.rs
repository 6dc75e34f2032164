// ABOUTME: Interval segmenter partitioning laps into warm-up, work, recovery and cool-down
// ABOUTME: Infers the interval count from the title or from fast-lap runs when not explicit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Interval Segmenter
//!
//! The segmenter always produces a best-effort partition. Ambiguous lap
//! structures are resolved through fallbacks instead of errors:
//!
//! - single-interval sessions pick the lap with the best speed/distance score
//! - parity split (even/odd positions after the warm-up) for regular sessions
//! - laps faster than average, then the fastest laps, when nothing else fits
//!
//! The parity split assumes a clean work/recovery alternation; irregular
//! manual laps degrade its accuracy.

use pierre_core::models::{Activity, Lap};
use serde::{Deserialize, Serialize};

use crate::classifier::mean_speed;
use crate::config::SegmenterThresholds;
use crate::pattern::IntervalPattern;

/// Laps partitioned into the four workout phases
///
/// The buckets are disjoint and keep lap order, except for the last-resort
/// fallback which orders work laps by descending speed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSegmentation {
    /// Warm-up lap, when the first lap qualifies
    pub warmup: Option<Lap>,
    /// Work repetitions
    pub work: Vec<Lap>,
    /// Recovery laps between repetitions
    pub recovery: Vec<Lap>,
    /// Trailing laps aggregated into the cool-down
    pub cooldown: Vec<Lap>,
    /// Interval count the partition was built for
    pub interval_count: usize,
}

impl WorkoutSegmentation {
    /// Whether at least one work lap was identified
    #[must_use]
    pub fn has_work(&self) -> bool {
        !self.work.is_empty()
    }
}

/// Interval segmenter over configurable thresholds
pub struct IntervalSegmenter<'a> {
    thresholds: &'a SegmenterThresholds,
}

impl<'a> IntervalSegmenter<'a> {
    /// Create a segmenter borrowing its thresholds
    #[must_use]
    pub const fn new(thresholds: &'a SegmenterThresholds) -> Self {
        Self { thresholds }
    }

    /// Partition `laps` into warm-up, work, recovery and cool-down
    #[must_use]
    pub fn segment_workout(&self, activity: &Activity, laps: &[Lap]) -> WorkoutSegmentation {
        if laps.is_empty() {
            return WorkoutSegmentation::default();
        }

        let interval_count = self.interval_count(&activity.name, laps);
        let average_speed = overall_speed(laps);
        let mut warmup = self.warmup_position(laps);
        let start = usize::from(warmup.is_some());

        let (mut work, recovery) = if interval_count == 1 && laps.len() >= 3 {
            single_interval(laps, start, average_speed)
        } else {
            parity_split(laps, start, interval_count)
        };

        if work.is_empty() {
            let non_warmup: Vec<usize> = (start..laps.len()).collect();
            let candidates = if non_warmup.is_empty() {
                warmup = None;
                (0..laps.len()).collect()
            } else {
                non_warmup
            };
            work = self.fallback_work(laps, &candidates, interval_count, average_speed);
            tracing::debug!(
                activity_id = activity.id,
                work_laps = work.len(),
                "Segmenter fell back to speed-based work detection"
            );
        }

        let last_work = work.iter().max().copied();
        let recovery: Vec<usize> = recovery
            .into_iter()
            .filter(|&position| last_work.is_some_and(|last| position < last))
            .collect();
        let cooldown = last_work.map_or_else(Vec::new, |last| {
            laps[last + 1..]
                .iter()
                .filter(|lap| lap.moving_time >= self.thresholds.cooldown_min_moving_time_s)
                .cloned()
                .collect()
        });

        tracing::debug!(
            activity_id = activity.id,
            interval_count,
            warmup = warmup.is_some(),
            work_laps = work.len(),
            recovery_laps = recovery.len(),
            cooldown_laps = cooldown.len(),
            "Workout segmented"
        );

        WorkoutSegmentation {
            warmup: warmup.map(|position| laps[position].clone()),
            work: pick(laps, &work),
            recovery: pick(laps, &recovery),
            cooldown,
            interval_count,
        }
    }

    /// Number of repetitions: title first, then runs of fast laps, then lap count
    #[must_use]
    pub fn interval_count(&self, name: &str, laps: &[Lap]) -> usize {
        if let Some(pattern) = IntervalPattern::parse(name) {
            return usize::try_from(pattern.repetitions).unwrap_or(usize::MAX).max(1);
        }

        let threshold = overall_speed(laps) * self.thresholds.fast_lap_speed_ratio;
        let mut runs = 0;
        let mut in_run = false;
        for lap in laps {
            let fast = lap.average_speed > threshold;
            if fast && !in_run {
                runs += 1;
            }
            in_run = fast;
        }

        if runs > 0 {
            runs
        } else {
            (laps.len().saturating_sub(2) / 2).max(1)
        }
    }

    fn warmup_position(&self, laps: &[Lap]) -> Option<usize> {
        let first = laps.first()?;
        let long_enough = first.distance > self.thresholds.warmup_min_distance_m
            && first.moving_time > self.thresholds.warmup_min_moving_time_s;
        let slower_than_next = laps
            .get(1)
            .is_none_or(|next| first.average_speed < next.average_speed);
        (long_enough && slower_than_next).then_some(0)
    }

    fn fallback_work(
        &self,
        laps: &[Lap],
        candidates: &[usize],
        interval_count: usize,
        average_speed: f64,
    ) -> Vec<usize> {
        let threshold = average_speed * self.thresholds.fast_lap_speed_ratio;
        let fast: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&position| laps[position].average_speed > threshold)
            .take(interval_count)
            .collect();
        if !fast.is_empty() {
            return fast;
        }

        let mut by_speed = candidates.to_vec();
        by_speed.sort_by(|a, b| laps[*b].average_speed.total_cmp(&laps[*a].average_speed));
        by_speed.truncate(interval_count);
        by_speed
    }
}

fn overall_speed(laps: &[Lap]) -> f64 {
    let refs: Vec<&Lap> = laps.iter().collect();
    mean_speed(&refs)
}

fn pick(laps: &[Lap], positions: &[usize]) -> Vec<Lap> {
    positions.iter().map(|&position| laps[position].clone()).collect()
}

/// One main repetition, scored by relative speed times distance in km
///
/// Only the lap before the repetition is recovery; what follows is cool-down.
fn single_interval(laps: &[Lap], start: usize, average_speed: f64) -> (Vec<usize>, Vec<usize>) {
    let score = |lap: &Lap| {
        let relative_speed = if average_speed > 0.0 {
            lap.average_speed / average_speed
        } else {
            1.0
        };
        relative_speed * (lap.distance / 1000.0)
    };

    let Some(main) = (start..laps.len()).max_by(|a, b| score(&laps[*a]).total_cmp(&score(&laps[*b])))
    else {
        return (Vec::new(), Vec::new());
    };

    let recovery = if main > start { vec![main - 1] } else { Vec::new() };
    (vec![main], recovery)
}

/// Even/odd split of the laps after the warm-up; the faster parity is work
fn parity_split(laps: &[Lap], start: usize, interval_count: usize) -> (Vec<usize>, Vec<usize>) {
    let (even, odd): (Vec<usize>, Vec<usize>) =
        (start..laps.len()).partition(|position| (position - start) % 2 == 0);

    let parity_speed = |positions: &[usize]| {
        let refs: Vec<&Lap> = positions.iter().map(|&position| &laps[position]).collect();
        mean_speed(&refs)
    };

    let (mut work, mut recovery) = if parity_speed(&odd) > parity_speed(&even) {
        (odd, even)
    } else {
        (even, odd)
    };
    work.truncate(interval_count);
    recovery.truncate(interval_count);
    (work, recovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pierre_core::models::SportType;

    fn lap(index: u32, distance: f64, seconds: u64) -> Lap {
        #[allow(clippy::cast_precision_loss)]
        let speed = distance / seconds as f64;
        Lap::new(index, distance, seconds, seconds, speed)
    }

    /// Warm-up, 5 x (1000 m fast / 90 s jog), cool-down
    fn five_by_one_km() -> Vec<Lap> {
        let mut laps = vec![lap(1, 2000.0, 660)];
        for rep in 0..5 {
            laps.push(lap(2 + rep * 2, 1000.0, 210));
            laps.push(lap(3 + rep * 2, 250.0, 90));
        }
        laps.push(lap(12, 1500.0, 520));
        laps
    }

    #[test]
    fn test_count_from_title() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        assert_eq!(segmenter.interval_count("5x1000", &[]), 5);
        assert_eq!(segmenter.interval_count("0x400", &[]), 1);
    }

    #[test]
    fn test_count_from_fast_runs() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        assert_eq!(segmenter.interval_count("Piste", &five_by_one_km()), 5);
    }

    #[test]
    fn test_count_without_alternation_uses_lap_count() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let laps: Vec<Lap> = (1..=8).map(|i| lap(i, 1000.0, 300)).collect();
        assert_eq!(segmenter.interval_count("Run", &laps), 3);
    }

    #[test]
    fn test_parity_split_with_warmup_and_cooldown() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let activity = Activity::new(1, "5x1000", SportType::Run);
        let result = segmenter.segment_workout(&activity, &five_by_one_km());

        assert_eq!(result.warmup.as_ref().map(|l| l.lap_index), Some(1));
        let work: Vec<u32> = result.work.iter().map(|l| l.lap_index).collect();
        let recovery: Vec<u32> = result.recovery.iter().map(|l| l.lap_index).collect();
        assert_eq!(work, vec![2, 4, 6, 8, 10]);
        assert_eq!(recovery, vec![3, 5, 7, 9]);
        // The jog after the last repetition runs into the cool-down
        let cooldown: Vec<u32> = result.cooldown.iter().map(|l| l.lap_index).collect();
        assert_eq!(cooldown, vec![11, 12]);
    }

    #[test]
    fn test_fast_first_lap_is_not_warmup() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let activity = Activity::new(1, "2x1500", SportType::Run);
        let laps = vec![
            lap(1, 1500.0, 330),
            lap(2, 400.0, 150),
            lap(3, 1500.0, 330),
            lap(4, 400.0, 150),
        ];
        let result = segmenter.segment_workout(&activity, &laps);
        assert!(result.warmup.is_none());
        assert_eq!(result.work.len(), 2);
        assert_eq!(result.work[0].lap_index, 1);
    }

    #[test]
    fn test_single_interval_takes_preceding_recovery() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let activity = Activity::new(1, "1x3000", SportType::Run);
        let laps = vec![
            lap(1, 2000.0, 660),
            lap(2, 400.0, 150),
            lap(3, 3000.0, 660),
            lap(4, 400.0, 150),
            lap(5, 2000.0, 680),
        ];
        let result = segmenter.segment_workout(&activity, &laps);
        assert_eq!(result.work.len(), 1);
        assert_eq!(result.work[0].lap_index, 3);
        let recovery: Vec<u32> = result.recovery.iter().map(|l| l.lap_index).collect();
        assert_eq!(recovery, vec![2]);
        let cooldown: Vec<u32> = result.cooldown.iter().map(|l| l.lap_index).collect();
        assert_eq!(cooldown, vec![4, 5]);
    }

    #[test]
    fn test_single_interval_with_warmup_keeps_cooldown() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let activity = Activity::new(1, "1x5000", SportType::Run);
        let laps = vec![lap(1, 2000.0, 660), lap(2, 5000.0, 1100), lap(3, 2000.0, 680)];

        let result = segmenter.segment_workout(&activity, &laps);

        assert_eq!(result.warmup.as_ref().map(|l| l.lap_index), Some(1));
        assert_eq!(result.work.len(), 1);
        assert_eq!(result.work[0].lap_index, 2);
        assert!(result.recovery.is_empty());
        assert_eq!(result.cooldown.len(), 1);
        assert_eq!(result.cooldown[0].lap_index, 3);
    }

    #[test]
    fn test_last_jog_into_cooldown_is_not_recovery() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let activity = Activity::new(1, "5x4", SportType::Run);
        let mut laps = vec![lap(1, 2000.0, 660)];
        for rep in 0..5 {
            laps.push(lap(2 + rep * 2, 1150.0, 240));
            if rep < 4 {
                laps.push(lap(3 + rep * 2, 400.0, 120));
            }
        }
        laps.push(lap(11, 2000.0, 700));

        let result = segmenter.segment_workout(&activity, &laps);

        let work: Vec<u32> = result.work.iter().map(|l| l.lap_index).collect();
        let recovery: Vec<u32> = result.recovery.iter().map(|l| l.lap_index).collect();
        assert_eq!(work, vec![2, 4, 6, 8, 10]);
        assert_eq!(recovery, vec![3, 5, 7, 9]);
        let cooldown: Vec<u32> = result.cooldown.iter().map(|l| l.lap_index).collect();
        assert_eq!(cooldown, vec![11]);
    }

    #[test]
    fn test_fallback_takes_fast_laps_in_order() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let laps = vec![
            lap(1, 800.0, 400),
            lap(2, 800.0, 200),
            lap(3, 800.0, 400),
            lap(4, 800.0, 160),
            lap(5, 800.0, 180),
        ];

        let work = segmenter.fallback_work(&laps, &[0, 1, 2, 3, 4], 2, overall_speed(&laps));

        // Laps above 1.1x average, in lap order, capped at the interval count
        assert_eq!(work, vec![1, 3]);
    }

    #[test]
    fn test_fallback_without_fast_laps_sorts_by_speed() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let laps = vec![lap(1, 1000.0, 300), lap(2, 1000.0, 295), lap(3, 1000.0, 290)];

        let work = segmenter.fallback_work(&laps, &[0, 1, 2], 2, overall_speed(&laps));

        assert_eq!(work, vec![2, 1]);
    }

    #[test]
    fn test_lone_warmup_lap_becomes_work() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let activity = Activity::new(1, "1x5000", SportType::Run);
        let laps = vec![lap(1, 5000.0, 1500)];
        let result = segmenter.segment_workout(&activity, &laps);
        assert!(result.warmup.is_none());
        assert_eq!(result.work.len(), 1);
    }

    #[test]
    fn test_short_trailing_laps_are_not_cooldown() {
        let thresholds = SegmenterThresholds::default();
        let segmenter = IntervalSegmenter::new(&thresholds);
        let activity = Activity::new(1, "5x1000", SportType::Run);
        let mut laps = five_by_one_km();
        laps.push(lap(13, 50.0, 20));
        let result = segmenter.segment_workout(&activity, &laps);
        let cooldown: Vec<u32> = result.cooldown.iter().map(|l| l.lap_index).collect();
        assert_eq!(cooldown, vec![11, 12]);
    }
}
