// ABOUTME: Interval workout detection and description engine
// ABOUTME: Classifies runs, segments laps, formats statistics and writes annotations back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Intelligence
//!
//! Decides whether a recorded run is a structured interval session and, if
//! so, rewrites its title and description with per-repetition pace and heart
//! rate. The pipeline is:
//!
//! 1. [`classifier`]: interval vs endurance/tempo/steady run
//! 2. [`segmenter`]: warm-up, work, recovery and cool-down buckets
//! 3. [`formatter`]: pace, heart-rate, recovery and interval-format strings
//! 4. [`composer`]: description sections and the enriched title
//! 5. [`orchestrator`]: runs 1-4 and performs the provider write-back
//!
//! All heuristics are best-effort. Thresholds live in
//! [`config::IntervalDetectionConfig`] and are injected at construction.

/// Segment classifier
pub mod classifier;
/// Description and title composer
pub mod composer;
/// Interval detection tunables
pub mod config;
/// Analysis error type
pub mod error;
/// Statistics formatter
pub mod formatter;
/// Analysis orchestrator and provider seam
pub mod orchestrator;
/// Activity name parsing
pub mod pattern;
/// Interval segmenter
pub mod segmenter;

pub use classifier::{Classification, IntervalEvidence, SegmentClassifier, SkipReason};
pub use composer::{
    extract_stats_from_description, generate_enhanced_title, has_enhanced_title, shows_annotation,
    DescriptionStats,
};
pub use config::{IntervalConfigError, IntervalDetectionConfig};
pub use error::AnalysisError;
pub use orchestrator::{ActivityAnalyzer, ActivityProvider, AnalysisOutcome, AnalysisState};
pub use segmenter::{IntervalSegmenter, WorkoutSegmentation};
