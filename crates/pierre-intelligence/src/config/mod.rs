// ABOUTME: Configuration module for pierre-intelligence crate
// ABOUTME: Re-exports interval detection tunables and their validation error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Interval detection thresholds (classifier, segmenter, formatter)
pub mod detection;

pub use detection::{
    ClassifierThresholds, FormatterTolerances, IntervalConfigError, IntervalDetectionConfig,
    SegmenterThresholds,
};
