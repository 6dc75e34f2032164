// ABOUTME: Activity name parsing for explicit interval shapes like "5x4" or "10 X 400"
// ABOUTME: Also detects endurance keywords that exclude an activity from annotation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `<repetitions> x <unit>` anywhere in the title
static INTERVAL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*[xX]\s*(\d+)").ok());

/// Interval shape declared by the athlete in the activity title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPattern {
    /// Number of repetitions (the "5" in "5x4")
    pub repetitions: u32,
    /// Duration or distance of one repetition, unit-less as written (the "4")
    pub unit_value: u32,
}

impl IntervalPattern {
    /// Parse the first `<n>x<m>` token of an activity name
    ///
    /// Returns `None` when no token is present or the numbers overflow.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let captures = INTERVAL_PATTERN.as_ref()?.captures(name)?;
        let repetitions = captures.get(1)?.as_str().parse().ok()?;
        let unit_value = captures.get(2)?.as_str().parse().ok()?;
        Some(Self {
            repetitions,
            unit_value,
        })
    }
}

/// Whether the name carries an explicit `<n>x<m>` interval token
#[must_use]
pub fn has_interval_pattern(name: &str) -> bool {
    INTERVAL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name))
}

/// Case-insensitive keyword check ("Endurance", "footing ENDURANCE", ...)
#[must_use]
pub fn contains_keyword(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.to_lowercase())
}
