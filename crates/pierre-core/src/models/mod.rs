// ABOUTME: Core data models and types for the interval annotation service
// ABOUTME: Re-exports Activity, Lap, ActivityUpdate and SportType
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! These models provide a provider-agnostic representation of the activity
//! data the interval heuristics consume. Provider DTOs are converted into them
//! at the ingestion boundary, so required fields are always present here.
//!
//! - `Activity`: a single recorded session
//! - `Lap`: one recorded segment of an activity
//! - `ActivityUpdate`: title/description write-back payload
//! - `SportType`: enumeration of activity types

mod activity;
mod sport;

pub use activity::{Activity, ActivityUpdate, Lap};
pub use sport::SportType;
