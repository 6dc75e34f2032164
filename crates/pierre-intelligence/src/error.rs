// ABOUTME: Error type for interval analysis failures inside the orchestrator
// ABOUTME: Separates malformed activity data from provider fetch/write failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use pierre_core::errors::ProviderError;
use thiserror::Error;

/// Analysis failures; converted to a `FAILED` outcome at the orchestrator boundary
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Activity or lap data cannot support an annotation
    #[error("Invalid activity data: {0}")]
    InvalidInput(String),

    /// Fetching laps or writing the activity failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
