// ABOUTME: Shared test helpers and utilities for integration tests
// ABOUTME: Exports the synthetic Strava provider, workout fixtures and HTTP request helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
pub mod synthetic_provider;
pub mod test_utils;
