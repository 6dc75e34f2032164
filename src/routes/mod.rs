// ABOUTME: Route module organization for the interval annotation HTTP endpoints
// ABOUTME: Webhook ingestion, OAuth session, manual and batch analysis, health checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module
//!
//! Each domain module exposes a `*Routes::routes(resources)` constructor with
//! thin handlers that delegate to the service layer.

/// Recent activity listing
pub mod activities;
/// Manual analysis trigger
pub mod analyze;
/// Strava `OAuth` and browser session
pub mod auth;
/// Batch analysis for every connected athlete
pub mod cron;
/// Health check routes
pub mod health;
/// Strava push subscription endpoint
pub mod webhook;

pub use activities::ActivityRoutes;
pub use analyze::AnalyzeRoutes;
pub use auth::AuthRoutes;
pub use cron::CronRoutes;
pub use health::HealthRoutes;
pub use webhook::WebhookRoutes;
