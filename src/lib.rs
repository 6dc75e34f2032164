// ABOUTME: Main library entry point for the Pierre interval annotation server
// ABOUTME: Wires configuration, persistence, webhook dispatch and HTTP routes around the analysis engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Intervals
//!
//! A Strava companion service that recognizes interval workouts and rewrites
//! the activity title and description with a per-repetition breakdown.
//!
//! ## Architecture
//!
//! - **`pierre_intelligence`**: classification, segmentation, statistics and text
//!   composition, plus the `ActivityAnalyzer` state machine
//! - **`pierre_providers`**: Strava REST client and `OAuth` flow
//! - **This crate**: environment configuration, `SQLite` persistence, the webhook
//!   dispatcher and the axum HTTP surface
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pierre_intervals::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("{}", config.summary());
//!     Ok(())
//! }
//! ```

/// Environment-based configuration
pub mod config;

/// `SQLite` persistence for athletes and webhook audit rows
pub mod database;

/// Error types shared with the workspace crates
pub mod errors;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (CORS, request ids, tracing)
pub mod middleware;

/// HTTP route handlers
pub mod routes;

/// Cookie helpers for the browser session
pub mod security;

/// Server assembly and shared resources
pub mod server;

/// Token, webhook processing and dispatch services
pub mod services;
