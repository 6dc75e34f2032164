// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Exposes the environment-driven ServerConfig and its sub-sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! All settings come from environment variables. The interval detection
//! tunables live in `pierre_intelligence` and are loaded here so the engine
//! receives them by injection.

/// Environment and server configuration
pub mod environment;

pub use environment::{CronConfig, Environment, ServerConfig, StravaAppConfig, WebhookConfig};
