// ABOUTME: Core types and constants for the Pierre interval annotation service
// ABOUTME: Foundation crate with error handling, activity/lap models, and wire markers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Core
//!
//! Foundation crate providing shared types and constants for the Pierre interval
//! annotation service. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ProviderError`
//! - **constants**: Wire markers written into activity titles and descriptions
//! - **models**: `Activity`, `Lap`, `SportType` and the `ActivityUpdate` write-back payload

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Activity, Lap, SportType)
pub mod models;
