// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Request ids, per-request spans, timeouts, body limits and CORS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS configuration
pub mod cors;
/// Request id propagation and tracing spans
pub mod tracing;

pub use cors::setup_cors;
pub use tracing::apply_http_layers;
