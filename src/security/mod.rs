// ABOUTME: Security utilities for the browser session
// ABOUTME: Hosts the HttpOnly cookie helpers used by the auth routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Session cookie helpers
pub mod cookies;
