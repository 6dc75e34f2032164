// ABOUTME: Application error types re-exported from pierre-core
// ABOUTME: Keeps `crate::errors::AppError` paths stable for handlers and services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! `AppError` renders as `{"error": {"code", "message"}}` with the HTTP status
//! mapped from its `ErrorCode`. Provider and database errors convert into it.

pub use pierre_core::errors::{
    AppError, AppResult, ErrorCode, ErrorResponse, ErrorResponseDetails, ProviderError,
};
