// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Provides Cross-Origin Resource Sharing setup for the browser front-end
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::config::environment::ServerConfig;
use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Configure CORS from `CORS_ALLOWED_ORIGINS`
///
/// `*` or an empty value allows any origin. Otherwise the comma-separated
/// origins are allowed and credentials (the session cookie) are permitted.
///
/// ```bash
/// export CORS_ALLOWED_ORIGINS="https://intervals.example.com"
/// ```
#[must_use]
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    // Credentials cannot be combined with a wildcard origin
    if origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}
