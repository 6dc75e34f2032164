// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Generates x-request-id, opens a span per request and bounds request time and size
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use http::{HeaderName, Request};
use std::time::Duration;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Webhook and API bodies are small JSON documents
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Upper bound for one request, including synchronous manual analysis
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Wrap `router` with request ids, tracing, timeout and body limit
#[must_use]
pub fn apply_http_layers(router: Router) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    // Layers run bottom-up: the id must be set before the trace span reads it
    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}
