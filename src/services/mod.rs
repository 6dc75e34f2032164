// ABOUTME: Domain service layer between HTTP handlers and the analysis engine
// ABOUTME: Provider seams, token lifecycle, webhook processing and the dispatch queue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Handlers stay thin: they parse requests and delegate here. Every entry
//! point (webhook, manual trigger, cron) ends in
//! `ActivityAnalyzer::analyze_activity`.

/// Webhook dispatch queue and workers
pub mod dispatcher;

/// Seams over the Strava client and `OAuth` helper
pub mod provider;

/// Access-token lifecycle (refresh before expiry)
pub mod tokens;

/// Activity webhook processing
pub mod webhook_processor;

pub use dispatcher::{DispatchError, WebhookDispatcher, WebhookJob};
pub use provider::{AthleteActivityProvider, OAuthExchange, ProviderFactory, StravaProviderFactory};
pub use tokens::TokenService;
pub use webhook_processor::{WebhookProcessingResult, WebhookProcessor};
