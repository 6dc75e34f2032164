// ABOUTME: Server binary for the Strava interval annotation service
// ABOUTME: Loads environment configuration, initializes logging and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Pierre Intervals Server Binary
//!
//! Receives Strava activity webhooks and annotates interval workouts.

use anyhow::Result;
use clap::Parser;
use pierre_intervals::{config::environment::ServerConfig, logging, server::IntervalServer};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pierre-intervals-server")]
#[command(about = "Pierre Intervals - Strava interval workout annotation service")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    config.validate()?;

    logging::init_from_env()?;

    info!("Starting Pierre Intervals");
    info!("{}", config.summary());
    display_available_endpoints(&config);

    let server = IntervalServer::bootstrap(config).await?;
    if let Err(e) = server.run().await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    info!("Server stopped");
    Ok(())
}

/// Display the HTTP surface at startup
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let base = &config.base_url;
    info!("=== Available API Endpoints ===");
    info!("Strava Webhook:");
    info!("   Validation:        GET  {base}/api/webhook");
    info!("   Events:            POST {base}/api/webhook");
    info!("Authentication:");
    info!("   Authorize URL:     GET  {base}/api/auth/url");
    info!("   OAuth Callback:    GET  {base}/api/auth/callback");
    info!("   Session Status:    GET  {base}/api/auth/status");
    info!("   Logout:            POST {base}/api/auth/logout");
    info!("Analysis:");
    info!("   Analyze Activity:  GET  {base}/api/analyze/{{activity_id}}");
    info!("   Recent Activities: GET  {base}/api/activities?count=N");
    info!("   Batch Run:         GET  {base}/api/cron");
    info!("Health:");
    info!("   Liveness:          GET  {base}/health");
    info!("   Readiness:         GET  {base}/ready");
    info!("=== End of Endpoint List ===");
}
