// ABOUTME: Server assembly: shared resources, router construction and the serve loop
// ABOUTME: Owns the webhook workers and shuts them down after the listener stops
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server
//!
//! [`ServerResources`] is built once at startup and shared with every handler
//! through axum state. Collaborators with external side effects (`OAuth`,
//! Strava API) sit behind traits so the whole HTTP surface can run against
//! in-process fakes.

use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::middleware::{apply_http_layers, setup_cors};
use crate::routes::{
    ActivityRoutes, AnalyzeRoutes, AuthRoutes, CronRoutes, HealthRoutes, WebhookRoutes,
};
use crate::services::{
    OAuthExchange, ProviderFactory, StravaProviderFactory, TokenService, WebhookDispatcher,
    WebhookProcessor,
};
use anyhow::{Context, Result};
use axum::Router;
use pierre_intelligence::ActivityAnalyzer;
use pierre_providers::initialize_shared_client;
use std::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

/// Time allowed for queued webhook jobs to finish after shutdown
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state for all handlers
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Persistence
    pub database: Database,
    /// Interval analysis engine
    pub analyzer: Arc<ActivityAnalyzer>,
    /// `OAuth` code exchange and refresh
    pub oauth: Arc<dyn OAuthExchange>,
    /// Per-athlete provider construction
    pub providers: Arc<dyn ProviderFactory>,
    /// Access-token lifecycle
    pub tokens: TokenService,
    /// Activity webhook processing
    pub processor: Arc<WebhookProcessor>,
    /// Webhook queue
    pub dispatcher: WebhookDispatcher,
}

impl ServerResources {
    /// Assemble resources and start the webhook workers
    #[must_use]
    pub fn new(
        config: ServerConfig,
        database: Database,
        oauth: Arc<dyn OAuthExchange>,
        providers: Arc<dyn ProviderFactory>,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let analyzer = Arc::new(ActivityAnalyzer::new(config.intervals.clone()));
        let tokens = TokenService::new(database.clone(), Arc::clone(&oauth));
        let processor = Arc::new(WebhookProcessor::new(
            database.clone(),
            tokens.clone(),
            Arc::clone(&providers),
            Arc::clone(&analyzer),
        ));
        let (dispatcher, workers) =
            WebhookDispatcher::spawn(Arc::clone(&processor), database.clone(), config.webhook);

        let resources = Self {
            config: Arc::new(config),
            database,
            analyzer,
            oauth,
            providers,
            tokens,
            processor,
            dispatcher,
        };
        (resources, workers)
    }

    /// Resources wired to the real Strava API
    #[must_use]
    pub fn for_strava(config: ServerConfig, database: Database) -> (Self, Vec<JoinHandle<()>>) {
        let oauth: Arc<dyn OAuthExchange> = Arc::new(config.strava_oauth());
        let providers: Arc<dyn ProviderFactory> = Arc::new(StravaProviderFactory::new(
            config.strava.api_base_url.clone(),
        ));
        Self::new(config, database, oauth, providers)
    }

    /// Whether cookies must carry the `Secure` attribute
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.config.environment.is_production()
    }
}

/// Build the complete application router
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);

    let router = Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(WebhookRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(AnalyzeRoutes::routes(Arc::clone(&resources)))
        .merge(ActivityRoutes::routes(Arc::clone(&resources)))
        .merge(CronRoutes::routes(resources))
        .layer(cors);

    apply_http_layers(router)
}

/// HTTP server for the interval annotation service
pub struct IntervalServer {
    resources: Arc<ServerResources>,
    workers: Vec<JoinHandle<()>>,
}

impl IntervalServer {
    /// Open the database, configure the HTTP client and start the workers
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn bootstrap(config: ServerConfig) -> Result<Self> {
        initialize_shared_client(config.http_client);

        let database = Database::new(&config.database_url)
            .await
            .context("Failed to initialize database")?;

        let (resources, workers) = ServerResources::for_strava(config, database);
        Ok(Self {
            resources: Arc::new(resources),
            workers,
        })
    }

    /// Serve until Ctrl-C, then let queued webhook jobs finish
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails
    pub async fn run(self) -> Result<()> {
        let config = Arc::clone(&self.resources.config);
        let address = format!("{}:{}", config.host, config.http_port);
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;
        info!("Listening on http://{address}");

        let app = build_router(self.resources);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        // The router (and its dispatcher clone) is gone: workers drain and exit
        info!("HTTP server stopped, draining webhook queue");
        for worker in self.workers {
            match timeout(WORKER_DRAIN_TIMEOUT, worker).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Webhook worker panicked"),
                Err(_) => warn!("Webhook worker did not finish before the drain timeout"),
            }
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
