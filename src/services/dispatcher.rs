// ABOUTME: Bounded webhook queue drained by a fixed pool of worker tasks
// ABOUTME: Handlers enqueue and answer Strava immediately, workers update the audit row as they go
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::WebhookConfig;
use crate::database::{Database, WebhookEventStatus};
use crate::logging::AppLogger;
use pierre_providers::StravaWebhookEvent;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::webhook_processor::WebhookProcessor;

/// One queued webhook event
#[derive(Debug, Clone)]
pub struct WebhookJob {
    /// Audit row id
    pub event_id: Uuid,
    /// Event payload
    pub event: StravaWebhookEvent,
}

/// Why a job could not be queued
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// All queue slots are taken
    #[error("webhook queue is full")]
    QueueFull,
    /// Workers have stopped
    #[error("webhook dispatcher is shut down")]
    Closed,
}

/// Sending half of the webhook queue
#[derive(Clone)]
pub struct WebhookDispatcher {
    sender: mpsc::Sender<WebhookJob>,
}

impl WebhookDispatcher {
    /// Spawn `config.workers` workers sharing a queue of `config.queue_capacity`
    ///
    /// Workers exit once every dispatcher clone is dropped and the queue is drained.
    #[must_use]
    pub fn spawn(
        processor: Arc<WebhookProcessor>,
        database: Database,
        config: WebhookConfig,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..config.workers.max(1))
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                let processor = Arc::clone(&processor);
                let database = database.clone();
                tokio::spawn(async move {
                    run_worker(worker_id, &receiver, &processor, &database).await;
                })
            })
            .collect();

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "Webhook dispatcher started"
        );
        (Self { sender }, workers)
    }

    /// Queue a job without waiting
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::QueueFull` when the queue is at capacity and
    /// `DispatchError::Closed` when the workers are gone
    pub fn enqueue(&self, job: WebhookJob) -> Result<(), DispatchError> {
        self.sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Jobs waiting for a worker
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Queue bound
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: &Mutex<mpsc::Receiver<WebhookJob>>,
    processor: &WebhookProcessor,
    database: &Database,
) {
    loop {
        // Lock only while waiting so other workers can pick up the next job
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else {
            debug!(worker_id, "Webhook worker stopping");
            return;
        };
        process_job(worker_id, job, processor, database).await;
    }
}

async fn process_job(
    worker_id: usize,
    job: WebhookJob,
    processor: &WebhookProcessor,
    database: &Database,
) {
    let event_id = job.event_id;
    if let Err(e) = database
        .update_webhook_event_status(event_id, WebhookEventStatus::Processing, None)
        .await
    {
        warn!(%event_id, error = %e, "Failed to mark webhook event as processing");
    }

    let result = processor.process_activity_webhook(&job.event).await;
    if let Some(outcome) = &result.outcome {
        AppLogger::log_analysis_outcome("webhook", outcome);
    }

    let status = if result.success {
        WebhookEventStatus::Completed
    } else {
        WebhookEventStatus::Failed
    };
    debug!(worker_id, %event_id, status = status.as_str(), "Webhook event processed");

    if let Err(e) = database
        .update_webhook_event_status(event_id, status, Some(&result.message))
        .await
    {
        warn!(%event_id, error = %e, "Failed to record webhook event result");
    }
}
