// ABOUTME: Webhook audit storage: one row per Strava push notification and its processing status
// ABOUTME: Rows move RECEIVED -> PROCESSING -> COMPLETED or FAILED as the dispatcher works
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{column, from_db_id, to_db_id, Database};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use pierre_providers::StravaWebhookEvent;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use std::fmt;
use uuid::Uuid;

/// Processing status of a webhook event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEventStatus {
    /// Stored, waiting in the dispatch queue
    Received,
    /// Picked up by a worker
    Processing,
    /// Processing finished (annotated or deliberately skipped)
    Completed,
    /// Processing failed
    Failed,
}

impl WebhookEventStatus {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Parse the database representation
    ///
    /// # Errors
    ///
    /// Returns a database error for unknown values
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "RECEIVED" => Ok(Self::Received),
            "PROCESSING" => Ok(Self::Processing),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(AppError::database(format!(
                "Unknown webhook event status '{other}'"
            ))),
        }
    }

    /// Whether processing is over
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for WebhookEventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored webhook event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEventRecord {
    /// Audit row id, returned to Strava as `eventId`
    pub id: Uuid,
    /// Activity (or athlete) id
    pub object_id: u64,
    /// Athlete owning the object
    pub owner_id: u64,
    /// "activity" or "athlete"
    pub object_type: String,
    /// "create", "update" or "delete"
    pub aspect_type: String,
    /// Raw event as received
    pub payload: serde_json::Value,
    /// Current status
    pub status: WebhookEventStatus,
    /// Outcome message once processed
    pub message: Option<String>,
    /// Reception time
    pub created_at: DateTime<Utc>,
    /// Time processing ended
    pub completed_at: Option<DateTime<Utc>>,
}

impl Database {
    pub(super) async fn migrate_webhook_events(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS webhook_events (
                id TEXT PRIMARY KEY,
                object_id INTEGER NOT NULL,
                owner_id INTEGER NOT NULL,
                object_type TEXT NOT NULL,
                aspect_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'RECEIVED'
                    CHECK (status IN ('RECEIVED', 'PROCESSING', 'COMPLETED', 'FAILED')),
                message TEXT,
                created_at TEXT NOT NULL,
                completed_at TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_webhook_events_created_at ON webhook_events(created_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_webhook_events_object_id ON webhook_events(object_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a freshly received event with status `RECEIVED`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails
    pub async fn record_webhook_event(&self, event: &StravaWebhookEvent) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        let payload = serde_json::to_string(event)?;

        sqlx::query(
            r"
            INSERT INTO webhook_events (id, object_id, owner_id, object_type, aspect_type, payload, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(id.to_string())
        .bind(to_db_id(event.object_id)?)
        .bind(to_db_id(event.owner_id)?)
        .bind(&event.object_type)
        .bind(&event.aspect_type)
        .bind(payload)
        .bind(WebhookEventStatus::Received.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Move an event to a new status; terminal statuses stamp `completed_at`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the event does not exist
    pub async fn update_webhook_event_status(
        &self,
        event_id: Uuid,
        status: WebhookEventStatus,
        message: Option<&str>,
    ) -> AppResult<()> {
        let completed_at = status.is_terminal().then(Utc::now);

        let result = sqlx::query(
            r"
            UPDATE webhook_events SET
                status = $2,
                message = COALESCE($3, message),
                completed_at = $4
            WHERE id = $1
            ",
        )
        .bind(event_id.to_string())
        .bind(status.as_str())
        .bind(message)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Webhook event {event_id}")));
        }
        Ok(())
    }

    /// Get one event
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get_webhook_event(&self, event_id: Uuid) -> AppResult<Option<WebhookEventRecord>> {
        let row = sqlx::query("SELECT * FROM webhook_events WHERE id = $1")
            .bind(event_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_event).transpose()
    }

    /// Most recent events first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_recent_webhook_events(&self, limit: u32) -> AppResult<Vec<WebhookEventRecord>> {
        let rows = sqlx::query("SELECT * FROM webhook_events ORDER BY created_at DESC LIMIT $1")
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_event).collect()
    }
}

fn row_to_event(row: &SqliteRow) -> AppResult<WebhookEventRecord> {
    let id: String = column(row, "id")?;
    let payload: String = column(row, "payload")?;
    let status: String = column(row, "status")?;

    Ok(WebhookEventRecord {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid event id '{id}': {e}")))?,
        object_id: from_db_id(column(row, "object_id")?)?,
        owner_id: from_db_id(column(row, "owner_id")?)?,
        object_type: column(row, "object_type")?,
        aspect_type: column(row, "aspect_type")?,
        payload: serde_json::from_str(&payload)?,
        status: WebhookEventStatus::parse(&status)?,
        message: column(row, "message")?,
        created_at: column(row, "created_at")?,
        completed_at: column(row, "completed_at")?,
    })
}
