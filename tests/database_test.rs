// ABOUTME: Integration tests for athlete and webhook audit persistence
// ABOUTME: Runs against in-memory and file-backed SQLite databases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Duration, Utc};
use pierre_intervals::database::{Database, StravaTokens, WebhookEventStatus};
use pierre_intervals::errors::ErrorCode;
use pierre_providers::StravaWebhookEvent;
use std::time::Duration as StdDuration;
use tempfile::TempDir;
use uuid::Uuid;

fn tokens(access: &str) -> StravaTokens {
    StravaTokens {
        access_token: access.to_owned(),
        refresh_token: format!("{access}-refresh"),
        expires_at: Utc::now() + Duration::hours(6),
    }
}

fn event(object_id: u64, aspect_type: &str) -> StravaWebhookEvent {
    StravaWebhookEvent {
        object_type: "activity".to_owned(),
        object_id,
        aspect_type: aspect_type.to_owned(),
        owner_id: 42,
        subscription_id: Some(1),
        event_time: Some(1_700_000_000),
        updates: None,
    }
}

async fn memory_db() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_upsert_creates_then_updates_same_athlete() {
    let db = memory_db().await;

    let first = db.upsert_strava_user(42, "Ada", &tokens("a1")).await.unwrap();
    let second = db
        .upsert_strava_user(42, "Ada Lovelace", &tokens("a2"))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "Ada Lovelace");
    assert_eq!(second.tokens.access_token, "a2");
    assert_eq!(db.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_lookup_by_id_and_athlete() {
    let db = memory_db().await;
    let user = db.upsert_strava_user(7, "Bob", &tokens("b")).await.unwrap();

    let by_id = db.get_user(user.id).await.unwrap().unwrap();
    let by_athlete = db.get_user_by_strava_id(7).await.unwrap().unwrap();

    assert_eq!(by_id.id, by_athlete.id);
    assert_eq!(by_athlete.strava_id, 7);
    assert!(db.get_user(Uuid::new_v4()).await.unwrap().is_none());
    assert!(db.get_user_by_strava_id(8).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_tokens() {
    let db = memory_db().await;
    let user = db.upsert_strava_user(9, "Cy", &tokens("old")).await.unwrap();

    db.update_user_tokens(user.id, &tokens("new")).await.unwrap();
    let stored = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.tokens.access_token, "new");
    assert_eq!(
        stored.tokens.expires_at.timestamp(),
        tokens("new").expires_at.timestamp()
    );

    let missing = db.update_user_tokens(Uuid::new_v4(), &tokens("x")).await;
    assert_eq!(missing.unwrap_err().code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_token_debug_is_redacted() {
    let rendered = format!("{:?}", tokens("very-secret"));
    assert!(!rendered.contains("very-secret"));
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("nested/intervals.db").display());

    {
        let db = Database::new(&url).await.unwrap();
        db.upsert_strava_user(5, "Dee", &tokens("d")).await.unwrap();
    }

    let reopened = Database::new(&url).await.unwrap();
    assert!(reopened.get_user_by_strava_id(5).await.unwrap().is_some());
}

// ============================================================================
// Webhook events
// ============================================================================

#[tokio::test]
async fn test_webhook_event_lifecycle() {
    let db = memory_db().await;
    let id = db.record_webhook_event(&event(100, "create")).await.unwrap();

    let received = db.get_webhook_event(id).await.unwrap().unwrap();
    assert_eq!(received.status, WebhookEventStatus::Received);
    assert_eq!(received.object_id, 100);
    assert_eq!(received.payload["aspect_type"], "create");
    assert!(received.completed_at.is_none());

    db.update_webhook_event_status(id, WebhookEventStatus::Processing, None)
        .await
        .unwrap();
    let processing = db.get_webhook_event(id).await.unwrap().unwrap();
    assert_eq!(processing.status, WebhookEventStatus::Processing);
    assert!(processing.completed_at.is_none());

    db.update_webhook_event_status(id, WebhookEventStatus::Completed, Some("Activity updated"))
        .await
        .unwrap();
    let completed = db.get_webhook_event(id).await.unwrap().unwrap();
    assert_eq!(completed.status, WebhookEventStatus::Completed);
    assert_eq!(completed.message.as_deref(), Some("Activity updated"));
    assert!(completed.completed_at.is_some());
}

#[tokio::test]
async fn test_recent_events_are_newest_first_and_limited() {
    let db = memory_db().await;
    let mut ids = Vec::new();
    for object_id in 1..=4 {
        ids.push(db.record_webhook_event(&event(object_id, "update")).await.unwrap());
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }

    let recent = db.list_recent_webhook_events(3).await.unwrap();

    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].id, ids[3]);
    assert_eq!(recent[2].id, ids[1]);
}

#[tokio::test]
async fn test_unknown_event_status_update_is_not_found() {
    let db = memory_db().await;

    let result = db
        .update_webhook_event_status(Uuid::new_v4(), WebhookEventStatus::Failed, Some("x"))
        .await;

    assert_eq!(result.unwrap_err().code, ErrorCode::ResourceNotFound);
}
