// ABOUTME: Athlete storage: one row per connected Strava athlete with its OAuth token pair
// ABOUTME: Upsert on OAuth callback, lookups by id or Strava id, token rotation, listing for cron
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{column, from_db_id, to_db_id, Database};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use std::fmt;
use uuid::Uuid;

/// Token pair for one athlete
#[derive(Clone, PartialEq, Eq)]
pub struct StravaTokens {
    /// Bearer token for API calls
    pub access_token: String,
    /// Token used to obtain a new access token
    pub refresh_token: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for StravaTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StravaTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Connected athlete
#[derive(Debug, Clone)]
pub struct User {
    /// Internal id, also the session cookie value
    pub id: Uuid,
    /// Strava athlete id (`owner_id` in webhook events)
    pub strava_id: u64,
    /// "firstname lastname"
    pub name: String,
    /// Current token pair
    pub tokens: StravaTokens,
    /// First connection
    pub created_at: DateTime<Utc>,
    /// Last profile or token change
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public projection without tokens
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            strava_id: self.strava_id,
            name: self.name.clone(),
        }
    }
}

/// User fields safe to return to the browser
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Internal id
    pub id: Uuid,
    /// Strava athlete id
    pub strava_id: u64,
    /// Display name
    pub name: String,
}

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                strava_id INTEGER NOT NULL UNIQUE,
                name TEXT NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_strava_id ON users(strava_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create the athlete on first connection, refresh name and tokens otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn upsert_strava_user(
        &self,
        strava_id: u64,
        name: &str,
        tokens: &StravaTokens,
    ) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query(
            r"
            INSERT INTO users (id, strava_id, name, access_token, refresh_token, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT(strava_id) DO UPDATE SET
                name = excluded.name,
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(to_db_id(strava_id)?)
        .bind(name)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(tokens.expires_at.timestamp())
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_user_by_strava_id(strava_id)
            .await?
            .ok_or_else(|| AppError::database(format!("athlete {strava_id} missing after upsert")))
    }

    /// Get an athlete by internal id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Get an athlete by Strava athlete id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed
    pub async fn get_user_by_strava_id(&self, strava_id: u64) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE strava_id = $1")
            .bind(to_db_id(strava_id)?)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// Replace an athlete's token pair
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the athlete does not exist
    pub async fn update_user_tokens(&self, user_id: Uuid, tokens: &StravaTokens) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                access_token = $2,
                refresh_token = $3,
                expires_at = $4,
                updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(tokens.expires_at.timestamp())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id}")));
        }
        Ok(())
    }

    /// All connected athletes, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_user).collect()
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id: String = column(row, "id")?;
    let expires_at: i64 = column(row, "expires_at")?;

    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid user id '{id}': {e}")))?,
        strava_id: from_db_id(column(row, "strava_id")?)?,
        name: column(row, "name")?,
        tokens: StravaTokens {
            access_token: column(row, "access_token")?,
            refresh_token: column(row, "refresh_token")?,
            expires_at: DateTime::from_timestamp(expires_at, 0).ok_or_else(|| {
                AppError::database(format!("Invalid expires_at {expires_at}"))
            })?,
        },
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}
