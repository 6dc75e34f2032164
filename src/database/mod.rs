// ABOUTME: SQLite database manager for athlete tokens and webhook audit rows
// ABOUTME: Opens the pool, runs idempotent migrations and hosts shared row helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Two tables back the service: `users` holds one row per connected Strava
//! athlete with its token pair, `webhook_events` keeps an audit trail of every
//! push notification and how its processing ended.

mod users;
mod webhook_events;

pub use users::{StravaTokens, User, UserSummary};
pub use webhook_events::{WebhookEventRecord, WebhookEventStatus};

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Pool, Row, Sqlite, Type};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Pool size for file-backed databases
const MAX_CONNECTIONS: u32 = 5;

/// Database manager for athlete and webhook storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be created, or
    /// a migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            Self::ensure_parent_directory(database_url).await?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL: {e}")))?
            .create_if_missing(true);

        // Each in-memory connection is its own database, so keep exactly one
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { MAX_CONNECTIONS })
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        info!(in_memory, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_webhook_events().await?;
        Ok(())
    }

    /// Cheap connectivity probe for readiness checks
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot run a query
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn ensure_parent_directory(database_url: &str) -> AppResult<()> {
        let path = database_url
            .trim_start_matches("sqlite:")
            .trim_start_matches("//");
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::database(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(())
    }
}

/// Strava ids are unsigned, `SQLite` integers are signed
pub(crate) fn to_db_id(id: u64) -> AppResult<i64> {
    i64::try_from(id).map_err(|_| AppError::invalid_input(format!("id {id} out of range")))
}

pub(crate) fn from_db_id(id: i64) -> AppResult<u64> {
    u64::try_from(id).map_err(|_| AppError::database(format!("negative id {id} in database")))
}

/// Read a column, naming it in the error
pub(crate) fn column<'r, T>(row: &'r SqliteRow, name: &str) -> AppResult<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| AppError::database(format!("Failed to get column '{name}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_conversion_bounds() {
        assert_eq!(to_db_id(42).unwrap(), 42);
        assert!(to_db_id(u64::MAX).is_err());
        assert!(from_db_id(-1).is_err());
    }

    #[tokio::test]
    async fn test_in_memory_database_migrates_and_pings() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.ping().await.unwrap();
        // Migrations are idempotent
        db.migrate().await.unwrap();
    }
}
