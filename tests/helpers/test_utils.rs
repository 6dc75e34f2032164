// ABOUTME: Workout fixtures and server assembly helpers for integration tests
// ABOUTME: Builds lap lists for interval, tempo and steady runs and in-memory server resources

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use super::synthetic_provider::{SyntheticOAuth, SyntheticProviderFactory, SyntheticStrava};
use chrono::{Duration, Utc};
use pierre_core::models::{Activity, Lap, SportType};
use pierre_intervals::config::environment::{Environment, ServerConfig, WebhookConfig};
use pierre_intervals::database::{Database, StravaTokens, User};
use pierre_intervals::security::cookies::USER_ID_COOKIE;
use pierre_intervals::server::ServerResources;
use std::sync::{Arc, Once};
use tokio::task::JoinHandle;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Lap whose elapsed and moving times are derived from distance and speed
#[must_use]
pub fn lap(index: u32, distance: f64, speed: f64) -> Lap {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = (distance / speed).round() as u64;
    Lap::new(index, distance, seconds, seconds, speed)
}

/// Lap with an average heart rate
#[must_use]
pub fn lap_with_hr(index: u32, distance: f64, speed: f64, heart_rate: f64) -> Lap {
    lap(index, distance, speed).with_heart_rate(heart_rate)
}

/// Twelve laps: 2 km warm-up, five 1 km repetitions with 400 m recoveries, 1.5 km cool-down
#[must_use]
pub fn five_by_four_laps() -> Vec<Lap> {
    let mut laps = vec![lap_with_hr(1, 2000.0, 3.0, 135.0)];
    let mut index = 2;
    for _ in 0..5 {
        laps.push(lap_with_hr(index, 1000.0, 1000.0 / 210.0, 172.0));
        laps.push(lap_with_hr(index + 1, 400.0, 2.0, 140.0));
        index += 2;
    }
    laps.push(lap_with_hr(index, 1500.0, 2.9, 138.0));
    laps
}

/// Warm-up, one dominant sustained lap, cool-down
#[must_use]
pub fn tempo_laps() -> Vec<Lap> {
    vec![
        lap(1, 2000.0, 3.0),
        lap(2, 6000.0, 4.0),
        lap(3, 2000.0, 3.0),
    ]
}

/// Ten identical 1 km laps
#[must_use]
pub fn steady_laps() -> Vec<Lap> {
    (1..=10).map(|index| lap(index, 1000.0, 3.2)).collect()
}

/// Run with heart rate and the given title
#[must_use]
pub fn run(id: u64, name: &str) -> Activity {
    Activity::new(id, name, SportType::Run)
        .with_distance(10_000.0)
        .with_average_speed(3.3)
        .with_heartrate(150.0)
}

/// Configuration for in-process servers
#[must_use]
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig {
        environment: Environment::Testing,
        database_url: "sqlite::memory:".to_owned(),
        webhook: WebhookConfig {
            workers: 1,
            queue_capacity: 16,
        },
        ..ServerConfig::default()
    };
    config.strava.webhook_verify_token = Some("verify-me".to_owned());
    config
}

/// In-memory server wired to the synthetic provider
pub struct TestServer {
    pub resources: Arc<ServerResources>,
    pub strava: Arc<SyntheticStrava>,
    pub oauth: Arc<SyntheticOAuth>,
    pub factory: Arc<SyntheticProviderFactory>,
    pub workers: Vec<JoinHandle<()>>,
}

impl TestServer {
    /// Server with the default test configuration
    pub async fn start() -> Self {
        Self::with_config(test_config()).await
    }

    /// Server with a custom configuration
    pub async fn with_config(config: ServerConfig) -> Self {
        init_test_logging();
        let database = Database::new(&config.database_url).await.unwrap();
        let strava = Arc::new(SyntheticStrava::new());
        let oauth = Arc::new(SyntheticOAuth::default());
        let factory = Arc::new(SyntheticProviderFactory::new(Arc::clone(&strava)));

        let (resources, workers) = ServerResources::new(
            config,
            database,
            Arc::clone(&oauth) as _,
            Arc::clone(&factory) as _,
        );
        Self {
            resources: Arc::new(resources),
            strava,
            oauth,
            factory,
            workers,
        }
    }

    /// Full router with middleware
    #[must_use]
    pub fn router(&self) -> axum::Router {
        pierre_intervals::server::build_router(Arc::clone(&self.resources))
    }

    /// Store an athlete whose token is valid for six hours
    pub async fn connect_athlete(&self, strava_id: u64) -> User {
        let tokens = StravaTokens {
            access_token: format!("access-{strava_id}"),
            refresh_token: format!("refresh-{strava_id}"),
            expires_at: Utc::now() + Duration::hours(6),
        };
        self.resources
            .database
            .upsert_strava_user(strava_id, "Test Athlete", &tokens)
            .await
            .unwrap()
    }

    /// Cookie header value for a stored athlete
    #[must_use]
    pub fn session_cookie(user: &User) -> String {
        format!("{USER_ID_COOKIE}={}", user.id)
    }
}
