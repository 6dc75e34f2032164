// ABOUTME: Synthetic Strava provider and OAuth exchange for tests without network access
// ABOUTME: Stores activities and laps in memory and records every write-back

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use async_trait::async_trait;
use pierre_core::constants::oauth_providers;
use pierre_core::models::{Activity, ActivityUpdate, Lap};
use pierre_intelligence::ActivityProvider;
use pierre_intervals::services::{AthleteActivityProvider, OAuthExchange, ProviderFactory};
use pierre_providers::strava::models::StravaAthleteSummary;
use pierre_providers::{ProviderError, StravaTokenResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Authorization code accepted by [`SyntheticOAuth`]
pub const VALID_CODE: &str = "valid-code";

/// Athlete returned by [`SyntheticOAuth`] on code exchange
pub const SYNTHETIC_ATHLETE_ID: u64 = 424_242;

fn not_found(resource: String) -> ProviderError {
    ProviderError::NotFound {
        provider: oauth_providers::STRAVA.to_owned(),
        resource,
    }
}

/// In-memory stand-in for the Strava activity API
///
/// Activities keep insertion order; `recent_activities` returns the newest
/// (last inserted) first and, like Strava's summary listing, without descriptions.
#[derive(Default)]
pub struct SyntheticStrava {
    activities: RwLock<Vec<Activity>>,
    laps: RwLock<HashMap<u64, Vec<Lap>>>,
    updates: RwLock<Vec<(u64, ActivityUpdate)>>,
    fail_laps: AtomicBool,
    reject_title_updates: AtomicBool,
    lap_fetches: AtomicUsize,
}

impl SyntheticStrava {
    /// Empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an activity with its laps
    pub fn insert(&self, activity: Activity, laps: Vec<Lap>) {
        self.laps.write().unwrap().insert(activity.id, laps);
        self.activities.write().unwrap().push(activity);
    }

    /// Current stored copy of an activity
    #[must_use]
    pub fn activity(&self, id: u64) -> Option<Activity> {
        self.activities
            .read()
            .unwrap()
            .iter()
            .find(|activity| activity.id == id)
            .cloned()
    }

    /// Every successful write-back, in order
    #[must_use]
    pub fn updates(&self) -> Vec<(u64, ActivityUpdate)> {
        self.updates.read().unwrap().clone()
    }

    /// Number of lap requests served or failed
    #[must_use]
    pub fn lap_fetches(&self) -> usize {
        self.lap_fetches.load(Ordering::SeqCst)
    }

    /// Make every lap request fail
    pub fn fail_lap_requests(&self) {
        self.fail_laps.store(true, Ordering::SeqCst);
    }

    /// Reject updates that carry a title, accept description-only updates
    pub fn reject_title_updates(&self) {
        self.reject_title_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActivityProvider for SyntheticStrava {
    async fn fetch_activity(&self, activity_id: u64) -> Result<Activity, ProviderError> {
        self.activity(activity_id)
            .ok_or_else(|| not_found(format!("activity {activity_id}")))
    }

    async fn fetch_laps(&self, activity_id: u64) -> Result<Vec<Lap>, ProviderError> {
        self.lap_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_laps.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                provider: oauth_providers::STRAVA.to_owned(),
                status: 500,
                message: "laps unavailable".to_owned(),
            });
        }
        self.laps
            .read()
            .unwrap()
            .get(&activity_id)
            .cloned()
            .ok_or_else(|| not_found(format!("laps of activity {activity_id}")))
    }

    async fn update_activity(
        &self,
        activity_id: u64,
        update: &ActivityUpdate,
    ) -> Result<(), ProviderError> {
        if update.name.is_some() && self.reject_title_updates.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                provider: oauth_providers::STRAVA.to_owned(),
                status: 422,
                message: "name rejected".to_owned(),
            });
        }

        let mut activities = self.activities.write().unwrap();
        let stored = activities
            .iter_mut()
            .find(|activity| activity.id == activity_id)
            .ok_or_else(|| not_found(format!("activity {activity_id}")))?;
        *stored = stored.annotated(update);
        self.updates
            .write()
            .unwrap()
            .push((activity_id, update.clone()));
        Ok(())
    }
}

#[async_trait]
impl AthleteActivityProvider for SyntheticStrava {
    async fn recent_activities(&self, count: u32) -> Result<Vec<Activity>, ProviderError> {
        let activities = self.activities.read().unwrap();
        Ok(activities
            .iter()
            .rev()
            .take(usize::try_from(count).unwrap_or(usize::MAX))
            .map(|activity| Activity {
                description: None,
                ..activity.clone()
            })
            .collect())
    }

    fn as_activity_provider(&self) -> &dyn ActivityProvider {
        self
    }
}

/// Hands out the shared synthetic provider for any access token
pub struct SyntheticProviderFactory {
    strava: Arc<SyntheticStrava>,
    tokens: RwLock<Vec<String>>,
}

impl SyntheticProviderFactory {
    /// Factory over a shared provider
    #[must_use]
    pub fn new(strava: Arc<SyntheticStrava>) -> Self {
        Self {
            strava,
            tokens: RwLock::new(Vec::new()),
        }
    }

    /// Access tokens used to connect, in order
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.read().unwrap().clone()
    }
}

impl ProviderFactory for SyntheticProviderFactory {
    fn connect(&self, access_token: &str) -> Arc<dyn AthleteActivityProvider> {
        self.tokens.write().unwrap().push(access_token.to_owned());
        Arc::clone(&self.strava) as Arc<dyn AthleteActivityProvider>
    }
}

/// `OAuth` exchange that accepts [`VALID_CODE`] and refreshes any token
#[derive(Default)]
pub struct SyntheticOAuth {
    refreshes: AtomicUsize,
}

impl SyntheticOAuth {
    /// Number of refresh calls served
    #[must_use]
    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthExchange for SyntheticOAuth {
    fn authorization_url(&self) -> Result<String, ProviderError> {
        Ok("https://www.strava.com/oauth/authorize?client_id=test&response_type=code".to_owned())
    }

    async fn exchange_code(&self, code: &str) -> Result<StravaTokenResponse, ProviderError> {
        if code != VALID_CODE {
            return Err(ProviderError::Unauthorized {
                provider: oauth_providers::STRAVA.to_owned(),
            });
        }
        Ok(StravaTokenResponse {
            access_token: "access-from-code".to_owned(),
            refresh_token: Some("refresh-from-code".to_owned()),
            expires_at: chrono::Utc::now().timestamp() + 6 * 3600,
            athlete: Some(StravaAthleteSummary {
                id: SYNTHETIC_ATHLETE_ID,
                firstname: Some("Ada".to_owned()),
                lastname: Some("Runner".to_owned()),
            }),
        })
    }

    async fn refresh_token(
        &self,
        _refresh_token: &str,
    ) -> Result<StravaTokenResponse, ProviderError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(StravaTokenResponse {
            access_token: format!("refreshed-access-{n}"),
            refresh_token: None,
            expires_at: chrono::Utc::now().timestamp() + 6 * 3600,
            athlete: None,
        })
    }
}
