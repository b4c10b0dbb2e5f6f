//! Application core
//!
//! [`Engine`] is the single-writer state holder behind the app: it owns the
//! sleep-day collection and the challenge tracker, refreshes day records
//! through a [`SleepDataGateway`], and exposes display-ready summaries.
//! Presentation layers read computed values from here and write user
//! actions back through the challenge pass-throughs.
//!
//! All mutation is expected to happen from one logical thread; the host
//! resolves async gateway work onto that thread before calling in.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::challenges::ChallengeTracker;
use crate::error::EngineError;
use crate::export;
use crate::gateway::SleepDataGateway;
use crate::metrics::SleepSummary;
use crate::sample;
use crate::types::{Challenge, SleepDay};

/// Application state: day records, challenge catalog, and host flags
#[derive(Debug, Clone)]
pub struct Engine {
    sleep_days: Vec<SleepDay>,
    tracker: ChallengeTracker,
    is_loading: bool,
    has_completed_onboarding: bool,
    last_gateway_error: Option<String>,
}

impl Engine {
    pub fn new(sleep_days: Vec<SleepDay>, catalog: Vec<Challenge>) -> Self {
        Self {
            sleep_days,
            tracker: ChallengeTracker::new(catalog),
            is_loading: false,
            has_completed_onboarding: false,
            last_gateway_error: None,
        }
    }

    /// Start from the bundled sample data with an active challenge already
    /// selected, the way the app boots before real data arrives.
    pub fn with_sample_data(today: NaiveDate, rng: &mut impl Rng) -> Self {
        let mut engine = Self::new(
            sample::sleep_week(today),
            sample::challenge_catalog(today),
        );
        engine.tracker.pick_active(rng);
        engine
    }

    // ------------------------------------------------------------------
    // Sleep data
    // ------------------------------------------------------------------

    pub fn sleep_days(&self) -> &[SleepDay] {
        &self.sleep_days
    }

    /// Replace the whole day-record collection, e.g. with data the host
    /// aggregated itself.
    pub fn replace_days(&mut self, days: Vec<SleepDay>) {
        self.sleep_days = days;
    }

    /// Refresh day records from the gateway. The collection is replaced
    /// exactly once per call: with fetched data on success, with the
    /// bundled sample week on failure. Returns true when live data landed.
    pub fn refresh<G: SleepDataGateway>(
        &mut self,
        gateway: &mut G,
        days: u32,
        today: NaiveDate,
    ) -> bool {
        self.is_loading = true;

        let fetched = match gateway.fetch_sleep_days(days) {
            Ok(data) => {
                debug!(days = data.len(), "sleep data refreshed from gateway");
                self.sleep_days = data;
                self.last_gateway_error = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "sleep data fetch failed, using sample data");
                self.last_gateway_error = Some(e.to_string());
                self.sleep_days = sample::sleep_week(today);
                false
            }
        };

        self.is_loading = false;
        fetched
    }

    /// Display-ready statistics for the current day records
    pub fn summary(&self) -> SleepSummary {
        SleepSummary::from_days(&self.sleep_days)
    }

    /// The current collection as a pretty-printed export document
    pub fn export_json(&self) -> Result<String, EngineError> {
        export::to_json(&self.sleep_days)
    }

    /// Human-readable message from the most recent failed fetch, if any
    pub fn last_gateway_error(&self) -> Option<&str> {
        self.last_gateway_error.as_deref()
    }

    /// True while a refresh is in flight
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    // ------------------------------------------------------------------
    // Onboarding
    // ------------------------------------------------------------------

    pub fn has_completed_onboarding(&self) -> bool {
        self.has_completed_onboarding
    }

    pub fn complete_onboarding(&mut self) {
        self.has_completed_onboarding = true;
    }

    // ------------------------------------------------------------------
    // Challenges
    // ------------------------------------------------------------------

    pub fn challenges(&self) -> &[Challenge] {
        self.tracker.challenges()
    }

    pub fn active_challenge(&self) -> Option<&Challenge> {
        self.tracker.active()
    }

    pub fn accept_challenge(&mut self, id: Uuid) -> Result<(), EngineError> {
        self.tracker.accept(id)
    }

    pub fn complete_challenge(
        &mut self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.tracker.complete(id, now)
    }

    /// Manually select a new active challenge
    pub fn new_challenge(&mut self, rng: &mut impl Rng) -> Option<Uuid> {
        self.tracker.pick_active(rng)
    }

    /// Drive the deferred re-selection scheduled by completing the active
    /// challenge. Hosts call this from their tick/timer hook.
    pub fn poll(&mut self, now: DateTime<Utc>, rng: &mut impl Rng) -> bool {
        self.tracker.poll_reselect(now, rng)
    }

    pub fn tracker(&self) -> &ChallengeTracker {
        &self.tracker
    }
}
