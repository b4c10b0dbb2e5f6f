//! Daily challenge tracking
//!
//! This module manages the seeded catalog of habit challenges and which one
//! is active "today". Each challenge moves Pending -> Accepted -> Completed,
//! with an out-of-band reset back to Pending.
//!
//! Completing the active challenge schedules exactly one re-selection a
//! short delay later. The delay is explicit tracker state driven by a
//! caller-supplied clock (`poll_reselect`), not a background timer, so it
//! is deterministic and cancelled by any manual re-selection.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::Challenge;

/// Delay between completing the active challenge and the automatic
/// selection of the next one
pub const RESELECT_DELAY_SECS: i64 = 3;

/// State machine over the challenge catalog
#[derive(Debug, Clone)]
pub struct ChallengeTracker {
    catalog: Vec<Challenge>,
    active: Option<Uuid>,
    reselect_due: Option<DateTime<Utc>>,
}

impl ChallengeTracker {
    pub fn new(catalog: Vec<Challenge>) -> Self {
        Self {
            catalog,
            active: None,
            reselect_due: None,
        }
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.catalog
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// The active challenge, if one has been selected
    pub fn active(&self) -> Option<&Challenge> {
        let id = self.active?;
        self.catalog.iter().find(|c| c.id == id)
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.active
    }

    /// When the pending automatic re-selection fires, if one is scheduled
    pub fn reselect_due(&self) -> Option<DateTime<Utc>> {
        self.reselect_due
    }

    /// Mark a challenge accepted. Accepting an already-accepted or
    /// completed challenge is a no-op; unknown ids are an error.
    pub fn accept(&mut self, id: Uuid) -> Result<(), EngineError> {
        let challenge = self.entry_mut(id)?;
        if challenge.completed {
            return Ok(());
        }
        challenge.is_accepted = true;
        debug!(challenge = %challenge.name, "challenge accepted");
        Ok(())
    }

    /// Mark a challenge completed, stamping `completed_at = now`.
    ///
    /// Completing the active challenge schedules exactly one automatic
    /// re-selection due `now + RESELECT_DELAY_SECS`. Completing an
    /// already-completed challenge is a no-op and keeps its original
    /// completion stamp.
    pub fn complete(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<(), EngineError> {
        let is_active = self.active == Some(id);
        let challenge = self.entry_mut(id)?;
        if challenge.completed {
            return Ok(());
        }

        challenge.completed = true;
        challenge.completed_at = Some(now);
        debug!(challenge = %challenge.name, "challenge completed");

        if is_active {
            self.reselect_due = Some(now + Duration::seconds(RESELECT_DELAY_SECS));
        }
        Ok(())
    }

    /// Select a new active challenge uniformly at random among the
    /// uncompleted ones. If every challenge is completed, the whole catalog
    /// is reset first and the choice is made over the full set. Returns the
    /// selected id, or `None` for an empty catalog.
    ///
    /// Any scheduled automatic re-selection is cancelled: a manual pick
    /// during the delay window wins.
    pub fn pick_active(&mut self, rng: &mut impl Rng) -> Option<Uuid> {
        self.reselect_due = None;

        if self.catalog.is_empty() {
            self.active = None;
            return None;
        }

        let available: Vec<Uuid> = self
            .catalog
            .iter()
            .filter(|c| !c.completed)
            .map(|c| c.id)
            .collect();

        let id = if available.is_empty() {
            self.reset_all();
            self.catalog[rng.gen_range(0..self.catalog.len())].id
        } else {
            available[rng.gen_range(0..available.len())]
        };

        self.active = Some(id);
        debug!(%id, "active challenge selected");
        Some(id)
    }

    /// Return every challenge to Pending. The active reference is left as
    /// is; it still points at a valid catalog entry.
    pub fn reset_all(&mut self) {
        for challenge in &mut self.catalog {
            challenge.completed = false;
            challenge.is_accepted = false;
            challenge.completed_at = None;
        }
        debug!(count = self.catalog.len(), "challenge catalog reset");
    }

    /// Fire the scheduled re-selection once its deadline has passed.
    /// Returns true if a re-selection happened.
    pub fn poll_reselect(&mut self, now: DateTime<Utc>, rng: &mut impl Rng) -> bool {
        match self.reselect_due {
            Some(due) if now >= due => {
                self.pick_active(rng);
                true
            }
            _ => false,
        }
    }

    fn entry_mut(&mut self, id: Uuid) -> Result<&mut Challenge, EngineError> {
        self.catalog
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EngineError::ChallengeNotFound(id))
    }
}
