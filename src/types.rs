//! Core types for the Nocturne engine
//!
//! This module defines the value objects shared across the engine: sleep
//! stages, per-day stage durations, and daily challenge records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sleep stage classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepStage {
    Core,
    Deep,
    Rem,
    Awake,
}

impl SleepStage {
    /// All stage kinds, in catalog order
    pub const ALL: [SleepStage; 4] = [
        SleepStage::Core,
        SleepStage::Deep,
        SleepStage::Rem,
        SleepStage::Awake,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SleepStage::Core => "core",
            SleepStage::Deep => "deep",
            SleepStage::Rem => "rem",
            SleepStage::Awake => "awake",
        }
    }

    /// Capitalized name used in the export document
    pub fn display_name(&self) -> &'static str {
        match self {
            SleepStage::Core => "Core",
            SleepStage::Deep => "Deep",
            SleepStage::Rem => "Rem",
            SleepStage::Awake => "Awake",
        }
    }

    /// Parse a stage name, accepting either casing
    pub fn from_name(name: &str) -> Option<SleepStage> {
        match name.to_ascii_lowercase().as_str() {
            "core" => Some(SleepStage::Core),
            "deep" => Some(SleepStage::Deep),
            "rem" => Some(SleepStage::Rem),
            "awake" => Some(SleepStage::Awake),
            _ => None,
        }
    }

    /// Whether this stage counts toward total sleep time
    pub fn is_asleep(&self) -> bool {
        !matches!(self, SleepStage::Awake)
    }
}

/// Aggregated duration for one stage kind within a single day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageDuration {
    pub stage: SleepStage,
    /// Minutes spent in this stage, always >= 0
    pub minutes: f64,
}

impl StageDuration {
    pub fn new(stage: SleepStage, minutes: f64) -> Self {
        Self { stage, minutes }
    }
}

/// Aggregated sleep-stage durations for one calendar day.
///
/// Holds at most one `StageDuration` per stage kind; `SleepDay::new` merges
/// duplicate samples by summing their minutes. A day is immutable once
/// built, and a fresh fetch replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepDay {
    pub date: NaiveDate,
    stages: Vec<StageDuration>,
}

impl SleepDay {
    /// Build a day from raw stage durations, merging same-stage entries and
    /// dropping entries that are not a positive finite number of minutes.
    pub fn new(date: NaiveDate, stages: impl IntoIterator<Item = StageDuration>) -> Self {
        let mut merged: Vec<StageDuration> = Vec::new();
        for entry in stages {
            if !entry.minutes.is_finite() || entry.minutes <= 0.0 {
                continue;
            }
            match merged.iter_mut().find(|s| s.stage == entry.stage) {
                Some(existing) => existing.minutes += entry.minutes,
                None => merged.push(entry),
            }
        }
        Self {
            date,
            stages: merged,
        }
    }

    pub fn stages(&self) -> &[StageDuration] {
        &self.stages
    }

    /// Minutes recorded for the given stage, 0 if absent
    pub fn stage_minutes(&self, stage: SleepStage) -> f64 {
        self.stages
            .iter()
            .filter(|s| s.stage == stage)
            .map(|s| s.minutes)
            .sum()
    }

    /// Sum of every non-awake stage
    pub fn total_sleep_minutes(&self) -> f64 {
        self.stages
            .iter()
            .filter(|s| s.stage.is_asleep())
            .map(|s| s.minutes)
            .sum()
    }

    pub fn total_awake_minutes(&self) -> f64 {
        self.stage_minutes(SleepStage::Awake)
    }

    /// Deep sleep as a percentage of total time in bed (sleep + awake).
    /// Returns 0 when the day is empty.
    pub fn deep_sleep_percentage(&self) -> f64 {
        self.stage_percentage(SleepStage::Deep)
    }

    /// REM sleep as a percentage of total time in bed (sleep + awake).
    /// Returns 0 when the day is empty.
    pub fn rem_sleep_percentage(&self) -> f64 {
        self.stage_percentage(SleepStage::Rem)
    }

    /// Asleep time as a percentage of total time in bed. Returns 0 when
    /// the day is empty.
    pub fn sleep_efficiency(&self) -> f64 {
        let total = self.total_sleep_minutes() + self.total_awake_minutes();
        if total <= 0.0 {
            return 0.0;
        }
        self.total_sleep_minutes() / total * 100.0
    }

    fn stage_percentage(&self, stage: SleepStage) -> f64 {
        let total = self.total_sleep_minutes() + self.total_awake_minutes();
        if total <= 0.0 {
            return 0.0;
        }
        self.stage_minutes(stage) / total * 100.0
    }
}

/// Lifecycle state of a challenge, derived from its flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Pending,
    Accepted,
    Completed,
}

/// A daily habit challenge from the seeded catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub description: String,
    pub category: String,
    pub is_accepted: bool,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Challenge {
    /// Create a fresh pending challenge
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            name: name.into(),
            description: description.into(),
            category: category.into(),
            is_accepted: false,
            completed: false,
            completed_at: None,
        }
    }

    pub fn status(&self) -> ChallengeStatus {
        if self.completed {
            ChallengeStatus::Completed
        } else if self.is_accepted {
            ChallengeStatus::Accepted
        } else {
            ChallengeStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(stages: &[(SleepStage, f64)]) -> SleepDay {
        SleepDay::new(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            stages
                .iter()
                .map(|&(stage, minutes)| StageDuration::new(stage, minutes)),
        )
    }

    #[test]
    fn test_duplicate_stage_samples_are_merged() {
        let day = day(&[
            (SleepStage::Core, 100.0),
            (SleepStage::Core, 50.0),
            (SleepStage::Deep, 40.0),
        ]);

        assert_eq!(day.stages().len(), 2);
        assert!((day.stage_minutes(SleepStage::Core) - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_positive_samples_are_dropped() {
        let day = day(&[
            (SleepStage::Core, 0.0),
            (SleepStage::Deep, -5.0),
            (SleepStage::Rem, 30.0),
        ]);

        assert_eq!(day.stages().len(), 1);
        assert!((day.total_sleep_minutes() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reference_day_metrics() {
        // core 210, deep 50, rem 40, awake 10 -> total 300, awake 10
        let day = day(&[
            (SleepStage::Core, 210.0),
            (SleepStage::Deep, 50.0),
            (SleepStage::Rem, 40.0),
            (SleepStage::Awake, 10.0),
        ]);

        assert!((day.total_sleep_minutes() - 300.0).abs() < f64::EPSILON);
        assert!((day.total_awake_minutes() - 10.0).abs() < f64::EPSILON);
        assert!((day.deep_sleep_percentage() - 50.0 / 310.0 * 100.0).abs() < 0.001);
        assert!((day.rem_sleep_percentage() - 40.0 / 310.0 * 100.0).abs() < 0.001);
        assert!((day.sleep_efficiency() - 300.0 / 310.0 * 100.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_day_never_divides_by_zero() {
        let day = day(&[]);

        assert_eq!(day.total_sleep_minutes(), 0.0);
        assert_eq!(day.deep_sleep_percentage(), 0.0);
        assert_eq!(day.rem_sleep_percentage(), 0.0);
        assert_eq!(day.sleep_efficiency(), 0.0);
        assert!(day.sleep_efficiency().is_finite());
    }

    #[test]
    fn test_totals_invariant_under_reordering() {
        let forward = day(&[
            (SleepStage::Core, 210.0),
            (SleepStage::Deep, 50.0),
            (SleepStage::Rem, 40.0),
            (SleepStage::Awake, 10.0),
        ]);
        let reversed = day(&[
            (SleepStage::Awake, 10.0),
            (SleepStage::Rem, 40.0),
            (SleepStage::Deep, 50.0),
            (SleepStage::Core, 210.0),
        ]);

        let sum_a = forward.total_sleep_minutes() + forward.total_awake_minutes();
        let sum_b = reversed.total_sleep_minutes() + reversed.total_awake_minutes();
        assert!((sum_a - sum_b).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stage_name_round_trip() {
        for stage in SleepStage::ALL {
            assert_eq!(SleepStage::from_name(stage.display_name()), Some(stage));
            assert_eq!(SleepStage::from_name(stage.as_str()), Some(stage));
        }
        assert_eq!(SleepStage::from_name("light"), None);
    }

    #[test]
    fn test_challenge_status_derivation() {
        let mut challenge = Challenge::new(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            "Earlier Bedtime",
            "Go to bed 30 minutes earlier tonight.",
            "Bedtime",
        );
        assert_eq!(challenge.status(), ChallengeStatus::Pending);

        challenge.is_accepted = true;
        assert_eq!(challenge.status(), ChallengeStatus::Accepted);

        challenge.completed = true;
        assert_eq!(challenge.status(), ChallengeStatus::Completed);
    }
}
