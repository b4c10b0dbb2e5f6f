//! Bundled sample data
//!
//! A week of plausible sleep days and the seed challenge catalog, generated
//! relative to a caller-supplied "today" so the engine itself never reads
//! the wall clock. The engine falls back to this data when a gateway fetch
//! fails, and the CLI uses it for demos.

use chrono::{Days, NaiveDate};

use crate::error::EngineError;
use crate::gateway::SleepDataGateway;
use crate::types::{Challenge, SleepDay, SleepStage, StageDuration};

/// Stage minutes for the sample week, newest day first:
/// (core, deep, rem, awake)
const SAMPLE_WEEK: [(f64, f64, f64, f64); 7] = [
    (210.0, 50.0, 40.0, 10.0),
    (220.0, 55.0, 45.0, 15.0),
    (200.0, 45.0, 35.0, 20.0),
    (230.0, 60.0, 50.0, 10.0),
    (190.0, 40.0, 30.0, 25.0),
    (210.0, 50.0, 40.0, 15.0),
    (200.0, 45.0, 40.0, 20.0),
];

/// Seed challenge catalog: (name, description, category), newest first
const SAMPLE_CHALLENGES: [(&str, &str, &str); 7] = [
    (
        "Earlier Bedtime",
        "Try going to bed 30 minutes earlier tonight to increase your deep sleep duration.",
        "Bedtime",
    ),
    (
        "Reduce Screen Time",
        "Avoid screens for at least 30 minutes before going to bed to improve sleep quality.",
        "Evening",
    ),
    (
        "Breathing Exercise",
        "Try a 5-minute deep breathing exercise before bed to help your body relax.",
        "Routine",
    ),
    (
        "Consistent Wake Time",
        "Wake up at the same time as yesterday to help regulate your sleep cycle.",
        "Morning",
    ),
    (
        "Room Temperature",
        "Lower your bedroom temperature by 1-2 degrees to promote better sleep.",
        "Environment",
    ),
    (
        "Evening Herbal Tea",
        "Try a cup of caffeine-free herbal tea like chamomile an hour before bed to help you relax.",
        "Nutrition",
    ),
    (
        "Daytime Exercise",
        "Get at least 30 minutes of moderate exercise today, but not within 2 hours of bedtime.",
        "Activity",
    ),
];

/// The sample sleep week ending at `today`, newest first
pub fn sleep_week(today: NaiveDate) -> Vec<SleepDay> {
    SAMPLE_WEEK
        .iter()
        .enumerate()
        .map(|(offset, &(core, deep, rem, awake))| {
            let date = today
                .checked_sub_days(Days::new(offset as u64))
                .unwrap_or(today);
            SleepDay::new(
                date,
                [
                    StageDuration::new(SleepStage::Core, core),
                    StageDuration::new(SleepStage::Deep, deep),
                    StageDuration::new(SleepStage::Rem, rem),
                    StageDuration::new(SleepStage::Awake, awake),
                ],
            )
        })
        .collect()
}

/// The seed challenge catalog, dated back one day per entry from `today`.
/// Every entry starts Pending; fresh v4 ids are minted per call.
pub fn challenge_catalog(today: NaiveDate) -> Vec<Challenge> {
    SAMPLE_CHALLENGES
        .iter()
        .enumerate()
        .map(|(offset, &(name, description, category))| {
            let date = today
                .checked_sub_days(Days::new(offset as u64))
                .unwrap_or(today);
            Challenge::new(date, name, description, category)
        })
        .collect()
}

/// A gateway that always succeeds with the sample week. Useful for demos
/// and host integration tests.
#[derive(Debug, Clone)]
pub struct SampleGateway {
    pub today: NaiveDate,
}

impl SampleGateway {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl SleepDataGateway for SampleGateway {
    fn is_authorized(&self) -> bool {
        true
    }

    fn request_authorization(&mut self) -> Result<bool, EngineError> {
        Ok(true)
    }

    fn fetch_sleep_days(&mut self, days: u32) -> Result<Vec<SleepDay>, EngineError> {
        let mut week = sleep_week(self.today);
        week.truncate(days as usize);
        Ok(week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_week_is_seven_days_newest_first() {
        let week = sleep_week(today());

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, today());
        for pair in week.windows(2) {
            assert!(pair[0].date > pair[1].date);
        }
    }

    #[test]
    fn test_week_days_have_all_stages() {
        for day in sleep_week(today()) {
            assert_eq!(day.stages().len(), 4);
            assert!(day.total_sleep_minutes() > 0.0);
        }
    }

    #[test]
    fn test_catalog_entries_start_pending() {
        let catalog = challenge_catalog(today());

        assert_eq!(catalog.len(), 7);
        for challenge in &catalog {
            assert!(!challenge.is_accepted);
            assert!(!challenge.completed);
            assert_eq!(challenge.completed_at, None);
        }

        // Ids are unique
        let mut ids: Vec<_> = catalog.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_gateway_honors_day_count() {
        let mut gateway = SampleGateway::new(today());
        let days = gateway.fetch_sleep_days(3).unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, today());
    }
}
