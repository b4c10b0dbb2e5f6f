//! Health-data gateway contract
//!
//! The engine never talks to a platform health store directly. Hosts
//! implement [`SleepDataGateway`] over whatever source they have and hand
//! it to [`Engine::refresh`](crate::state::Engine::refresh); a failed fetch
//! degrades to the bundled sample data instead of crashing.
//!
//! Platform stores report sleep as raw interval samples. The grouping and
//! summing of those samples into per-day records lives here so every host
//! aggregates identically.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::EngineError;
use crate::types::{SleepDay, SleepStage, StageDuration};

/// Contract for a platform sleep-data source
pub trait SleepDataGateway {
    /// Whether the host platform has granted read access
    fn is_authorized(&self) -> bool;

    /// Ask the platform for read access. Returns whether access was granted.
    fn request_authorization(&mut self) -> Result<bool, EngineError>;

    /// Fetch per-day records covering the most recent `days` days,
    /// ordered newest-first.
    fn fetch_sleep_days(&mut self, days: u32) -> Result<Vec<SleepDay>, EngineError>;
}

/// One raw interval sample as reported by a platform health store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSleepSample {
    pub stage: SleepStage,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RawSleepSample {
    pub fn new(stage: SleepStage, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { stage, start, end }
    }

    /// Sample length in minutes; negative for inverted intervals
    pub fn minutes(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 60.0
    }
}

/// Aggregate raw interval samples into per-day records.
///
/// Samples with a non-positive duration are dropped. Samples are grouped by
/// the calendar date of their start timestamp, same-stage samples within a
/// day are summed, and the resulting days are ordered newest-first.
pub fn aggregate_samples(samples: &[RawSleepSample]) -> Vec<SleepDay> {
    let mut by_date: HashMap<NaiveDate, Vec<StageDuration>> = HashMap::new();

    for sample in samples {
        let minutes = sample.minutes();
        if minutes <= 0.0 {
            continue;
        }
        by_date
            .entry(sample.start.date_naive())
            .or_default()
            .push(StageDuration::new(sample.stage, minutes));
    }

    let mut days: Vec<SleepDay> = by_date
        .into_iter()
        .map(|(date, stages)| SleepDay::new(date, stages))
        .collect();

    days.sort_by(|a, b| b.date.cmp(&a.date));
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, min, 0).unwrap()
    }

    #[test]
    fn test_samples_group_by_start_date() {
        let samples = vec![
            RawSleepSample::new(SleepStage::Core, at(13, 23, 0), at(14, 1, 0)),
            RawSleepSample::new(SleepStage::Deep, at(14, 1, 0), at(14, 2, 0)),
        ];

        let days = aggregate_samples(&samples);
        assert_eq!(days.len(), 2);
        // Newest first
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
        assert!((days[1].stage_minutes(SleepStage::Core) - 120.0).abs() < f64::EPSILON);
        assert!((days[0].stage_minutes(SleepStage::Deep) - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_same_stage_samples_are_summed() {
        let samples = vec![
            RawSleepSample::new(SleepStage::Rem, at(14, 2, 0), at(14, 2, 40)),
            RawSleepSample::new(SleepStage::Core, at(14, 3, 0), at(14, 4, 0)),
            RawSleepSample::new(SleepStage::Rem, at(14, 4, 30), at(14, 5, 0)),
        ];

        let days = aggregate_samples(&samples);
        assert_eq!(days.len(), 1);
        assert!((days[0].stage_minutes(SleepStage::Rem) - 70.0).abs() < f64::EPSILON);
        assert_eq!(days[0].stages().len(), 2);
    }

    #[test]
    fn test_non_positive_samples_are_dropped() {
        let samples = vec![
            // Zero length
            RawSleepSample::new(SleepStage::Core, at(14, 1, 0), at(14, 1, 0)),
            // Inverted
            RawSleepSample::new(SleepStage::Deep, at(14, 3, 0), at(14, 2, 0)),
        ];

        assert!(aggregate_samples(&samples).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_samples(&[]).is_empty());
    }
}
