//! Sleep metrics calculation
//!
//! This module derives display-ready statistics from a sequence of sleep
//! days: the composite sleep score, averages across the sequence, and
//! duration formatting. Everything here is pure; per-day accessors live on
//! [`SleepDay`] itself.
//!
//! Sequences are ordered newest-first, matching the order the gateway
//! produces, so "the most recent day" is always the first element.

use serde::{Deserialize, Serialize};

use crate::types::SleepDay;

/// Target total sleep for a full score contribution (8 hours)
const TARGET_SLEEP_MINUTES: f64 = 480.0;
/// Target deep-sleep share of time in bed
const TARGET_DEEP_PCT: f64 = 20.0;
/// Target REM share of time in bed
const TARGET_REM_PCT: f64 = 25.0;
/// Target sleep efficiency
const TARGET_EFFICIENCY_PCT: f64 = 90.0;

/// Composite 0-100 sleep score for the most recent day.
///
/// Blends duration, deep share, REM share, and efficiency against their
/// targets; the deep/REM/efficiency factors may overshoot their weight a
/// little (up to 1.2x / 1.2x / 1.1x) before the final clamp. Returns 0
/// when there is no day data.
pub fn sleep_score(days: &[SleepDay]) -> u8 {
    let Some(latest) = days.first() else {
        return 0;
    };

    let total_factor = (latest.total_sleep_minutes() / TARGET_SLEEP_MINUTES).min(1.0);
    let deep_factor = (latest.deep_sleep_percentage() / TARGET_DEEP_PCT).min(1.2);
    let rem_factor = (latest.rem_sleep_percentage() / TARGET_REM_PCT).min(1.2);
    let efficiency_factor = (latest.sleep_efficiency() / TARGET_EFFICIENCY_PCT).min(1.1);

    let raw = total_factor * 40.0 + deep_factor * 25.0 + rem_factor * 25.0
        + efficiency_factor * 10.0;

    (raw as u32).min(100) as u8
}

/// Mean total sleep across the sequence, in minutes. 0 when empty.
pub fn average_sleep_minutes(days: &[SleepDay]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    let total: f64 = days.iter().map(|d| d.total_sleep_minutes()).sum();
    total / days.len() as f64
}

/// Mean total sleep formatted as "Xh Ym". "0h 0m" when empty.
pub fn average_sleep_time(days: &[SleepDay]) -> String {
    format_minutes(average_sleep_minutes(days))
}

/// Mean deep-sleep percentage across the sequence, rounded to the nearest
/// whole percent and formatted. "0%" when empty.
pub fn average_deep_sleep_percentage(days: &[SleepDay]) -> String {
    if days.is_empty() {
        return "0%".to_string();
    }
    let total: f64 = days.iter().map(|d| d.deep_sleep_percentage()).sum();
    let avg = total / days.len() as f64;
    format!("{}%", avg.round() as i64)
}

/// Format a minute count as "Xh Ym", truncating to whole minutes first
pub fn format_minutes(minutes: f64) -> String {
    let whole = minutes.max(0.0) as i64;
    format!("{}h {}m", whole / 60, whole % 60)
}

/// Display-ready summary of a sleep-day sequence, computed in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSummary {
    /// Most recent day's total sleep, e.g. "6h 42m"; "No data" when empty
    pub today_sleep: String,
    /// Mean total sleep across the sequence, e.g. "7h 5m"
    pub average_sleep: String,
    /// Mean deep-sleep share, e.g. "16%"
    pub deep_sleep: String,
    /// Composite score for the most recent day, 0-100
    pub sleep_score: u8,
}

impl SleepSummary {
    pub fn from_days(days: &[SleepDay]) -> Self {
        let today_sleep = match days.first() {
            Some(today) => format_minutes(today.total_sleep_minutes()),
            None => "No data".to_string(),
        };

        Self {
            today_sleep,
            average_sleep: average_sleep_time(days),
            deep_sleep: average_deep_sleep_percentage(days),
            sleep_score: sleep_score(days),
        }
    }
}
