//! Sleep data export
//!
//! Encodes a sleep-day collection into the interchange document consumed
//! by companion apps and support tooling:
//!
//! ```json
//! { "sleepData": [ { "date": "2025-03-14",
//!                    "stages": [ { "stage": "Core", "minutes": 210.0 } ] } ] }
//! ```
//!
//! Stage names are capitalized and dates are day-granularity ISO. Parsing
//! the document back yields the same dates and per-stage minutes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{SleepDay, SleepStage, StageDuration};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Top-level export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepDataDocument {
    pub sleep_data: Vec<DayPayload>,
}

/// One exported day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPayload {
    pub date: String,
    pub stages: Vec<StagePayload>,
}

/// One exported stage entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePayload {
    pub stage: String,
    pub minutes: f64,
}

/// Build the export document for a sleep-day collection
pub fn encode(days: &[SleepDay]) -> SleepDataDocument {
    SleepDataDocument {
        sleep_data: days
            .iter()
            .map(|day| DayPayload {
                date: day.date.format(DATE_FORMAT).to_string(),
                stages: day
                    .stages()
                    .iter()
                    .map(|s| StagePayload {
                        stage: s.stage.display_name().to_string(),
                        minutes: s.minutes,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Serialize a sleep-day collection as a pretty-printed export document
pub fn to_json(days: &[SleepDay]) -> Result<String, EngineError> {
    Ok(serde_json::to_string_pretty(&encode(days))?)
}

/// Rebuild sleep days from a parsed export document
pub fn decode(document: &SleepDataDocument) -> Result<Vec<SleepDay>, EngineError> {
    document
        .sleep_data
        .iter()
        .map(|payload| {
            let date = NaiveDate::parse_from_str(&payload.date, DATE_FORMAT)
                .map_err(|e| EngineError::DateParse(format!("{}: {e}", payload.date)))?;

            let stages = payload
                .stages
                .iter()
                .map(|s| {
                    let stage = SleepStage::from_name(&s.stage)
                        .ok_or_else(|| EngineError::UnknownStage(s.stage.clone()))?;
                    Ok(StageDuration::new(stage, s.minutes))
                })
                .collect::<Result<Vec<_>, EngineError>>()?;

            Ok(SleepDay::new(date, stages))
        })
        .collect()
}

/// Parse an export document from JSON text
pub fn from_json(json: &str) -> Result<Vec<SleepDay>, EngineError> {
    let document: SleepDataDocument = serde_json::from_str(json)?;
    decode(&document)
}
