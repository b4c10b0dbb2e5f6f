//! Nocturne Core - Embeddable sleep-metrics and daily-challenge engine
//!
//! The engine behind the Nocturne sleep tracker. It turns per-day
//! sleep-stage durations into display-ready statistics and manages the
//! daily habit-challenge catalog; presentation layers read computed values
//! and write user actions back through [`Engine`].
//!
//! ## Modules
//!
//! - **types / metrics**: sleep-day value objects and the pure statistics
//!   calculator (totals, percentages, efficiency, composite score)
//! - **challenges**: the Pending -> Accepted -> Completed state machine
//!   with random re-selection
//! - **gateway / sample**: the platform health-data contract and the
//!   bundled fallback data
//! - **export**: the `sleepData` interchange document
//! - **state**: the single-writer application core gluing it all together

pub mod challenges;
pub mod error;
pub mod export;
pub mod gateway;
pub mod metrics;
pub mod sample;
pub mod state;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use challenges::{ChallengeTracker, RESELECT_DELAY_SECS};
pub use error::EngineError;
pub use gateway::{aggregate_samples, RawSleepSample, SleepDataGateway};
pub use metrics::{sleep_score, SleepSummary};
pub use state::Engine;
pub use types::{Challenge, ChallengeStatus, SleepDay, SleepStage, StageDuration};

/// Engine version embedded in tooling output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for tooling output
pub const PRODUCER_NAME: &str = "nocturne-core";
