//! Nocturne CLI - Command-line tooling for the Nocturne engine
//!
//! Commands:
//! - stats: Compute the sleep summary from an export document
//! - sample: Emit the bundled sample week as an export document
//! - validate: Parse an export document and report per-day totals

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nocturne_core::metrics::{format_minutes, SleepSummary};
use nocturne_core::{export, sample, EngineError, SleepDay, ENGINE_VERSION};

/// Nocturne - Sleep metrics and daily challenge engine
#[derive(Parser)]
#[command(name = "nocturne")]
#[command(author = "Nocturne Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Inspect and generate Nocturne sleep data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the sleep summary from an export document
    Stats {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Emit the bundled sample week as an export document
    Sample {
        /// Date of the most recent day (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<String>,

        /// Number of days to emit, newest first
        #[arg(long, default_value = "7")]
        days: usize,
    },

    /// Parse an export document and report per-day totals
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct CliError {
    error: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let envelope = CliError {
                error: e.to_string(),
            };
            eprintln!(
                "{}",
                serde_json::to_string(&envelope)
                    .unwrap_or_else(|_| format!("{{\"error\":\"{e}\"}}"))
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), EngineError> {
    match cli.command {
        Commands::Stats { input, json } => cmd_stats(&input, json),
        Commands::Sample { today, days } => cmd_sample(today.as_deref(), days),
        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn cmd_stats(input: &Path, json: bool) -> Result<(), EngineError> {
    let days = read_days(input)?;
    let summary = SleepSummary::from_days(&days);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Sleep summary ({} days)", days.len());
        println!("  today:      {}", summary.today_sleep);
        println!("  average:    {}", summary.average_sleep);
        println!("  deep sleep: {}", summary.deep_sleep);
        println!("  score:      {}/100", summary.sleep_score);
    }
    Ok(())
}

fn cmd_sample(today: Option<&str>, days: usize) -> Result<(), EngineError> {
    let date = match today {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| EngineError::DateParse(format!("{s}: {e}")))?,
        None => chrono::Local::now().date_naive(),
    };

    let mut week = sample::sleep_week(date);
    week.truncate(days);
    println!("{}", export::to_json(&week)?);
    Ok(())
}

#[derive(Serialize)]
struct DayReport {
    date: String,
    stages: usize,
    total_sleep_minutes: f64,
    sleep_efficiency: f64,
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), EngineError> {
    let days = read_days(input)?;

    let reports: Vec<DayReport> = days
        .iter()
        .map(|day| DayReport {
            date: day.date.to_string(),
            stages: day.stages().len(),
            total_sleep_minutes: day.total_sleep_minutes(),
            sleep_efficiency: day.sleep_efficiency(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("{} days parsed", reports.len());
        for (day, report) in days.iter().zip(&reports) {
            println!(
                "  {}  {} stages  {} asleep  {:.1}% efficiency",
                report.date,
                report.stages,
                format_minutes(day.total_sleep_minutes()),
                report.sleep_efficiency
            );
        }
    }
    Ok(())
}

fn read_days(input: &Path) -> Result<Vec<SleepDay>, EngineError> {
    let text = if input == Path::new("-") {
        if atty::is(atty::Stream::Stdin) {
            return Err(EngineError::DataUnavailable(
                "refusing to read from a terminal; pipe a document to stdin".to_string(),
            ));
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| EngineError::DataUnavailable(e.to_string()))?;
        buffer
    } else {
        fs::read_to_string(input)
            .map_err(|e| EngineError::DataUnavailable(format!("{}: {e}", input.display())))?
    };

    export::from_json(&text)
}
