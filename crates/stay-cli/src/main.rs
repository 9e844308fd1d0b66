//! `stay` CLI — rolling 90/180-day compliance reports from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Compliance report for a reference date (stdin → stdout)
//! cat trips.json | stay compliance --date 2026-12-15
//!
//! # Same, from a file, pretty-printed, with the per-day breakdown
//! stay compliance --date 2026-12-15 -i trips.json --pretty --breakdown
//!
//! # Structural validation (exit code 1 when errors are present)
//! stay validate -i trips.json
//!
//! # Conflict-check a candidate range against existing trips
//! stay check-range --start 2026-05-01 --end 2026-05-14 -i trips.json
//!
//! # Ranked travel windows for a 14-day stay
//! stay plan --days 14 --from 2027-01-01 --to 2027-03-31 -i trips.json
//!
//! # Next date on which counted days start rolling out of the window
//! stay reset-date --date 2026-12-15 -i trips.json
//! ```
//!
//! Trips are a JSON array of `{id, country_code, start_date, end_date}`
//! objects with ISO dates.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::process;

use stay_engine::normalize::parse_day;
use stay_engine::overlap::{validate_date_range, OverlapPolicy};
use stay_engine::planner::find_optimal_travel_dates;
use stay_engine::window::{
    calculate_compliance, get_next_reset_date, validate_trips,
};
use stay_engine::{DateRange, Trip};

#[derive(Parser)]
#[command(
    name = "stay",
    version,
    about = "Rolling 90/180-day stay compliance calculator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compliance report for the window ending on a reference date
    Compliance {
        /// Reference date (ISO, e.g. 2026-12-15)
        #[arg(long)]
        date: String,
        /// Input trips file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
        /// Include the 180-record per-day breakdown
        #[arg(long)]
        breakdown: bool,
    },
    /// Structural validation of the trip set
    Validate {
        /// Input trips file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Check a candidate date range for conflicts with existing trips
    CheckRange {
        /// Candidate start date (ISO)
        #[arg(long)]
        start: String,
        /// Candidate end date (ISO)
        #[arg(long)]
        end: String,
        /// Treat any shared boundary day as a conflict
        #[arg(long)]
        strict: bool,
        /// Input trips file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Rank candidate travel windows for a stay of the given length
    Plan {
        /// Desired stay length in days
        #[arg(long)]
        days: i64,
        /// Earliest acceptable start date (ISO)
        #[arg(long)]
        from: String,
        /// Latest acceptable end date (ISO)
        #[arg(long)]
        to: String,
        /// Number of top-ranked windows to print
        #[arg(long, default_value_t = 5)]
        top: usize,
        /// Input trips file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Next date on which a counted day exits the rolling window
    ResetDate {
        /// Reference date (ISO)
        #[arg(long)]
        date: String,
        /// Input trips file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compliance {
            date,
            input,
            output,
            pretty,
            breakdown,
        } => {
            let trips = load_trips(input.as_deref())?;
            abort_on_structural_errors(&trips);

            let reference = parse_day(&date).context("Invalid --date")?;
            let mut result = calculate_compliance(&trips, reference)?;
            if !breakdown {
                result.daily_breakdown.clear();
            }

            write_output(output.as_deref(), &to_json(&result, pretty)?)?;
        }
        Commands::Validate { input, pretty } => {
            let trips = load_trips(input.as_deref())?;
            let report = validate_trips(&trips);

            println!("{}", to_json(&report, pretty)?);
            if !report.is_valid {
                process::exit(1);
            }
        }
        Commands::CheckRange {
            start,
            end,
            strict,
            input,
        } => {
            let trips = load_trips(input.as_deref())?;

            let candidate = DateRange::new(
                parse_day(&start).context("Invalid --start")?,
                parse_day(&end).context("Invalid --end")?,
            )?;
            let policy = if strict {
                OverlapPolicy::strict()
            } else {
                OverlapPolicy::default()
            };

            let result = validate_date_range(&candidate, &trips, &policy)?;
            println!("{}", to_json(&result, true)?);
        }
        Commands::Plan {
            days,
            from,
            to,
            top,
            input,
        } => {
            let trips = load_trips(input.as_deref())?;
            abort_on_structural_errors(&trips);

            let earliest = parse_day(&from).context("Invalid --from")?;
            let latest = parse_day(&to).context("Invalid --to")?;

            let mut ranked = find_optimal_travel_dates(&trips, days, earliest, latest)?;
            ranked.truncate(top);
            println!("{}", to_json(&ranked, true)?);
        }
        Commands::ResetDate { date, input } => {
            let trips = load_trips(input.as_deref())?;
            abort_on_structural_errors(&trips);

            let reference = parse_day(&date).context("Invalid --date")?;
            match get_next_reset_date(&trips, reference)? {
                Some(reset) => println!("{}", reset),
                None => println!("none"),
            }
        }
    }

    Ok(())
}

/// Read and deserialize the trip set from a file or stdin.
fn load_trips(path: Option<&str>) -> Result<Vec<Trip>> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse trips JSON")
}

/// Print structural errors and exit non-zero. Compliance math on a trip set
/// with ERROR-severity findings would be untrustworthy, and silently
/// dropping the offending trips is the one thing the engine refuses to do.
fn abort_on_structural_errors(trips: &[Trip]) {
    let report = validate_trips(trips);
    if report.is_valid {
        return;
    }
    for issue in &report.errors {
        let id = issue.trip_id.as_deref().unwrap_or("-");
        eprintln!("error [{}] {}: {}", id, issue.field, issue.message);
    }
    process::exit(1);
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", content)?;
        }
    }
    Ok(())
}
