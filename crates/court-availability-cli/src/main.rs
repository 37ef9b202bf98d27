//! `courtwatch` CLI — resolve evening court availability and queue booking
//! requests from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Resolve free clay courts for 22:00-00:00 from a saved initialize payload
//! courtwatch resolve -i initialize.json
//!
//! # Plain-text digest, grouped by hall
//! cat initialize.json | courtwatch resolve --format text
//!
//! # Another surface and window
//! courtwatch resolve -i initialize.json --surface Хард --from 20:00 --to 22:00
//!
//! # Queue a booking request and check it against a payload
//! courtwatch requests add --date 2025-09-24 --from 22:00 --duration 120
//! courtwatch requests check --id 1 -i initialize.json
//! courtwatch requests check --id 1 -i initialize.json --from 22:00 --to 00:00
//! courtwatch requests list
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

mod config;
mod render;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use court_availability::requests::{JsonFileStore, NewRequest, RequestStore};
use court_availability::resolver::{resolve_with_report, RejectedSlot, Resolution};
use court_availability::{
    parse_initialize, AvailabilityResult, BookingRequest, DayPayload, Interval, TimeOfDay,
    DEFAULT_CELL_MINUTES,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::WatchConfig;

#[derive(Parser)]
#[command(
    name = "courtwatch",
    version,
    about = "Evening tennis court availability and booking requests"
)]
struct Cli {
    /// JSON config file (defaults apply when omitted)
    #[arg(long, global = true, env = "COURTWATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve free courts from an initialize payload
    Resolve {
        /// Input payload file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        window: WindowArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Manage queued booking requests
    Requests {
        /// Request store file (overrides `requests_path` from the config)
        #[arg(long)]
        store: Option<PathBuf>,
        #[command(subcommand)]
        action: RequestAction,
    },
}

#[derive(clap::Args)]
struct WindowArgs {
    /// Surface category to check, as the booking site names it
    #[arg(long)]
    surface: Option<String>,
    /// Window start, HH:MM
    #[arg(long = "from")]
    window_start: Option<String>,
    /// Window end, HH:MM (00:00 means midnight)
    #[arg(long = "to")]
    window_end: Option<String>,
    /// Cell size in minutes
    #[arg(long)]
    cell_minutes: Option<u32>,
}

#[derive(Subcommand)]
enum RequestAction {
    /// Queue a new booking request
    Add {
        /// Date to book, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Start time, HH:MM
        #[arg(long = "from")]
        time_from: String,
        /// Duration in minutes
        #[arg(long, default_value_t = 120)]
        duration: u32,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List all requests
    List,
    /// Check one request against an initialize payload and record the outcome
    Check {
        #[arg(long)]
        id: u64,
        /// Input payload file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    surface: &'a str,
    window: Interval,
    results: &'a [AvailabilityResult],
    rejected: &'a [RejectedSlot],
    dropped: usize,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = WatchConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve {
            input,
            output,
            window,
            format,
        } => {
            let config = window.apply(config);
            let (start, end) = config.window()?;
            let window = Interval::new(start, end);
            let day = read_payload(input.as_deref())?;
            let resolution = resolve_day(&config, &day, window, config.cell_minutes)?;

            let rendered = match format {
                OutputFormat::Json => {
                    let out = ResolveOutput {
                        surface: &config.surface,
                        window,
                        results: &resolution.results,
                        rejected: &resolution.rejected,
                        dropped: day.dropped,
                    };
                    let mut json = serde_json::to_string_pretty(&out)?;
                    json.push('\n');
                    json
                }
                OutputFormat::Text => {
                    render::render_digest(&config, &config.surface, window, &resolution.results)
                }
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Requests { store, action } => {
            let path = store.unwrap_or_else(|| config.requests_path.clone());
            let mut store = JsonFileStore::new(path);
            run_request_action(&mut store, config, action)?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

impl WindowArgs {
    /// Overlay command-line flags on the config.
    fn apply(self, mut config: WatchConfig) -> WatchConfig {
        if let Some(surface) = self.surface {
            config.surface = surface;
        }
        if let Some(start) = self.window_start {
            config.window_start = start;
        }
        if let Some(end) = self.window_end {
            config.window_end = end;
        }
        if let Some(cell_minutes) = self.cell_minutes {
            config.cell_minutes = cell_minutes;
        }
        config
    }
}

/// Read and normalize an initialize payload from a file or stdin.
fn read_payload(input: Option<&str>) -> Result<DayPayload> {
    let payload = read_input(input)?;
    parse_initialize(&payload).context("Failed to read initialize payload")
}

/// Resolve the configured surface over `window`.
fn resolve_day(
    config: &WatchConfig,
    day: &DayPayload,
    window: Interval,
    cell_minutes: u32,
) -> Result<Resolution> {
    let courts = day.catalog.by_surface(&config.surface);
    let resolution =
        resolve_with_report(&courts, &day.blocked_slots, window.start, window.end, cell_minutes)
            .with_context(|| format!("Failed to resolve '{}' courts", config.surface))?;
    info!(
        surface = %config.surface,
        %window,
        courts = courts.len(),
        free = resolution.results.len(),
        rejected = resolution.rejected.len(),
        "resolved availability"
    );
    Ok(resolution)
}

fn run_request_action(
    store: &mut JsonFileStore,
    config: WatchConfig,
    action: RequestAction,
) -> Result<()> {
    match action {
        RequestAction::Add {
            date,
            time_from,
            duration,
            description,
        } => {
            let time_from = time_from
                .parse::<TimeOfDay>()
                .with_context(|| format!("Invalid start time: '{time_from}'"))?;
            let request = store
                .insert(
                    NewRequest {
                        date,
                        time_from,
                        duration_minutes: duration,
                        description,
                    },
                    Utc::now(),
                )
                .with_context(|| format!("Failed to save request to {}", store.path().display()))?;
            println!("Added {}", describe(&request));
        }
        RequestAction::List => {
            let requests = store
                .list()
                .with_context(|| format!("Failed to read {}", store.path().display()))?;
            if requests.is_empty() {
                println!("No booking requests");
            }
            for request in &requests {
                println!("{}", describe(request));
            }
        }
        RequestAction::Check { id, input, window } => {
            // Without --from/--to the request's own window is resolved, so a
            // match means every cell of it is free.
            let explicit_window = window.window_start.is_some() || window.window_end.is_some();
            let config = window.apply(config);
            let mut request = store
                .get(id)?
                .with_context(|| format!("No booking request #{id}"))?;
            let (window, cell_minutes) = if explicit_window {
                let (start, end) = config.window()?;
                (Interval::new(start, end), config.cell_minutes)
            } else {
                (request.target_window()?, DEFAULT_CELL_MINUTES)
            };

            let day = read_payload(input.as_deref())?;
            let results = if day.catalog.by_surface(&config.surface).is_empty() {
                info!(id, surface = %config.surface, date = %request.date, "date not open yet");
                Vec::new()
            } else {
                resolve_day(&config, &day, window, cell_minutes)?.results
            };
            request.record_check(&results, Utc::now())?;
            store
                .update(&request)
                .with_context(|| format!("Failed to save request to {}", store.path().display()))?;
            println!("{}", describe(&request));
        }
    }
    Ok(())
}

/// One summary line for a request.
fn describe(request: &BookingRequest) -> String {
    let window = request
        .target_window()
        .map(|w| w.to_string())
        .unwrap_or_else(|_| format!("{} +{} min", request.time_from, request.duration_minutes));
    let mut line = format!(
        "#{} {} {} {} attempts={}",
        request.id, request.date, window, request.status, request.attempts
    );
    if let Some(outcome) = &request.outcome {
        line.push_str(" - ");
        line.push_str(outcome);
    }
    if !request.description.is_empty() {
        line.push_str(&format!(" ({})", request.description));
    }
    line
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
            print!("{}", content);
        }
    }
    Ok(())
}
