mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use cadence_engine::clock::{parse_day, parse_offset};
use clap::{Parser, Subcommand, ValueEnum};
use time::{Date, UtcOffset};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Which records feed the density strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RecordKind {
    Sales,
    Shifts,
}

/// Temporal derivations over exported record snapshots.
#[derive(Parser)]
#[command(
    name = "cadence",
    version,
    about = "Temporal derivations over exported record snapshots"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a cadence.toml settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference UTC offset, e.g. +03:00 (overrides the settings file)
    #[arg(long, global = true, allow_hyphen_values = true)]
    offset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct an entity's active/inactive status per day
    Status {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,
        /// Entity to reconstruct
        #[arg(long)]
        entity: String,
        /// Single day to report (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = day_arg, conflicts_with_all = ["from", "to"])]
        day: Option<Date>,
        /// First day of a calendar range (inclusive)
        #[arg(long, value_parser = day_arg, requires = "to")]
        from: Option<Date>,
        /// Last day of a calendar range (inclusive)
        #[arg(long, value_parser = day_arg, requires = "from")]
        to: Option<Date>,
    },

    /// Classify every clock-in against its entity's punctuality policy
    Compliance {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,
    },

    /// Bucket records into 15-minute slots and find the peak window
    Density {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,
        /// Report one peak window per value of this record attribute
        #[arg(long)]
        group_by: Option<String>,
        /// Peak window width in 15-minute slots
        #[arg(long)]
        window: Option<usize>,
        /// Records to bucket
        #[arg(long, default_value = "sales", value_enum)]
        records: RecordKind,
    },

    /// Infer who currently staffs each entity
    Roster {
        /// Path to the snapshot JSON file
        snapshot: PathBuf,
        /// Day to treat as today (YYYY-MM-DD); defaults to today
        #[arg(long, value_parser = day_arg)]
        today: Option<Date>,
        /// Number of most recent scheduled dates to consider
        #[arg(long)]
        recent_dates: Option<usize>,
    },
}

/// Settings and global flags resolved once for every command.
pub(crate) struct Context {
    pub output: OutputFormat,
    pub quiet: bool,
    pub tz: UtcOffset,
    pub settings: Settings,
}

fn day_arg(s: &str) -> Result<Date, String> {
    parse_day(s).map_err(|e| e.to_string())
}

/// Install the stderr log subscriber. `CADENCE_LOG` takes `RUST_LOG`-style
/// directives and defaults to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CADENCE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let tz = match cli.offset.as_deref() {
        Some(raw) => parse_offset(raw).map_err(|e| e.to_string()),
        None => settings.offset().map_err(|e| e.to_string()),
    };
    let tz = match tz {
        Ok(tz) => tz,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let ctx = Context {
        output: cli.output,
        quiet: cli.quiet,
        tz,
        settings,
    };

    match cli.command {
        Commands::Status {
            snapshot,
            entity,
            day,
            from,
            to,
        } => {
            let range = match (day, from, to) {
                (Some(day), _, _) => Some((day, day)),
                (None, Some(from), Some(to)) => Some((from, to)),
                _ => None,
            };
            commands::status::cmd_status(&snapshot, &entity, range, &ctx);
        }
        Commands::Compliance { snapshot } => {
            commands::compliance::cmd_compliance(&snapshot, &ctx);
        }
        Commands::Density {
            snapshot,
            group_by,
            window,
            records,
        } => {
            commands::density::cmd_density(
                &snapshot,
                group_by.as_deref(),
                window,
                records,
                &ctx,
            );
        }
        Commands::Roster {
            snapshot,
            today,
            recent_dates,
        } => {
            commands::roster::cmd_roster(&snapshot, today, recent_dates, &ctx);
        }
    }
}

/// Report an error on stderr, as a JSON object when `--output json`.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
