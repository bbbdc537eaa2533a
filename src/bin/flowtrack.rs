//! FlowTrack CLI - Command-line interface for FlowTrack ingest
//!
//! Commands:
//! - import: Merge wearable CSV exports into daily snapshots and upsert them
//! - insights: Reconcile stored snapshots with manual logs into daily rows
//! - inspect: Show how one export file's headers resolve

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use flowtrack_ingest::{
    daily_insights_at, import_garmin, inspect_csv, CsvSource, ImportFiles, IngestError,
    InsightFilter, MemoryStore, PhysioLog, SessionRating, DEFAULT_WINDOW_DAYS, INGEST_VERSION,
};

/// FlowTrack - wearable export ingestion and daily insights
#[derive(Parser)]
#[command(name = "flowtrack")]
#[command(version = INGEST_VERSION)]
#[command(about = "Import wearable CSV exports and reconcile daily insights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge CSV exports into daily snapshots and upsert them as garmin rows
    Import {
        /// Sleep export (use - for stdin)
        #[arg(long)]
        sleep: Option<PathBuf>,

        /// HRV export (use - for stdin)
        #[arg(long)]
        hrv: Option<PathBuf>,

        /// Heart rate export (use - for stdin)
        #[arg(long)]
        heart_rate: Option<PathBuf>,

        /// Activities export (use - for stdin)
        #[arg(long)]
        activities: Option<PathBuf>,

        /// JSON snapshot store; created if missing, saved after import
        #[arg(long)]
        store: Option<PathBuf>,

        /// Owner of the imported rows
        #[arg(long, env = "FLOWTRACK_USER_ID", default_value = "local")]
        user_id: String,

        /// Output format (defaults to json-pretty on a terminal, ndjson otherwise)
        #[arg(long)]
        output_format: Option<OutputFormat>,
    },

    /// Print one reconciled row per day over a trailing window
    Insights {
        /// JSON snapshot store written by `import`
        #[arg(long)]
        store: PathBuf,

        /// JSON array of session ratings
        #[arg(long)]
        sessions: Option<PathBuf>,

        /// JSON array of physio logs
        #[arg(long)]
        physio: Option<PathBuf>,

        /// Window length in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,

        /// Last day of the window (YYYY-MM-DD, defaults to the local date)
        #[arg(long)]
        today: Option<String>,

        /// Only keep the most recent N days
        #[arg(long)]
        range: Option<u32>,

        /// Drop days tagged sick
        #[arg(long)]
        exclude_sick: bool,

        /// Drop days tagged partner_sleepover
        #[arg(long)]
        exclude_partner_sleepover: bool,

        #[arg(long, env = "FLOWTRACK_USER_ID", default_value = "local")]
        user_id: String,

        /// Output format (defaults to json-pretty on a terminal, ndjson otherwise)
        #[arg(long)]
        output_format: Option<OutputFormat>,
    },

    /// Show headers and resolved columns for one export file
    Inspect {
        /// Kind of export
        #[arg(long)]
        source: SourceArg,

        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Sleep,
    Hrv,
    HeartRate,
    Activities,
}

impl From<SourceArg> for CsvSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Sleep => CsvSource::Sleep,
            SourceArg::Hrv => CsvSource::Hrv,
            SourceArg::HeartRate => CsvSource::HeartRate,
            SourceArg::Activities => CsvSource::Activities,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FlowtrackCliError> {
    match cli.command {
        Commands::Import {
            sleep,
            hrv,
            heart_rate,
            activities,
            store,
            user_id,
            output_format,
        } => {
            single_stdin(&[
                sleep.as_deref(),
                hrv.as_deref(),
                heart_rate.as_deref(),
                activities.as_deref(),
            ])?;
            let files = ImportFiles {
                sleep_csv: read_optional(sleep.as_deref())?,
                hrv_csv: read_optional(hrv.as_deref())?,
                heart_rate_csv: read_optional(heart_rate.as_deref())?,
                activities_csv: read_optional(activities.as_deref())?,
            };
            cmd_import(&files, store.as_deref(), &user_id, output_format)
        }

        Commands::Insights {
            store,
            sessions,
            physio,
            days,
            today,
            range,
            exclude_sick,
            exclude_partner_sleepover,
            user_id,
            output_format,
        } => {
            single_stdin(&[Some(store.as_path()), sessions.as_deref(), physio.as_deref()])?;
            let filter = InsightFilter {
                range_days: range,
                exclude_sick,
                exclude_partner_sleepover,
            };
            cmd_insights(
                &store,
                sessions.as_deref(),
                physio.as_deref(),
                days,
                today.as_deref(),
                &filter,
                &user_id,
                output_format,
            )
        }

        Commands::Inspect { source, input } => cmd_inspect(source.into(), &input),
    }
}

fn cmd_import(
    files: &ImportFiles,
    store_path: Option<&Path>,
    user_id: &str,
    output_format: Option<OutputFormat>,
) -> Result<(), FlowtrackCliError> {
    if CsvSource::ALL.iter().all(|s| files.get(*s).is_none()) {
        return Err(FlowtrackCliError::NoInput);
    }

    let mut store = match store_path {
        Some(path) if path.exists() => MemoryStore::from_json(&fs::read_to_string(path)?)?,
        _ => MemoryStore::new(),
    };

    let summary = import_garmin(&mut store, user_id, files)?;

    if let Some(path) = store_path {
        fs::write(path, store.to_json()?)?;
    }

    print!("{}", format_output(&[summary], output_format)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_insights(
    store_path: &Path,
    sessions: Option<&Path>,
    physio: Option<&Path>,
    days: u32,
    today: Option<&str>,
    filter: &InsightFilter,
    user_id: &str,
    output_format: Option<OutputFormat>,
) -> Result<(), FlowtrackCliError> {
    let store = MemoryStore::from_json(&read_input(store_path)?)?;

    let sessions: Vec<SessionRating> = match read_optional(sessions)? {
        Some(text) => serde_json::from_str(&text)?,
        None => Vec::new(),
    };
    let physio_logs: Vec<PhysioLog> = match read_optional(physio)? {
        Some(text) => serde_json::from_str(&text)?,
        None => Vec::new(),
    };

    let today = match today {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| IngestError::DateParseError(format!("{raw}: {e}")))?,
        None => chrono::Local::now().date_naive(),
    };

    let rows = daily_insights_at(&store, user_id, today, days, &sessions, &physio_logs)?;
    let rows = filter.apply(rows, today);

    print!("{}", format_output(&rows, output_format)?);
    Ok(())
}

fn cmd_inspect(source: CsvSource, input: &Path) -> Result<(), FlowtrackCliError> {
    let text = read_input(input)?;
    let report = inspect_csv(source, &text);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// Helper functions

fn read_input(path: &Path) -> Result<String, FlowtrackCliError> {
    if is_stdin(path) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn is_stdin(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

/// Stdin can back at most one input of a command
fn single_stdin(paths: &[Option<&Path>]) -> Result<(), FlowtrackCliError> {
    let count = paths.iter().flatten().filter(|p| is_stdin(p)).count();
    if count > 1 {
        return Err(FlowtrackCliError::StdinReused(count));
    }
    Ok(())
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>, FlowtrackCliError> {
    path.map(read_input).transpose()
}

fn format_output<T: Serialize>(
    items: &[T],
    format: Option<OutputFormat>,
) -> Result<String, FlowtrackCliError> {
    let format = format.unwrap_or(if atty::is(atty::Stream::Stdout) {
        OutputFormat::JsonPretty
    } else {
        OutputFormat::Ndjson
    });

    match format {
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for item in items {
                out.push_str(&serde_json::to_string(item)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string(items)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(items)? + "\n"),
    }
}

// Error handling

#[derive(Debug)]
enum FlowtrackCliError {
    Io(io::Error),
    Ingest(IngestError),
    Json(serde_json::Error),
    NoInput,
    StdinReused(usize),
}

impl From<io::Error> for FlowtrackCliError {
    fn from(e: io::Error) -> Self {
        FlowtrackCliError::Io(e)
    }
}

impl From<IngestError> for FlowtrackCliError {
    fn from(e: IngestError) -> Self {
        FlowtrackCliError::Ingest(e)
    }
}

impl From<serde_json::Error> for FlowtrackCliError {
    fn from(e: serde_json::Error) -> Self {
        FlowtrackCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FlowtrackCliError> for CliError {
    fn from(e: FlowtrackCliError) -> Self {
        match e {
            FlowtrackCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FlowtrackCliError::Ingest(IngestError::DateParseError(msg)) => CliError {
                code: "DATE_PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Use YYYY-MM-DD for --today".to_string()),
            },
            FlowtrackCliError::Ingest(IngestError::JsonError(e)) | FlowtrackCliError::Json(e) => {
                CliError {
                    code: "JSON_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some("Check JSON syntax of the store and log files".to_string()),
                }
            }
            FlowtrackCliError::Ingest(e) => CliError {
                code: "INGEST_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FlowtrackCliError::StdinReused(count) => CliError {
                code: "STDIN_REUSED".to_string(),
                message: format!("{} inputs read from stdin (-)", count),
                hint: Some("Pass - for at most one input; use file paths for the rest".to_string()),
            },
            FlowtrackCliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "No export files given".to_string(),
                hint: Some(
                    "Pass at least one of --sleep, --hrv, --heart-rate, --activities".to_string(),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_stdin_input_allowed() {
        let stdin = Path::new("-");
        let file = Path::new("hrv.csv");
        assert!(single_stdin(&[Some(stdin), Some(file), None]).is_ok());
        assert!(single_stdin(&[None, None]).is_ok());
    }

    #[test]
    fn test_stdin_reused_rejected() {
        let stdin = Path::new("-");
        let err = single_stdin(&[Some(stdin), None, Some(stdin)]).unwrap_err();
        assert!(matches!(err, FlowtrackCliError::StdinReused(2)));
        assert_eq!(CliError::from(err).code, "STDIN_REUSED");
    }
}
