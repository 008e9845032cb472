//! reportwatch CLI: committee report publication tracker.
//!
//! Usage:
//!   reportwatch run [--config path] [--data-dir dir]
//!   reportwatch lateness | match
//!   reportwatch parse-datetime <text> [--anchor YYYY-MM-DD] [--roll-forward]
//!   reportwatch split-title <text>

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use reportwatch::{
    extract_date_time, Config, CsvStore, HttpUpstream, Pipeline, TableStore, Upstream, YearPolicy,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "reportwatch",
    version,
    about = "Tracks committee report publication against the Order Paper"
)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the CSV tables (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll both sources, then compute lateness and statuses
    Run,
    /// Fill in lateness bounds from the existing scan ledger
    Lateness,
    /// Re-evaluate Order Paper statuses against the current time
    Match,
    /// Show what the date/time extractor makes of a fragment
    ParseDatetime {
        text: String,
        /// Anchor date supplying a missing year (defaults to today)
        #[arg(long)]
        anchor: Option<NaiveDate>,
        /// Move dates before the anchor into the following year
        #[arg(long)]
        roll_forward: bool,
    },
    /// Show how a report description splits into ordinal and title
    SplitTitle { text: String },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Config, String> {
    let mut config = Config::load(path.as_deref()).map_err(|e| format!("Failed to load config: {}", e))?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    Ok(config)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn build_pipeline(config: Config) -> Result<Pipeline, String> {
    let upstream: Arc<dyn Upstream> =
        Arc::new(HttpUpstream::new(&config).map_err(|e| format!("Failed to build HTTP client: {}", e))?);
    let store: Arc<dyn TableStore> = Arc::new(CsvStore::from_config(&config));
    Pipeline::new(config, upstream, store).map_err(|e| e.to_string())
}

/// Table-only pipeline for the commands that never touch the network
fn build_offline_pipeline(config: Config) -> Result<Pipeline, String> {
    let store: Arc<dyn TableStore> = Arc::new(CsvStore::from_config(&config));
    Pipeline::offline(config, store).map_err(|e| e.to_string())
}

async fn cmd_run(config: Config) -> i32 {
    let pipeline = match build_pipeline(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match pipeline.run(now()).await {
        Ok(summary) => {
            println!("New reports:           {}", summary.new_reports);
            println!("New publication IDs:   {}", summary.new_identifiers);
            match summary.new_order_papers {
                Some(n) => println!("New order paper rows:  {}", n),
                None => println!("New order paper rows:  (no order paper section)"),
            }
            println!("Lateness computed:     {}", summary.lateness_updates);
            println!("Status changes:        {}", summary.status_changes);
            if summary.is_clean() {
                0
            } else {
                for stage in &summary.failed_stages {
                    eprintln!("Warning: {} stage failed", stage);
                }
                1
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_lateness(config: Config) -> i32 {
    match build_offline_pipeline(config).and_then(|p| p.recompute_lateness().map_err(|e| e.to_string())) {
        Ok(n) => {
            println!("Lateness computed for {} report(s)", n);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_match(config: Config) -> i32 {
    match build_offline_pipeline(config).and_then(|p| p.rematch(now()).map_err(|e| e.to_string())) {
        Ok(n) => {
            println!("Updated {} order paper status(es)", n);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_parse_datetime(text: &str, anchor: Option<NaiveDate>, roll_forward: bool) -> i32 {
    let anchor = anchor.unwrap_or_else(|| now().date());
    let policy = if roll_forward {
        YearPolicy::RollForward
    } else {
        YearPolicy::AnchorYear
    };
    let found = extract_date_time(text, anchor, policy);
    let date = found.date.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
    let time = found.time.map(|t| t.to_string()).unwrap_or_else(|| "-".into());
    println!("date: {}", date);
    println!("time: {}", time);
    0
}

fn cmd_split_title(config: &Config, text: &str) -> i32 {
    match config.grammar() {
        Ok(grammar) => {
            let split = grammar.split(text);
            println!("ordinal: {}", split.ordinal);
            println!("title:   {}", split.title);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match load_config(cli.config, cli.data_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Run => cmd_run(config).await,
        Commands::Lateness => cmd_lateness(config),
        Commands::Match => cmd_match(config),
        Commands::ParseDatetime { text, anchor, roll_forward } => cmd_parse_datetime(&text, anchor, roll_forward),
        Commands::SplitTitle { text } => cmd_split_title(&config, &text),
    };
    std::process::exit(code);
}
