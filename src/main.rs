//! diskmap - drive inventory
//!
//! Thin command-line front end over the `diskmap` library: one-shot listing,
//! periodic polling, and offline replay of captured `wmic` output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use diskmap::config::{get_config_path, Config, DisplayConfig};
use diskmap::disk::{drives_from_outputs, QueryOutputs, WmicQuery};
use diskmap::display::render_table;
use diskmap::{get_drives, DriveEntry, QueryOptions};

/// diskmap - see which physical disk backs each drive
#[derive(Parser)]
#[command(name = "diskmap")]
#[command(version)]
#[command(about = "List drives with usage and the physical disk behind each one")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Per-query timeout in seconds (overrides the config file)
    #[arg(long, global = true)]
    timeout_seconds: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll drives once and print them (default)
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Poll drives repeatedly until Ctrl-C
    Watch {
        /// Interval between polls in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,

        /// Stop after this many polls
        #[arg(short, long)]
        count: Option<u64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Resolve drives from captured wmic output in a directory
    Replay {
        /// Directory holding diskdrive.csv, logicaldisk.csv,
        /// drive_to_partition.txt and logical_to_partition.txt
        dir: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show configuration path and effective settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// One poll's worth of output.
#[derive(Serialize)]
struct DriveReport<'a> {
    collected_at: DateTime<Utc>,
    drives: &'a [DriveEntry],
}

impl Cli {
    /// The chosen subcommand; a bare `diskmap` is `list` without `--json`.
    fn command_or_default(self) -> Commands {
        self.command.unwrap_or(Commands::List { json: false })
    }
}

fn default_log_directive(verbose: bool) -> &'static str {
    if verbose {
        "diskmap=debug"
    } else {
        "diskmap=info"
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(verbose)));

    // stderr keeps stdout clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_report(drives: &[DriveEntry], json: bool, display: &DisplayConfig) -> Result<()> {
    if json {
        let report = DriveReport {
            collected_at: Utc::now(),
            drives,
        };
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize drive report")?;
        println!("{}", rendered);
    } else {
        print!("{}", render_table(drives, display));
    }
    Ok(())
}

async fn run_watch(
    options: &QueryOptions,
    interval: Duration,
    count: Option<u64>,
    json: bool,
    display: &DisplayConfig,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut polls = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        let drives = get_drives(options).await;
        if !json {
            println!(
                "{} {}",
                "Polled at".dimmed(),
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
            );
        }
        print_report(&drives, json, display)?;

        polls += 1;
        if count.is_some_and(|limit| polls >= limit) {
            break;
        }
    }

    Ok(())
}

fn print_config(config: &Config) -> Result<()> {
    println!("{}", "diskmap configuration".bright_cyan().bold());
    println!("  {} {}", "Config file:".bold(), get_config_path()?);
    println!(
        "  {} {}",
        "Query tool:".bold(),
        config.query_options().program
    );
    println!(
        "  {} {}s",
        "Query timeout:".bold(),
        config.query_options().timeout.as_secs()
    );
    println!("  {} {}ms", "Poll interval:".bold(), config.poll.interval_ms);
    println!(
        "  {} {}% / {}%",
        "Usage thresholds:".bold(),
        config.display.warning_percent,
        config.display.danger_percent
    );
    println!(
        "  {} {}",
        "Replay files:".bold(),
        WmicQuery::ALL
            .iter()
            .map(|query| query.capture_file_name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "using default configuration");
        Config::default()
    });

    let mut options = config.query_options();
    if let Some(secs) = cli.timeout_seconds {
        options.timeout = Duration::from_secs(secs.max(1));
    }

    match cli.command_or_default() {
        Commands::List { json } => {
            let rt = tokio::runtime::Runtime::new()?;
            let drives = rt.block_on(get_drives(&options));
            print_report(&drives, json || config.display.json, &config.display)?;
        }
        Commands::Watch {
            interval_ms,
            count,
            json,
        } => {
            let interval =
                Duration::from_millis(interval_ms.unwrap_or(config.poll.interval_ms).max(1));
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_watch(
                &options,
                interval,
                count,
                json || config.display.json,
                &config.display,
            ))?;
        }
        Commands::Replay { dir, json } => {
            if !dir.is_dir() {
                anyhow::bail!("Replay directory not found: {}", dir.display());
            }
            let outputs = QueryOutputs::load_captured(&dir);
            let drives = drives_from_outputs(&outputs);
            print_report(&drives, json || config.display.json, &config.display)?;
        }
        Commands::Config { init: false } => {
            print_config(&config)?;
        }
        Commands::Config { init: true } => {
            let (config, created) = Config::init()?;
            if created {
                println!("{} {}", "Created".bright_green(), get_config_path()?);
            } else {
                println!("{} {}", "Already exists:".dimmed(), get_config_path()?);
            }
            print_config(&config)?;
        }
    }

    Ok(())
}
