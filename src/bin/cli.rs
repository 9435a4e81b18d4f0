//! jobwatch CLI
//!
//! Checks the careers page once (`run`, for cron) or on a built-in daily
//! schedule (`watch`), and reports new Band Level postings to Telegram.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jobwatch::{
    error::Result,
    models::{Config, TelegramCredentials, parse_time_of_day},
    pipeline::{self, Monitor},
    services::{HttpFetcher, LogNotifier, PostingExtractor, TelegramNotifier},
    storage::{LocalStorage, PostingStore},
    utils::{http, log as log_line},
};

/// jobwatch - Careers Page Watcher
#[derive(Parser, Debug)]
#[command(
    name = "jobwatch",
    version,
    about = "Reports new Band Level postings from the MUN careers page to Telegram"
)]
struct Cli {
    /// Directory holding config.toml, the saved state and the log file
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the careers page once
    Run {
        /// Log the message instead of sending it, and leave the saved state alone
        #[arg(long)]
        dry_run: bool,
    },

    /// Check the careers page every day at a fixed local time
    Watch {
        /// Time of day, HH:MM (default: schedule.at from config)
        #[arg(long)]
        at: Option<String>,
    },

    /// Validate configuration and credentials
    Validate,

    /// Show the saved postings
    Info,
}

/// Initialize logging, appending to `file` when given.
fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format(|buf, record| {
        log_line::write_line(buf, chrono::Local::now().naive_local(), record.level(), record.args())
    });

    if let Some(path) = file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Wire the monitor for a real run, or a dry run that neither sends nor saves.
fn build_monitor(config: &Config, storage: LocalStorage, dry_run: bool) -> Result<Monitor> {
    let client = http::create_client(&config.source)?;
    let fetcher = HttpFetcher::new(client.clone(), &config.source.url);
    let extractor = PostingExtractor::new(&config.source)?;

    let monitor = if dry_run {
        Monitor::new(fetcher, extractor, storage, LogNotifier).without_saving()
    } else {
        let credentials = TelegramCredentials::from_env()?;
        let notifier = TelegramNotifier::new(client, &config.notifier, &credentials);
        Monitor::new(fetcher, extractor, storage, notifier)
    };

    Ok(monitor.with_save_policy(config.storage.save_policy))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    std::fs::create_dir_all(&cli.storage_dir)?;
    let config_path = cli.storage_dir.join("config.toml");
    let (config, config_error) = match Config::load_or_default(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    let log_file = match cli.command {
        Command::Run { .. } | Command::Watch { .. } if !cli.stderr => config
            .logging
            .file
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .map(|f| cli.storage_dir.join(f)),
        _ => None,
    };
    init_logging(level, log_file.as_deref())?;

    if let Some(e) = config_error {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            config_path.display(),
            e
        );
    }

    let storage = LocalStorage::new(cli.storage_dir.join(&config.storage.state_file));

    match cli.command {
        Command::Run { dry_run } => {
            config.validate()?;
            let monitor = build_monitor(&config, storage, dry_run)?;
            if !monitor.run_once().await.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Watch { at } => {
            config.validate()?;
            let at = match at {
                Some(at) => parse_time_of_day(&at)?,
                None => config.schedule.time()?,
            };
            let monitor = build_monitor(&config, storage, false)?;

            log::info!("Watching {} daily at {}", config.source.url, at.format("%H:%M"));
            pipeline::run_daily(&monitor, at, shutdown_signal()).await;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            match TelegramCredentials::from_env() {
                Ok(credentials) => {
                    log::info!("✓ Credentials present for chat {}", credentials.chat_id)
                }
                Err(e) => {
                    log::error!("Credentials missing: {}", e);
                    return Err(e);
                }
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Watching: {} (table #{})", config.source.url, config.source.table_id);
            log::info!("Save policy: {:?}", config.storage.save_policy);

            let saved = storage.load().await?;
            if saved.is_empty() {
                log::info!("No saved postings yet.");
            } else {
                log::info!("{} saved postings in {}", saved.len(), storage.location());
                for posting in &saved {
                    log::info!(
                        "    {} (closes {})",
                        posting.title,
                        posting.closing_date.as_deref().unwrap_or("n/a")
                    );
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
