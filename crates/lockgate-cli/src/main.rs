//! lockgate - QR locker gate
//!
//! Reads QR codes from a keyboard-emulating scanner, looks them up in the
//! credential store and opens the matching locker over a serial link.
//!
//! Subcommands:
//! - `run` (default) - start the gate
//! - `history` - print recent audit entries

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Config;
use lockgate_hardware::console::ConsoleConfirmation;
use lockgate_hardware::evdev::EvdevScanner;
use lockgate_hardware::mock::MockActuator;
use lockgate_hardware::serial::SerialActuator;
use lockgate_hardware::{AnyActuatorLink, AnyConfirmationChannel, AnyScannerDevice};
use lockgate_pipeline::ScanPipeline;
use lockgate_storage::{AuditStore, Database, SqliteAuditStore, SqliteCredentialStore};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// QR locker gate
#[derive(Parser, Debug)]
#[command(name = "lockgate", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the gate
    Run {
        /// Scanner evdev device (overrides config)
        #[arg(long)]
        scanner: Option<String>,

        /// Actuator serial port (overrides config)
        #[arg(long)]
        actuator: Option<String>,

        /// Log locker commands instead of writing them to the serial port
        #[arg(long)]
        dry_run: bool,
    },

    /// Print recent access history
    History {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,

        /// Only count entries for this QR code
        #[arg(long)]
        qr_code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = Config::resolve_path(args.config.as_deref());
    let loaded = Config::from_file(&config_path)?;
    let config_found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    if let Some(database) = args.database {
        config.database.path = database;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if config_found {
        info!(config_file = %config_path.display(), "config_loaded");
    } else {
        warn!(config_file = %config_path.display(), "Config file not found, using defaults");
    }

    match args.command.unwrap_or(Command::Run {
        scanner: None,
        actuator: None,
        dry_run: false,
    }) {
        Command::Run {
            scanner,
            actuator,
            dry_run,
        } => {
            if let Some(device) = scanner {
                config.scanner.device = device;
            }
            if let Some(device) = actuator {
                config.actuator.device = device;
            }
            run(config, dry_run).await
        }
        Command::History { limit, qr_code } => history(config, limit, qr_code).await,
    }
}

async fn run(config: Config, dry_run: bool) -> anyhow::Result<()> {
    let db = Database::new(config.database_config())
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path))?;
    let credentials = SqliteCredentialStore::new(db.pool().clone());
    let audit = SqliteAuditStore::new(db.pool().clone());

    let scanner = EvdevScanner::open(&config.scanner.device)
        .await
        .with_context(|| format!("Failed to open scanner {}", config.scanner.device))?;

    let actuator = if dry_run {
        warn!("Dry run: locker commands are not sent");
        AnyActuatorLink::Mock(MockActuator::discarding())
    } else {
        let link = SerialActuator::open(
            &config.actuator.device,
            config.actuator.baud_rate,
            config.settle_delay(),
        )
        .await
        .with_context(|| format!("Failed to open actuator {}", config.actuator.device))?;
        AnyActuatorLink::Serial(link)
    };

    let mut pipeline = ScanPipeline::new(
        config.pipeline_config(),
        AnyScannerDevice::Evdev(scanner),
        credentials,
        audit,
        actuator,
        AnyConfirmationChannel::Console(
            ConsoleConfirmation::stdio().context("Failed to attach operator console")?,
        ),
    );

    let scanner_info = pipeline.scanner_info().await?;
    info!(
        scanner = %scanner_info.name,
        path = scanner_info.path.as_deref().unwrap_or("-"),
        actuator = %config.actuator.device,
        baud_rate = config.actuator.baud_rate,
        "Ready, scan a QR code"
    );

    let result = tokio::select! {
        result = pipeline.run() => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Shutdown signal received");
            Ok(())
        }
    };

    let stats = pipeline.stats();
    info!(
        tokens = stats.tokens,
        granted = stats.granted,
        denied = stats.denied,
        unknown = stats.unknown,
        duplicates = stats.duplicates,
        "Scan pipeline stopped"
    );

    db.close().await;

    if let Err(e) = &result {
        error!(error = %e, "Gate terminated");
    }
    result.context("Scan pipeline failed")
}

async fn history(config: Config, limit: i64, qr_code: Option<String>) -> anyhow::Result<()> {
    let db = Database::new(config.database_config().create_if_missing(false))
        .await
        .with_context(|| format!("Failed to open database {}", config.database.path))?;
    let audit = SqliteAuditStore::new(db.pool().clone());

    if let Some(qr_code) = qr_code {
        let count = audit.count_for_code(&qr_code).await?;
        println!("{qr_code}: {count} access(es)");
    } else {
        for record in audit.recent(limit).await? {
            println!(
                "{}  {:<20}  locker {:>2}  {:<4}  {}",
                record.logged_at.format("%Y-%m-%d %H:%M:%S"),
                record.owner_name,
                record.locker_num,
                record.sec_lvl,
                record.qr_code
            );
        }
    }

    db.close().await;
    Ok(())
}
