//! `panem-migrate` binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and the legacy document directory, runs the one-time migration, and
//! prints the report. Run with `--dry-run` first to see what would happen.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use panem_migrate::migrate;
use panem_store_json::JsonStore;
use panem_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Migrate legacy Panem JSON documents into SQLite")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Scan and report without writing to the database.
  #[arg(long)]
  dry_run: bool,
}

/// Runtime configuration, deserialised from `config.toml` and `PANEM_*`
/// environment variables.
#[derive(Deserialize, Clone)]
struct MigrateConfig {
  #[serde(default = "default_data_dir")]
  data_dir: PathBuf,
  #[serde(default = "default_db_path")]
  db_path:  PathBuf,
}

fn default_data_dir() -> PathBuf { PathBuf::from(".") }

fn default_db_path() -> PathBuf { PathBuf::from("panem.db") }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PANEM"))
    .build()
    .context("failed to read config file")?;

  let cfg: MigrateConfig = settings
    .try_deserialize()
    .context("failed to deserialise MigrateConfig")?;

  let legacy = JsonStore::new(&cfg.data_dir);
  if !legacy.documents_present() {
    tracing::warn!(
      "no legacy documents found under {:?} - nothing to migrate",
      cfg.data_dir
    );
    return Ok(());
  }

  let store = SqliteStore::open(&cfg.db_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.db_path))?;

  if cli.dry_run {
    tracing::info!("dry run - no changes will be made");
  }

  let report = migrate(&store, &legacy, cli.dry_run).await;
  println!("{report}");

  if cli.dry_run {
    println!("\nTo execute this migration for real, run again without --dry-run.");
  } else if report.errors.is_empty() {
    println!("\nNext steps:");
    println!("  1. Correct the placeholder tribute names and owners");
    println!("  2. Verify the migrated data, then disable fallback reads");
    println!("  3. Keep the JSON documents as backups until you are confident");
  } else {
    println!("\nMigration completed with errors; review the report above.");
  }

  Ok(())
}
