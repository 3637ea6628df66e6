//! `ward` — command-line front end for the clinic appointment book.
//!
//! # Usage
//!
//! ```
//! ward patient add --name "Tan Ah Kow" --ic S1234567A
//! ward staff add --name "Dr Lim" --ic S7654321B
//! ward appointment add --patient 1 --staff 1 --at "2026-03-14 09:30"
//! ward --json patient appointments 1 --after "2026-03-01 00:00"
//! ```
//!
//! Every invocation loads the data directory, runs one command and writes
//! the directory back if the command changed anything.

mod commands;
mod render;
mod time;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use commands::Command;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use ward_core::{Scheduler, store::SnapshotStore};
use ward_store_flat::FlatStore;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ward", version, about = "Clinic appointment book")]
struct Args {
  /// Path to a TOML config file. Missing is fine.
  #[arg(short, long, value_name = "FILE", default_value = "ward.toml")]
  config: PathBuf,

  /// Directory holding the data files (overrides the config file).
  #[arg(long, value_name = "DIR")]
  data_dir: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Settings read from the config file and `WARD_*` environment variables.
#[derive(Deserialize, Debug)]
struct Settings {
  data_dir: PathBuf,
}

impl Settings {
  fn load(path: &Path) -> Result<Self> {
    config::Config::builder()
      .set_default("data_dir", "./data")?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("WARD"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let settings = Settings::load(&args.config)?;
  let data_dir = expand_tilde(args.data_dir.as_deref().unwrap_or(&settings.data_dir));

  let store = FlatStore::open(&data_dir)
    .await
    .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
  let loaded = store.load().await.context("failed to load data")?;
  let (mut scheduler, rejected) = Scheduler::restore(loaded.snapshot);
  for issue in loaded.issues.iter().chain(&rejected) {
    eprintln!("warning: skipped {issue}");
  }

  let subject = args.command.subject();
  let request = args.command.into_request()?;
  let mutates = request.mutates();
  let response = scheduler.handle(request)?;

  if mutates {
    store
      .save(&scheduler.snapshot())
      .await
      .context("failed to save data")?;
  }

  println!("{}", render::render(&response, subject, args.json)?);
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
