//! Tournament simulator for the gamemaster engine.
//!
//! Generates participants, runs a tournament from start to champion with
//! random results and prints the outcome, using either the in-memory store
//! or PostgreSQL.

mod config;
mod simulate;

use std::sync::Arc;

use anyhow::{Context, Error};
use gamemaster::db::{Database, MemoryRepository, Repository};
use log::info;
use pico_args::Arguments;

use config::{CliConfig, Overrides};

const HELP: &str = "\
Simulate a tournament with the gamemaster engine

USAGE:
  gamemaster simulate [OPTIONS]

OPTIONS:
  --mode           MODE    single, double or ladder      [default: env SIM_MODE or single]
  --participants   N       Number of entrants            [default: env SIM_PARTICIPANTS or 8]
  --seed           N       Seed for placement and scores [default: env GAMEMASTER_SEED or random]
  --ladder-type    TYPE    points or time                [default: env SIM_LADDER_TYPE or points]
  --ladder-rounds  N       Submissions per entrant       [default: env SIM_LADDER_ROUNDS or 3]
  --db-url         URL     Store in PostgreSQL           [default: env DATABASE_URL or in-memory]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  RUST_LOG                 Log filter (e.g. debug)
  GAMEMASTER_SEEDING       random, ordered or seeded:<u64>
  GAMEMASTER_MIN_PARTICIPANTS  Minimum bracket size
  (A .env file in the working directory is loaded first)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    match pargs.subcommand()?.as_deref() {
        Some("simulate") => {}
        Some(other) => anyhow::bail!("Unknown command '{other}', try --help"),
        None => {
            print!("{HELP}");
            std::process::exit(2);
        }
    }

    let overrides = Overrides {
        mode: pargs.opt_value_from_str("--mode")?,
        participants: pargs.opt_value_from_str("--participants")?,
        seed: pargs.opt_value_from_str("--seed")?,
        ladder_type: pargs.opt_value_from_str("--ladder-type")?,
        ladder_rounds: pargs.opt_value_from_str("--ladder-rounds")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}");
    }

    env_logger::builder().format_target(false).init();

    let config = CliConfig::from_env(overrides).context("Invalid configuration")?;
    info!(
        "Simulating {} tournament with {} participants",
        config.mode, config.participants
    );

    let (repo, db): (Arc<dyn Repository>, Option<Database>) = match &config.database {
        Some(db_config) => {
            let db = Database::new(db_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.ensure_schema()
                .await
                .context("Failed to create database schema")?;
            info!("Database connected successfully");
            (Arc::new(db.repository()), Some(db))
        }
        None => (Arc::new(MemoryRepository::new()), None),
    };

    let summary = simulate::run(&config, repo).await?;
    simulate::print_summary(&summary);

    if let Some(db) = db {
        db.close().await;
    }
    Ok(())
}
