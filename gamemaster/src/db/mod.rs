//! Storage layer: repository traits, an in-memory store and PostgreSQL.
//!
//! The PostgreSQL backend keeps one JSONB document per record. Matches carry
//! a `seq` column so that `get_matches_for_tournament` returns them in the
//! order they were first written.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod repository;

pub use config::DatabaseConfig;
pub use errors::{StorageError, StorageResult};
pub use memory::MemoryRepository;
pub use repository::{
    MatchRepository, ParticipantRepository, PgRepository, Repository, TournamentRepository,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS gm_tournaments (
        id UUID PRIMARY KEY,
        updated_at TIMESTAMPTZ NOT NULL,
        doc JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS gm_matches (
        seq BIGSERIAL,
        id UUID PRIMARY KEY,
        tournament_id UUID NOT NULL,
        doc JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS gm_matches_tournament_idx ON gm_matches (tournament_id, seq)",
    "CREATE TABLE IF NOT EXISTS gm_participants (
        id UUID PRIMARY KEY,
        doc JSONB NOT NULL
    )",
];

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamemaster::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let db = Database::new(&DatabaseConfig::development()).await?;
    ///     db.ensure_schema().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.database_url)
            .await?;

        log::info!(
            "Connected to database (max {} connections)",
            config.max_connections
        );
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Repository over this pool
    pub fn repository(&self) -> PgRepository {
        PgRepository::new(self.pool.clone())
    }

    /// Create the tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        log::debug!("Database schema ready");
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
