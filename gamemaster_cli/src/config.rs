//! Simulator configuration management.
//!
//! Consolidates all environment variable reads and command-line overrides
//! into one validated configuration.

use gamemaster::config::{ConfigError, parse_env_or};
use gamemaster::db::DatabaseConfig;
use gamemaster::tournament::{LadderType, TournamentMode};
use gamemaster::{EngineConfig, SeedingMode};

/// Largest generated field the simulator accepts
pub const MAX_PARTICIPANTS: usize = 1024;

/// Values given on the command line; `None` falls back to the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<String>,
    pub participants: Option<usize>,
    pub seed: Option<u64>,
    pub ladder_type: Option<String>,
    pub ladder_rounds: Option<usize>,
    pub database_url: Option<String>,
}

/// Complete simulator configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Tournament mode to simulate
    pub mode: TournamentMode,
    /// Number of generated participants
    pub participants: usize,
    /// Scoring type for ladder runs
    pub ladder_type: LadderType,
    /// Score submissions per participant in ladder runs
    pub ladder_rounds: usize,
    /// Seed for participant placement and generated scores
    pub seed: Option<u64>,
    pub engine: EngineConfig,
    /// PostgreSQL storage; in-memory when absent
    pub database: Option<DatabaseConfig>,
}

impl CliConfig {
    /// Load configuration from environment variables, then apply overrides
    ///
    /// - `SIM_MODE`: `single`, `double` or `ladder` (default `single`)
    /// - `SIM_PARTICIPANTS`: default 8
    /// - `SIM_LADDER_TYPE`: `points` or `time` (default `points`)
    /// - `SIM_LADDER_ROUNDS`: default 3
    /// - `GAMEMASTER_SEED` / `GAMEMASTER_SEEDING` / `GAMEMASTER_MIN_PARTICIPANTS`
    /// - `DATABASE_URL`: use PostgreSQL instead of memory (pool sizing as in
    ///   [`DatabaseConfig::with_url`])
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed or fails validation
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let mode = match overrides.mode.or_else(|| std::env::var("SIM_MODE").ok()) {
            Some(raw) => parse_mode(&raw)?,
            None => TournamentMode::SingleElim,
        };

        let ladder_type = match overrides
            .ladder_type
            .or_else(|| std::env::var("SIM_LADDER_TYPE").ok())
        {
            Some(raw) => parse_ladder_type(&raw)?,
            None => LadderType::Points,
        };

        let mut engine = EngineConfig::from_env()?;
        if let Some(seed) = overrides.seed {
            engine.seeding = SeedingMode::Seeded(seed);
        }
        let seed = match engine.seeding {
            SeedingMode::Seeded(seed) => Some(seed),
            _ => None,
        };

        let database = overrides
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .map(DatabaseConfig::with_url);

        let config = Self {
            mode,
            participants: overrides
                .participants
                .unwrap_or_else(|| parse_env_or("SIM_PARTICIPANTS", 8)),
            ladder_type,
            ladder_rounds: overrides
                .ladder_rounds
                .unwrap_or_else(|| parse_env_or("SIM_LADDER_ROUNDS", 3)),
            seed,
            engine,
            database,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        if self.mode != TournamentMode::Ladder && self.participants < self.engine.min_participants
        {
            return Err(ConfigError::Invalid {
                var: "SIM_PARTICIPANTS".to_string(),
                reason: format!(
                    "Brackets need at least {} participants",
                    self.engine.min_participants
                ),
            });
        }

        if self.participants > MAX_PARTICIPANTS {
            return Err(ConfigError::Invalid {
                var: "SIM_PARTICIPANTS".to_string(),
                reason: format!("Must be at most {MAX_PARTICIPANTS}"),
            });
        }

        if self.mode == TournamentMode::Ladder && self.ladder_rounds == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_LADDER_ROUNDS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let Some(database) = &self.database {
            database.validate()?;
        }
        Ok(())
    }
}

/// Parse a tournament mode name
pub fn parse_mode(raw: &str) -> Result<TournamentMode, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "single" | "single_elim" | "single-elim" => Ok(TournamentMode::SingleElim),
        "double" | "double_elim" | "double-elim" => Ok(TournamentMode::DoubleElim),
        "ladder" => Ok(TournamentMode::Ladder),
        _ => Err(ConfigError::Invalid {
            var: "SIM_MODE".to_string(),
            reason: format!("unknown mode '{raw}' (expected single, double or ladder)"),
        }),
    }
}

/// Parse a ladder scoring type name
pub fn parse_ladder_type(raw: &str) -> Result<LadderType, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "points" => Ok(LadderType::Points),
        "time" => Ok(LadderType::Time),
        _ => Err(ConfigError::Invalid {
            var: "SIM_LADDER_TYPE".to_string(),
            reason: format!("unknown ladder type '{raw}' (expected points or time)"),
        }),
    }
}
