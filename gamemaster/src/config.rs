//! Engine configuration.
//!
//! Consolidates the environment variables that influence bracket building.

use std::str::FromStr;

/// How participants are assigned to seeds when a bracket is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedingMode {
    /// Fresh random shuffle on every start
    #[default]
    Random,
    /// Shuffle from a fixed seed, reproducible across runs
    Seeded(u64),
    /// Entry order is seed order
    Ordered,
}

impl FromStr for SeedingMode {
    type Err = ConfigError;

    /// Parses `random`, `ordered` or `seeded:<u64>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "random" => Ok(SeedingMode::Random),
            "ordered" => Ok(SeedingMode::Ordered),
            other => other
                .strip_prefix("seeded:")
                .and_then(|seed| seed.parse().ok())
                .map(SeedingMode::Seeded)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "GAMEMASTER_SEEDING".to_string(),
                    reason: format!("unknown seeding mode '{s}'"),
                }),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed assignment for bracket modes
    pub seeding: SeedingMode,
    /// Minimum entrants required to start a bracket
    pub min_participants: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seeding: SeedingMode::Random,
            min_participants: 2,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// - `GAMEMASTER_SEEDING`: `random` (default), `ordered` or `seeded:<u64>`
    /// - `GAMEMASTER_SEED`: shorthand for `seeded:<u64>`, wins over `GAMEMASTER_SEEDING`
    /// - `GAMEMASTER_MIN_PARTICIPANTS`: default 2
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for unparsable seeding values or a
    /// minimum below 2.
    pub fn from_env() -> Result<Self, ConfigError> {
        let seeding = match std::env::var("GAMEMASTER_SEED") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(SeedingMode::Seeded)
                .map_err(|_| ConfigError::Invalid {
                    var: "GAMEMASTER_SEED".to_string(),
                    reason: format!("'{raw}' is not a u64"),
                })?,
            Err(_) => match std::env::var("GAMEMASTER_SEEDING") {
                Ok(raw) => raw.parse()?,
                Err(_) => SeedingMode::default(),
            },
        };

        let config = Self {
            seeding,
            min_participants: parse_env_or("GAMEMASTER_MIN_PARTICIPANTS", 2),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fixed-seed configuration, handy for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeding: SeedingMode::Seeded(seed),
            ..Self::default()
        }
    }

    /// Configuration that seeds participants in entry order
    pub fn ordered() -> Self {
        Self {
            seeding: SeedingMode::Ordered,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_participants < 2 {
            return Err(ConfigError::Invalid {
                var: "GAMEMASTER_MIN_PARTICIPANTS".to_string(),
                reason: "Must be at least 2".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, falling back to `default` when unset or invalid
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
