//! # Gamemaster
//!
//! A tournament progression engine: it builds elimination brackets or score
//! ladders, records outcomes and advances participants until a champion is
//! decided.
//!
//! ## Modes
//!
//! - **Single elimination**: power-of-two bracket, byes for missing seeds
//! - **Double elimination**: winners and losers brackets, grand final and an
//!   optional bracket reset
//! - **Ladder**: points (latest submission counts) or time (best submission
//!   counts), with manual tie-break ordering
//!
//! ## Core Modules
//!
//! - [`tournament`]: tournament and match records, lifecycle management, errors
//! - [`bracket`]: seeding, bracket planning and the advancement arena
//! - [`ladder`]: score records and standings
//! - [`db`]: repository traits with in-memory and PostgreSQL backends
//! - [`events`]: engine events and sinks
//!
//! ## Example
//!
//! ```no_run
//! use gamemaster::{EngineConfig, GameMaster};
//! use gamemaster::db::MemoryRepository;
//! use gamemaster::participant::ParticipantKind;
//! use gamemaster::tournament::{CreateTournamentInput, TournamentMode};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gm = GameMaster::new(Arc::new(MemoryRepository::new()), EngineConfig::default());
//!
//!     let mut ids = Vec::new();
//!     for name in ["Ada", "Ben", "Cy", "Di", "Eve"] {
//!         let p = gm
//!             .participants()
//!             .create_participant(name, ParticipantKind::Individual, vec![])
//!             .await?;
//!         ids.push(p.id);
//!     }
//!
//!     let input = CreateTournamentInput::new("Friday Cup", TournamentMode::SingleElim)
//!         .with_participants(ids);
//!     let tournament = gm.tournaments().create_tournament(input).await?;
//!     let tournament = gm.start_tournament(tournament.id).await?;
//!
//!     if let Some(match_id) = tournament.now_playing {
//!         gm.report_match(tournament.id, match_id, 3, 1).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod bracket;
pub mod config;
pub mod db;
pub mod events;
pub mod ladder;
pub mod participant;
pub mod results;
pub mod service;
pub mod tournament;

pub use config::{ConfigError, EngineConfig, SeedingMode};
pub use events::{ChannelSink, EngineEvent, EventSink, NoopSink, RecordingSink};
pub use results::Podium;
pub use service::GameMaster;
pub use tournament::{TournamentError, TournamentResult};
