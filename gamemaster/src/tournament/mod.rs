//! Tournament records, lifecycle management and shared errors.
//!
//! A tournament starts as a draft, becomes active when one of the engines
//! lays out its bracket or ladder, and is completed once a champion is
//! decided.
//!
//! ## Example
//!
//! ```no_run
//! use gamemaster::db::MemoryRepository;
//! use gamemaster::events::NoopSink;
//! use gamemaster::tournament::{CreateTournamentInput, TournamentManager, TournamentMode};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(MemoryRepository::new()), Arc::new(NoopSink));
//!
//!     let input = CreateTournamentInput::new("Club Night", TournamentMode::DoubleElim);
//!     let tournament = manager.create_tournament(input).await?;
//!     println!("Created tournament: {}", tournament.id);
//!
//!     Ok(())
//! }
//! ```

pub(crate) mod checks;
pub mod errors;
pub mod manager;
pub mod models;

pub use checks::has_any_results;
pub use errors::{TournamentError, TournamentResult};
pub use manager::{CreateTournamentInput, TournamentManager};
pub use models::{
    Advance, Bracket, BracketSide, DoubleBracket, LadderType, Layout, Match, MatchId, MatchStatus,
    Side, Slot, Tournament, TournamentId, TournamentMode, TournamentSettings, TournamentStatus,
};
