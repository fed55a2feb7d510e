//! Elimination brackets.
//!
//! Brackets are planned in memory: every match is created up front with the
//! edges its winner (and, in double elimination, its loser) follows. Results
//! are applied through a [`MatchArena`], which resolves byes and advances
//! participants through a placement queue.
//!
//! ## Example
//!
//! ```no_run
//! use gamemaster::bracket::SingleElimEngine;
//! use gamemaster::config::EngineConfig;
//! use gamemaster::db::MemoryRepository;
//! use gamemaster::events::NoopSink;
//! use std::sync::Arc;
//!
//! # async fn run(tournament_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SingleElimEngine::new(
//!     Arc::new(MemoryRepository::new()),
//!     EngineConfig::default(),
//!     Arc::new(NoopSink),
//! );
//! let tournament = engine.start(tournament_id).await?;
//! if let Some(match_id) = tournament.now_playing {
//!     engine.report(tournament_id, match_id, 21, 15).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod arena;
pub mod double_elim;
pub mod seeding;
pub mod single_elim;

pub use arena::{MatchArena, ResolvedBye};
pub use double_elim::{DoubleElimEngine, losers_round_sizes, plan_double_elim};
pub use seeding::{Seeder, bracket_seeding, next_power_of_two, round_count, slot_order};
pub use single_elim::{SingleElimEngine, plan_single_elim};

use crate::config::EngineConfig;
use crate::events::{EngineEvent, EventSink};
use crate::tournament::{Tournament, TournamentError, TournamentId, TournamentResult};

fn ensure_enough_participants(
    tournament: &Tournament,
    config: &EngineConfig,
) -> TournamentResult<()> {
    let current = tournament.participant_ids.len();
    if current < config.min_participants {
        log::warn!(
            "Tournament {} cannot start with {} participants",
            tournament.id,
            current
        );
        return Err(TournamentError::InsufficientParticipants {
            needed: config.min_participants,
            current,
        });
    }
    Ok(())
}

fn emit_byes(events: &dyn EventSink, tournament_id: TournamentId, byes: Vec<ResolvedBye>) {
    for bye in byes {
        events.emit(EngineEvent::ByeResolved {
            tournament_id,
            match_id: bye.match_id,
            winner_id: bye.winner_id,
        });
    }
}
