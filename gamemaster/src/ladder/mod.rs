//! Score ladders.
//!
//! A ladder has no head-to-head matches. Each submission is stored as a
//! single-sided score record and standings are derived from those records:
//! in points ladders the latest submission counts, in time ladders the best
//! (lowest) one does and slower submissions are not stored at all.

pub mod engine;
pub mod standings;

pub use engine::{Direction, LadderEngine, ScoreOutcome};
pub use standings::{LadderStanding, best_time, compute_standings, current_scores, score_history};
