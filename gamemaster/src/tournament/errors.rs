//! Tournament error types.

use thiserror::Error;

use super::models::{MatchId, TournamentId, TournamentMode, TournamentStatus};
use crate::db::StorageError;
use crate::participant::ParticipantId;

/// Errors returned by tournament commands
///
/// Every variant except `Storage` is a precondition failure: it is raised
/// before anything is written, so the stored state is unchanged.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("Match {match_id} does not belong to tournament {tournament_id}")]
    MatchNotInTournament {
        match_id: MatchId,
        tournament_id: TournamentId,
    },

    #[error("Participant {participant_id} is not entered in tournament {tournament_id}")]
    ParticipantNotEntered {
        participant_id: ParticipantId,
        tournament_id: TournamentId,
    },

    #[error("Tournament not in correct state: expected {expected}, got {actual}")]
    InvalidState {
        expected: TournamentStatus,
        actual: TournamentStatus,
    },

    #[error("Wrong tournament mode: expected {expected}, got {actual}")]
    WrongMode {
        expected: TournamentMode,
        actual: TournamentMode,
    },

    #[error("Tournament {0} has no layout for its mode")]
    MissingLayout(TournamentId),

    #[error("Insufficient participants: need {needed}, have {current}")]
    InsufficientParticipants { needed: usize, current: usize },

    #[error("Draws are not allowed")]
    DrawNotAllowed,

    #[error("Match already completed: {0}")]
    MatchAlreadyCompleted(MatchId),

    #[error("Match not ready (missing participant): {0}")]
    MatchNotReady(MatchId),

    #[error("Cannot regenerate bracket with existing results")]
    ResultsExist,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TournamentError {
    /// Message safe to show to an organizer
    ///
    /// Storage errors are collapsed so that connection strings and SQL
    /// details never reach the caller's UI.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Storage(_) => "Internal storage error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the caller may retry with corrected input
    pub fn is_precondition(&self) -> bool {
        !matches!(self, TournamentError::Storage(_))
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
