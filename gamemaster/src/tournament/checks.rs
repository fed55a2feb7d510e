//! Precondition checks shared by the engines and the manager.

use super::errors::{TournamentError, TournamentResult};
use super::models::{Match, MatchId, Tournament, TournamentId, TournamentMode, TournamentStatus};
use crate::db::Repository;

pub(crate) async fn load_tournament(
    repo: &dyn Repository,
    id: TournamentId,
) -> TournamentResult<Tournament> {
    repo.get_tournament(id)
        .await?
        .ok_or(TournamentError::NotFound(id))
}

pub(crate) fn ensure_status(
    tournament: &Tournament,
    expected: TournamentStatus,
) -> TournamentResult<()> {
    if tournament.status != expected {
        return Err(TournamentError::InvalidState {
            expected,
            actual: tournament.status,
        });
    }
    Ok(())
}

pub(crate) fn ensure_mode(
    tournament: &Tournament,
    expected: TournamentMode,
) -> TournamentResult<()> {
    if tournament.mode != expected {
        return Err(TournamentError::WrongMode {
            expected,
            actual: tournament.mode,
        });
    }
    Ok(())
}

/// Reject draws
pub(crate) fn validate_scores(score_a: i64, score_b: i64) -> TournamentResult<()> {
    if score_a == score_b {
        return Err(TournamentError::DrawNotAllowed);
    }
    Ok(())
}

/// Load a match and check that a result can be recorded for it
pub(crate) async fn load_reportable_match(
    repo: &dyn Repository,
    tournament: &Tournament,
    match_id: MatchId,
) -> TournamentResult<Match> {
    let m = repo
        .get_match(match_id)
        .await?
        .ok_or(TournamentError::MatchNotFound(match_id))?;

    if m.tournament_id != tournament.id {
        return Err(TournamentError::MatchNotInTournament {
            match_id,
            tournament_id: tournament.id,
        });
    }
    if m.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(match_id));
    }
    if !m.a.is_occupied() || !m.b.is_occupied() {
        return Err(TournamentError::MatchNotReady(match_id));
    }
    Ok(m)
}

/// Whether any head-to-head match has a reported, nonzero score
pub fn has_any_results(matches: &[Match]) -> bool {
    matches.iter().any(Match::has_real_result)
}
