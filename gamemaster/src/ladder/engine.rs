//! Ladder tournament commands.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::standings::{LadderStanding, best_time, compute_standings, score_history};
use crate::db::Repository;
use crate::events::{EngineEvent, EventSink};
use crate::participant::ParticipantId;
use crate::tournament::checks::{ensure_mode, ensure_status, load_tournament};
use crate::tournament::{
    LadderType, Layout, Match, Tournament, TournamentError, TournamentId, TournamentMode,
    TournamentResult, TournamentStatus,
};

/// Result of submitting a ladder score
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// The record was stored
    Recorded(Match),
    /// Time ladder submission that did not beat the current best; nothing stored
    NotImproved { current_best: i64 },
}

impl ScoreOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, ScoreOutcome::Recorded(_))
    }
}

/// Direction to move a participant within a tie group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward rank 1
    Up,
    Down,
}

/// Runs ladder tournaments
pub struct LadderEngine {
    repo: Arc<dyn Repository>,
    events: Arc<dyn EventSink>,
}

impl LadderEngine {
    pub fn new(repo: Arc<dyn Repository>, events: Arc<dyn EventSink>) -> Self {
        Self { repo, events }
    }

    /// Activate a draft ladder; the tie-break order starts as entry order
    pub async fn start(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::Ladder)?;
        ensure_status(&tournament, TournamentStatus::Draft)?;

        tournament.layout = Some(Layout::LadderOrder(tournament.participant_ids.clone()));
        tournament.status = TournamentStatus::Active;
        tournament.now_playing = None;
        tournament.touch(Utc::now());
        self.repo.save_tournament(&tournament).await?;

        log::info!(
            "Started ladder tournament {} with {} participants",
            tournament_id,
            tournament.participant_ids.len()
        );
        self.events.emit(EngineEvent::TournamentStarted {
            tournament_id,
            mode: TournamentMode::Ladder,
            participants: tournament.participant_ids.len(),
        });
        Ok(tournament)
    }

    /// Submit a score or time
    ///
    /// `ladder_type` overrides the tournament's own scoring type when given.
    pub async fn report_score(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        value: i64,
        ladder_type: Option<LadderType>,
    ) -> TournamentResult<ScoreOutcome> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::Ladder)?;
        ensure_status(&tournament, TournamentStatus::Active)?;
        if !tournament.has_participant(participant_id) {
            return Err(TournamentError::ParticipantNotEntered {
                participant_id,
                tournament_id,
            });
        }

        let ladder_type = ladder_type.unwrap_or(tournament.ladder_type());
        if ladder_type == LadderType::Time {
            let records = self.repo.get_matches_for_tournament(tournament_id).await?;
            if let Some(current_best) = best_time(&records, participant_id)
                && value >= current_best
            {
                log::debug!(
                    "Time {} for {} does not beat best {}",
                    value,
                    participant_id,
                    current_best
                );
                return Ok(ScoreOutcome::NotImproved { current_best });
            }
        }

        let now = Utc::now();
        let record = Match::score_record(tournament_id, participant_id, value, now);
        self.repo.save_match(&record).await?;
        tournament.touch(now);
        self.repo.save_tournament(&tournament).await?;

        self.events.emit(EngineEvent::LadderScoreRecorded {
            tournament_id,
            participant_id,
            value,
        });
        Ok(ScoreOutcome::Recorded(record))
    }

    /// Current ranking
    pub async fn standings(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<LadderStanding>> {
        let tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::Ladder)?;
        self.standings_for(&tournament).await
    }

    async fn standings_for(
        &self,
        tournament: &Tournament,
    ) -> TournamentResult<Vec<LadderStanding>> {
        let records = self.repo.get_matches_for_tournament(tournament.id).await?;
        Ok(compute_standings(
            &tournament.participant_ids,
            &records,
            tournament.ladder_order().unwrap_or_default(),
            tournament.ladder_type(),
        ))
    }

    /// Records of one participant, newest first
    pub async fn history(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> TournamentResult<Vec<Match>> {
        let tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::Ladder)?;
        let records = self.repo.get_matches_for_tournament(tournament_id).await?;
        Ok(score_history(&records, participant_id))
    }

    /// Swap a participant with the tied neighbour in `direction`
    ///
    /// Returns `None` without writing anything when the participant has no
    /// score or no equally scored neighbour on that side.
    pub async fn reorder_tie_group(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        direction: Direction,
    ) -> TournamentResult<Option<Tournament>> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::Ladder)?;
        ensure_status(&tournament, TournamentStatus::Active)?;
        if !tournament.has_participant(participant_id) {
            return Err(TournamentError::ParticipantNotEntered {
                participant_id,
                tournament_id,
            });
        }

        let standings = self.standings_for(&tournament).await?;
        let Some(idx) = standings
            .iter()
            .position(|s| s.participant_id == participant_id)
        else {
            return Ok(None);
        };
        let Some(score) = standings[idx].score else {
            return Ok(None);
        };

        let neighbour = match direction {
            Direction::Up => idx.checked_sub(1),
            Direction::Down => Some(idx + 1),
        };
        let Some(neighbour) = neighbour
            .filter(|&n| standings.get(n).is_some_and(|s| s.score == Some(score)))
        else {
            return Ok(None);
        };

        let mut order: Vec<ParticipantId> = standings.iter().map(|s| s.participant_id).collect();
        order.swap(idx, neighbour);

        tournament.layout = Some(Layout::LadderOrder(order.clone()));
        tournament.touch(Utc::now());
        self.repo.save_tournament(&tournament).await?;

        log::debug!("Tie order changed in tournament {}", tournament_id);
        self.events.emit(EngineEvent::TieOrderChanged {
            tournament_id,
            order,
        });
        Ok(Some(tournament))
    }
}
