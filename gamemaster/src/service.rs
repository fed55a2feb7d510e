//! Command surface over every engine.

use std::sync::Arc;

use crate::bracket::{DoubleElimEngine, SingleElimEngine};
use crate::config::EngineConfig;
use crate::db::Repository;
use crate::events::{EventSink, NoopSink};
use crate::ladder::{Direction, LadderEngine, LadderStanding, ScoreOutcome};
use crate::participant::{ParticipantId, ParticipantManager};
use crate::results::{self, Podium};
use crate::tournament::checks::load_tournament;
use crate::tournament::{
    LadderType, Match, MatchId, Tournament, TournamentError, TournamentId, TournamentManager,
    TournamentMode, TournamentResult, TournamentStatus,
};

/// Entry point for organizer commands
///
/// Holds one instance of each engine over a shared repository and event
/// sink. Commands for one tournament are expected to be issued one at a time.
pub struct GameMaster {
    repo: Arc<dyn Repository>,
    single_elim: SingleElimEngine,
    double_elim: DoubleElimEngine,
    ladder: LadderEngine,
    tournaments: TournamentManager,
    participants: ParticipantManager,
}

impl GameMaster {
    /// Create a game master that discards events
    pub fn new(repo: Arc<dyn Repository>, config: EngineConfig) -> Self {
        Self::with_events(repo, config, Arc::new(NoopSink))
    }

    /// Create a game master publishing events to `events`
    pub fn with_events(
        repo: Arc<dyn Repository>,
        config: EngineConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            single_elim: SingleElimEngine::new(repo.clone(), config.clone(), events.clone()),
            double_elim: DoubleElimEngine::new(repo.clone(), config, events.clone()),
            ladder: LadderEngine::new(repo.clone(), events.clone()),
            tournaments: TournamentManager::new(repo.clone(), events),
            participants: ParticipantManager::new(repo.clone()),
            repo,
        }
    }

    pub fn tournaments(&self) -> &TournamentManager {
        &self.tournaments
    }

    pub fn participants(&self) -> &ParticipantManager {
        &self.participants
    }

    pub async fn start_single_elim_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.single_elim.start(tournament_id).await
    }

    pub async fn start_double_elim_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.double_elim.start(tournament_id).await
    }

    pub async fn start_ladder_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.ladder.start(tournament_id).await
    }

    /// Start a draft tournament with the engine for its mode
    pub async fn start_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        match self.mode_of(tournament_id).await? {
            TournamentMode::SingleElim => self.start_single_elim_tournament(tournament_id).await,
            TournamentMode::DoubleElim => self.start_double_elim_tournament(tournament_id).await,
            TournamentMode::Ladder => self.start_ladder_tournament(tournament_id).await,
        }
    }

    pub async fn report_bracket_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
    ) -> TournamentResult<Tournament> {
        self.single_elim
            .report(tournament_id, match_id, score_a, score_b)
            .await
    }

    pub async fn report_double_elim_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
    ) -> TournamentResult<Tournament> {
        self.double_elim
            .report(tournament_id, match_id, score_a, score_b)
            .await
    }

    /// Report a head-to-head result with the engine for the tournament's mode
    pub async fn report_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
    ) -> TournamentResult<Tournament> {
        match self.mode_of(tournament_id).await? {
            TournamentMode::SingleElim => {
                self.report_bracket_match(tournament_id, match_id, score_a, score_b)
                    .await
            }
            TournamentMode::DoubleElim => {
                self.report_double_elim_match(tournament_id, match_id, score_a, score_b)
                    .await
            }
            TournamentMode::Ladder => Err(TournamentError::WrongMode {
                expected: TournamentMode::SingleElim,
                actual: TournamentMode::Ladder,
            }),
        }
    }

    pub async fn report_ladder_score(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        value: i64,
        ladder_type: Option<LadderType>,
    ) -> TournamentResult<ScoreOutcome> {
        self.ladder
            .report_score(tournament_id, participant_id, value, ladder_type)
            .await
    }

    pub async fn regenerate_bracket(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.single_elim.regenerate(tournament_id).await
    }

    pub async fn regenerate_double_elim_bracket(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.double_elim.regenerate(tournament_id).await
    }

    /// Standings of a ladder tournament from its stored records
    ///
    /// Loads the entrants, records and ladder order and hands them to
    /// [`crate::ladder::compute_standings`], which callers holding their own
    /// records can use directly.
    pub async fn compute_ladder_standings(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<LadderStanding>> {
        self.ladder.standings(tournament_id).await
    }

    pub async fn reorder_tie_group(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        direction: Direction,
    ) -> TournamentResult<Option<Tournament>> {
        self.ladder
            .reorder_tie_group(tournament_id, participant_id, direction)
            .await
    }

    /// Ladder records of one participant, newest first
    pub async fn ladder_history(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> TournamentResult<Vec<Match>> {
        self.ladder.history(tournament_id, participant_id).await
    }

    /// Every match of a tournament in creation order
    pub async fn matches(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Match>> {
        load_tournament(self.repo.as_ref(), tournament_id).await?;
        Ok(self.repo.get_matches_for_tournament(tournament_id).await?)
    }

    pub async fn podium(&self, tournament_id: TournamentId) -> TournamentResult<Podium> {
        let tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        let matches = self.repo.get_matches_for_tournament(tournament_id).await?;
        Ok(results::podium(&tournament, &matches))
    }

    /// Winner of a completed tournament
    pub async fn champion(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Option<ParticipantId>> {
        let tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        if tournament.status != TournamentStatus::Completed {
            return Ok(None);
        }
        let matches = self.repo.get_matches_for_tournament(tournament_id).await?;
        Ok(results::podium(&tournament, &matches).first)
    }

    async fn mode_of(&self, tournament_id: TournamentId) -> TournamentResult<TournamentMode> {
        Ok(load_tournament(self.repo.as_ref(), tournament_id).await?.mode)
    }
}
