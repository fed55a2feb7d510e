//! Single elimination brackets.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::arena::MatchArena;
use super::seeding::{Seeder, round_count};
use super::{emit_byes, ensure_enough_participants};
use crate::config::EngineConfig;
use crate::db::Repository;
use crate::events::{EngineEvent, EventSink};
use crate::participant::ParticipantId;
use crate::tournament::checks::{
    ensure_mode, ensure_status, has_any_results, load_reportable_match, load_tournament,
    validate_scores,
};
use crate::tournament::{
    Advance, Bracket, Layout, Match, MatchId, Side, Slot, Tournament, TournamentError,
    TournamentId, TournamentMode, TournamentResult, TournamentStatus,
};

/// Build every match of a single elimination bracket
///
/// `placements` holds one entry per round-0 slot (a power of two); `None`
/// seats a bye. Edges from each match to the next round are filled in, byes
/// are not resolved yet.
pub fn plan_single_elim(
    tournament_id: TournamentId,
    placements: &[Option<ParticipantId>],
    now: DateTime<Utc>,
) -> (Bracket, Vec<Match>) {
    let size = placements.len();
    let rounds = round_count(size);

    let mut by_round: Vec<Vec<Match>> = (0..rounds)
        .map(|round| {
            (0..size >> (round + 1))
                .map(|slot| Match::new(tournament_id, round as u32, slot as u32, None, now))
                .collect()
        })
        .collect();

    if let Some(first) = by_round.first_mut() {
        for (slot, m) in first.iter_mut().enumerate() {
            m.a = Slot::from(placements[2 * slot]);
            m.b = Slot::from(placements[2 * slot + 1]);
        }
    }

    for round in 1..rounds {
        let next_ids: Vec<MatchId> = by_round[round].iter().map(|m| m.id).collect();
        for (slot, m) in by_round[round - 1].iter_mut().enumerate() {
            m.winner_to = Some(Advance::new(next_ids[slot / 2], Side::from_parity(slot)));
        }
    }

    let bracket = Bracket {
        size,
        matches_by_round: by_round
            .iter()
            .map(|round| round.iter().map(|m| m.id).collect())
            .collect(),
    };
    (bracket, by_round.into_iter().flatten().collect())
}

/// Runs single elimination tournaments
pub struct SingleElimEngine {
    repo: Arc<dyn Repository>,
    config: EngineConfig,
    events: Arc<dyn EventSink>,
}

impl SingleElimEngine {
    pub fn new(
        repo: Arc<dyn Repository>,
        config: EngineConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            repo,
            config,
            events,
        }
    }

    /// Seed the bracket and activate a draft tournament
    pub async fn start(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::SingleElim)?;
        ensure_status(&tournament, TournamentStatus::Draft)?;
        self.launch(tournament).await
    }

    async fn launch(&self, mut tournament: Tournament) -> TournamentResult<Tournament> {
        ensure_enough_participants(&tournament, &self.config)?;

        let now = Utc::now();
        let placements = Seeder::new(self.config.seeding).place(&tournament.participant_ids);
        let (bracket, matches) = plan_single_elim(tournament.id, &placements, now);

        let mut arena = MatchArena::fresh(matches, now);
        arena.resolve_byes();

        tournament.now_playing = arena.first_playable(&bracket.match_ids());
        tournament.layout = Some(Layout::Bracket(bracket));
        tournament.status = TournamentStatus::Active;
        tournament.touch(now);

        self.repo.save_matches(&arena.take_dirty()).await?;
        self.repo.save_tournament(&tournament).await?;

        log::info!(
            "Started single elimination tournament {} with {} participants ({} matches)",
            tournament.id,
            tournament.participant_ids.len(),
            arena.len()
        );
        self.events.emit(EngineEvent::TournamentStarted {
            tournament_id: tournament.id,
            mode: TournamentMode::SingleElim,
            participants: tournament.participant_ids.len(),
        });
        emit_byes(self.events.as_ref(), tournament.id, arena.take_resolved_byes());

        Ok(tournament)
    }

    /// Record a match result and advance the winner
    pub async fn report(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
    ) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::SingleElim)?;
        ensure_status(&tournament, TournamentStatus::Active)?;
        validate_scores(score_a, score_b)?;
        let bracket = tournament
            .bracket()
            .cloned()
            .ok_or(TournamentError::MissingLayout(tournament_id))?;
        load_reportable_match(self.repo.as_ref(), &tournament, match_id).await?;

        let now = Utc::now();
        let matches = self.repo.get_matches_for_tournament(tournament_id).await?;
        let mut arena = MatchArena::new(matches, now);
        arena.complete(match_id, score_a, score_b);

        tournament.now_playing = arena.first_playable(&bracket.match_ids());
        tournament.touch(now);

        let champion = bracket
            .final_match_id()
            .and_then(|id| arena.get(id))
            .filter(|m| m.is_completed())
            .map(|m| m.winner_id);
        if champion.is_some() {
            tournament.status = TournamentStatus::Completed;
        }

        self.repo.save_matches(&arena.take_dirty()).await?;
        self.repo.save_tournament(&tournament).await?;

        if let Some(m) = arena.get(match_id)
            && let (Some(winner_id), Some(loser_id)) = (m.winner_id, m.loser_id)
        {
            log::debug!("Match {} won by {}", match_id, winner_id);
            self.events.emit(EngineEvent::MatchCompleted {
                tournament_id,
                match_id,
                winner_id,
                loser_id,
            });
        }
        emit_byes(self.events.as_ref(), tournament_id, arena.take_resolved_byes());

        if let Some(champion_id) = champion {
            log::info!("Tournament {} completed", tournament_id);
            self.events.emit(EngineEvent::TournamentCompleted {
                tournament_id,
                champion_id,
            });
        }

        Ok(tournament)
    }

    /// Throw away the bracket and seed a new one
    ///
    /// Only allowed while no match has a reported, nonzero score.
    pub async fn regenerate(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::SingleElim)?;
        ensure_status(&tournament, TournamentStatus::Active)?;

        let matches = self.repo.get_matches_for_tournament(tournament_id).await?;
        if has_any_results(&matches) {
            log::warn!("Refusing to regenerate tournament {} with results", tournament_id);
            return Err(TournamentError::ResultsExist);
        }
        ensure_enough_participants(&tournament, &self.config)?;

        for m in &matches {
            self.repo.delete_match(m.id).await?;
        }
        tournament.status = TournamentStatus::Draft;
        tournament.layout = None;
        tournament.now_playing = None;

        let tournament = self.launch(tournament).await?;
        self.events.emit(EngineEvent::BracketRegenerated { tournament_id });
        Ok(tournament)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<ParticipantId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_plan_shape_for_eight() {
        let players = ids(8);
        let placements: Vec<Option<ParticipantId>> = players.iter().copied().map(Some).collect();
        let (bracket, matches) = plan_single_elim(Uuid::new_v4(), &placements, Utc::now());

        assert_eq!(bracket.size, 8);
        assert_eq!(matches.len(), 7);
        let per_round: Vec<usize> = bracket.matches_by_round.iter().map(Vec::len).collect();
        assert_eq!(per_round, vec![4, 2, 1]);

        let final_id = bracket.final_match_id().unwrap();
        let final_match = matches.iter().find(|m| m.id == final_id).unwrap();
        assert!(final_match.winner_to.is_none());
    }

    #[test]
    fn test_plan_edges_follow_parity() {
        let placements: Vec<Option<ParticipantId>> = ids(4).into_iter().map(Some).collect();
        let (bracket, matches) = plan_single_elim(Uuid::new_v4(), &placements, Utc::now());
        let final_id = bracket.matches_by_round[1][0];

        assert_eq!(matches[0].winner_to, Some(Advance::new(final_id, Side::A)));
        assert_eq!(matches[1].winner_to, Some(Advance::new(final_id, Side::B)));
    }

    #[test]
    fn test_plan_seats_byes() {
        let players = ids(2);
        let placements = vec![Some(players[0]), None, Some(players[1]), None];
        let (_, matches) = plan_single_elim(Uuid::new_v4(), &placements, Utc::now());

        assert_eq!(matches[0].a, Slot::Occupied(players[0]));
        assert_eq!(matches[0].b, Slot::Bye);
        assert_eq!(matches[2].a, Slot::Empty);
    }
}
