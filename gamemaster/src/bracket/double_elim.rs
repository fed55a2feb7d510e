//! Double elimination brackets.
//!
//! Losers of the winners bracket drop into the losers bracket, which
//! alternates between two kinds of rounds:
//!
//! - odd rounds integrate the next wave of winners-bracket losers (side A)
//!   against the survivors of the previous losers round (side B);
//! - even rounds halve the field, pairing survivors by slot parity.
//!
//! The winners champion meets the losers champion in the grand final. If the
//! losers champion wins, a second "reset" final is played.

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
    Advance, BracketSide, DoubleBracket, Layout, Match, MatchId, Side, Slot, Tournament,
    TournamentError, TournamentId, TournamentMode, TournamentResult, TournamentStatus,
};

/// Number of matches in each losers round for a bracket of `size`
///
/// Empty when the winners bracket has a single round.
pub fn losers_round_sizes(size: usize) -> Vec<usize> {
    let winners_rounds = round_count(size);
    if winners_rounds < 2 {
        return Vec::new();
    }

    let mut sizes = vec![size / 4];
    for round in 1..2 * (winners_rounds - 1) {
        let previous = sizes[round - 1];
        sizes.push(if round % 2 == 1 {
            previous
        } else {
            (previous / 2).max(1)
        });
    }
    sizes
}

fn build_rounds(
    tournament_id: TournamentId,
    sizes: &[usize],
    side: BracketSide,
    now: DateTime<Utc>,
) -> Vec<Vec<Match>> {
    sizes
        .iter()
        .enumerate()
        .map(|(round, &count)| {
            (0..count)
                .map(|slot| Match::new(tournament_id, round as u32, slot as u32, Some(side), now))
                .collect()
        })
        .collect()
}

fn ids_of(rounds: &[Vec<Match>]) -> Vec<Vec<MatchId>> {
    rounds
        .iter()
        .map(|round| round.iter().map(|m| m.id).collect())
        .collect()
}

/// Build every match of a double elimination bracket
///
/// `placements` holds one entry per winners round-0 slot; `None` seats a
/// bye. Winner and loser edges are computed here, byes are not resolved yet.
pub fn plan_double_elim(
    tournament_id: TournamentId,
    placements: &[Option<ParticipantId>],
    now: DateTime<Utc>,
) -> (DoubleBracket, Vec<Match>) {
    let size = placements.len();
    let winners_rounds = round_count(size);
    let winners_sizes: Vec<usize> = (0..winners_rounds).map(|r| size >> (r + 1)).collect();

    let mut winners = build_rounds(tournament_id, &winners_sizes, BracketSide::Winners, now);
    let mut losers = build_rounds(
        tournament_id,
        &losers_round_sizes(size),
        BracketSide::Losers,
        now,
    );
    let grand_final = Match::new(tournament_id, 0, 0, Some(BracketSide::GrandFinal), now);
    let reset = Match::new(tournament_id, 0, 0, Some(BracketSide::GrandFinalReset), now);

    let winner_ids = ids_of(&winners);
    let loser_ids = ids_of(&losers);

    if let Some(first) = winners.first_mut() {
        for (slot, m) in first.iter_mut().enumerate() {
            m.a = Slot::from(placements[2 * slot]);
            m.b = Slot::from(placements[2 * slot + 1]);
        }
    }

    for (round, matches) in winners.iter_mut().enumerate() {
        for (slot, m) in matches.iter_mut().enumerate() {
            m.winner_to = match winner_ids.get(round + 1) {
                Some(next) => Some(Advance::new(next[slot / 2], Side::from_parity(slot))),
                None => Some(Advance::new(grand_final.id, Side::A)),
            };
            m.loser_to = loser_drop(&loser_ids, round, slot, grand_final.id);
        }
    }

    let last_losers_round = loser_ids.len().saturating_sub(1);
    for (round, matches) in losers.iter_mut().enumerate() {
        for (slot, m) in matches.iter_mut().enumerate() {
            m.winner_to = if round == last_losers_round {
                Some(Advance::new(grand_final.id, Side::B))
            } else if (round + 1) % 2 == 1 {
                Some(Advance::new(loser_ids[round + 1][slot], Side::B))
            } else {
                Some(Advance::new(
                    loser_ids[round + 1][slot / 2],
                    Side::from_parity(slot),
                ))
            };
        }
    }

    let bracket = DoubleBracket {
        size,
        winners: winner_ids,
        losers: loser_ids,
        grand_final_id: grand_final.id,
        grand_final_reset_id: reset.id,
        is_reset: false,
    };

    let matches = winners
        .into_iter()
        .flatten()
        .chain(losers.into_iter().flatten())
        .chain([grand_final, reset])
        .collect();
    (bracket, matches)
}

/// Where the loser of winners match (`round`, `slot`) drops
fn loser_drop(
    loser_ids: &[Vec<MatchId>],
    round: usize,
    slot: usize,
    grand_final_id: MatchId,
) -> Option<Advance> {
    if loser_ids.is_empty() {
        return Some(Advance::new(grand_final_id, Side::B));
    }

    if round == 0 {
        return loser_ids
            .first()
            .and_then(|first| first.get(slot / 2))
            .map(|&id| Advance::new(id, Side::from_parity(slot)));
    }

    let target_round = 2 * round - 1;
    let target = loser_ids
        .get(target_round)
        .and_then(|matches| matches.get(slot))
        .map(|&id| Advance::new(id, Side::A));
    if target.is_none() {
        log::error!(
            "No losers slot for winners round {} slot {} (losers round {})",
            round,
            slot,
            target_round
        );
    }
    target
}

/// Runs double elimination tournaments
pub struct DoubleElimEngine {
    repo: Arc<dyn Repository>,
    config: EngineConfig,
    events: Arc<dyn EventSink>,
}

impl DoubleElimEngine {
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

    /// Seed both brackets and activate a draft tournament
    pub async fn start(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::DoubleElim)?;
        ensure_status(&tournament, TournamentStatus::Draft)?;
        self.launch(tournament).await
    }

    async fn launch(&self, mut tournament: Tournament) -> TournamentResult<Tournament> {
        ensure_enough_participants(&tournament, &self.config)?;

        let now = Utc::now();
        let placements = Seeder::new(self.config.seeding).place(&tournament.participant_ids);
        let (bracket, matches) = plan_double_elim(tournament.id, &placements, now);

        let mut arena = MatchArena::fresh(matches, now);
        arena.resolve_byes();

        tournament.now_playing = arena.first_playable(&bracket.match_ids());
        tournament.layout = Some(Layout::DoubleBracket(bracket));
        tournament.status = TournamentStatus::Active;
        tournament.touch(now);

        self.repo.save_matches(&arena.take_dirty()).await?;
        self.repo.save_tournament(&tournament).await?;

        log::info!(
            "Started double elimination tournament {} with {} participants ({} matches)",
            tournament.id,
            tournament.participant_ids.len(),
            arena.len()
        );
        self.events.emit(EngineEvent::TournamentStarted {
            tournament_id: tournament.id,
            mode: TournamentMode::DoubleElim,
            participants: tournament.participant_ids.len(),
        });
        emit_byes(self.events.as_ref(), tournament.id, arena.take_resolved_byes());

        Ok(tournament)
    }

    /// Record a match result, dropping the loser or triggering the reset
    pub async fn report(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
    ) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::DoubleElim)?;
        ensure_status(&tournament, TournamentStatus::Active)?;
        validate_scores(score_a, score_b)?;
        let mut bracket = tournament
            .double_bracket()
            .cloned()
            .ok_or(TournamentError::MissingLayout(tournament_id))?;
        let reported = load_reportable_match(self.repo.as_ref(), &tournament, match_id).await?;

        let now = Utc::now();
        let matches = self.repo.get_matches_for_tournament(tournament_id).await?;
        let mut arena = MatchArena::new(matches, now);
        arena.complete(match_id, score_a, score_b);

        let mut reset_triggered = false;
        if match_id == bracket.grand_final_id && score_b > score_a {
            bracket.is_reset = true;
            reset_triggered = true;
            arena.place(Advance::new(bracket.grand_final_reset_id, Side::A), reported.a);
            arena.place(Advance::new(bracket.grand_final_reset_id, Side::B), reported.b);
            arena.run();
        }

        let champion = arena
            .get(bracket.deciding_match_id())
            .filter(|m| m.is_completed())
            .map(|m| m.winner_id);
        if champion.is_some() {
            tournament.status = TournamentStatus::Completed;
        }

        tournament.now_playing = arena.first_playable(&bracket.match_ids());
        tournament.layout = Some(Layout::DoubleBracket(bracket));
        tournament.touch(now);

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

        if reset_triggered {
            log::info!("Tournament {} goes to a bracket reset", tournament_id);
            self.events.emit(EngineEvent::BracketReset { tournament_id });
        }
        if let Some(champion_id) = champion {
            log::info!("Tournament {} completed", tournament_id);
            self.events.emit(EngineEvent::TournamentCompleted {
                tournament_id,
                champion_id,
            });
        }

        Ok(tournament)
    }

    /// Throw away both brackets and seed new ones
    ///
    /// Only allowed while no match has a reported, nonzero score.
    pub async fn regenerate(&self, tournament_id: TournamentId) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::DoubleElim)?;
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

    fn full(n: usize) -> Vec<Option<ParticipantId>> {
        (0..n).map(|_| Some(Uuid::new_v4())).collect()
    }

    fn find(matches: &[Match], id: MatchId) -> &Match {
        matches.iter().find(|m| m.id == id).unwrap()
    }

    #[test]
    fn test_losers_round_sizes() {
        assert!(losers_round_sizes(2).is_empty());
        assert_eq!(losers_round_sizes(4), vec![1, 1]);
        assert_eq!(losers_round_sizes(8), vec![2, 2, 1, 1]);
        assert_eq!(losers_round_sizes(16), vec![4, 4, 2, 2, 1, 1]);
    }

    #[test]
    fn test_two_participants_skip_losers_bracket() {
        let (bracket, matches) = plan_double_elim(Uuid::new_v4(), &full(2), Utc::now());

        assert!(bracket.losers.is_empty());
        assert_eq!(matches.len(), 3);
        let opener = find(&matches, bracket.winners[0][0]);
        assert_eq!(
            opener.winner_to,
            Some(Advance::new(bracket.grand_final_id, Side::A))
        );
        assert_eq!(
            opener.loser_to,
            Some(Advance::new(bracket.grand_final_id, Side::B))
        );
    }

    #[test]
    fn test_drop_edges_for_eight() {
        let (bracket, matches) = plan_double_elim(Uuid::new_v4(), &full(8), Utc::now());
        assert_eq!(matches.len(), 7 + 6 + 2);

        // Round 0 losers pair up by slot parity
        let w0 = find(&matches, bracket.winners[0][3]);
        assert_eq!(w0.loser_to, Some(Advance::new(bracket.losers[0][1], Side::B)));

        // Later winners losers integrate on side A at the same slot
        let w1 = find(&matches, bracket.winners[1][1]);
        assert_eq!(w1.loser_to, Some(Advance::new(bracket.losers[1][1], Side::A)));
        let wf = find(&matches, bracket.winners[2][0]);
        assert_eq!(wf.loser_to, Some(Advance::new(bracket.losers[3][0], Side::A)));
        assert_eq!(wf.winner_to, Some(Advance::new(bracket.grand_final_id, Side::A)));
    }

    #[test]
    fn test_losers_survivor_edges_for_eight() {
        let (bracket, matches) = plan_double_elim(Uuid::new_v4(), &full(8), Utc::now());

        // L0 -> L1 (integration): same slot, side B
        let l0 = find(&matches, bracket.losers[0][1]);
        assert_eq!(l0.winner_to, Some(Advance::new(bracket.losers[1][1], Side::B)));
        // L1 -> L2 (halving): slot / 2, side by parity
        let l1 = find(&matches, bracket.losers[1][1]);
        assert_eq!(l1.winner_to, Some(Advance::new(bracket.losers[2][0], Side::B)));
        // Losers final -> grand final B
        let lf = find(&matches, bracket.losers[3][0]);
        assert_eq!(lf.winner_to, Some(Advance::new(bracket.grand_final_id, Side::B)));
    }

    #[test]
    fn test_grand_finals_have_no_edges() {
        let (bracket, matches) = plan_double_elim(Uuid::new_v4(), &full(4), Utc::now());
        for id in [bracket.grand_final_id, bracket.grand_final_reset_id] {
            let m = find(&matches, id);
            assert!(m.winner_to.is_none());
            assert!(m.loser_to.is_none());
        }
        assert_eq!(
            find(&matches, bracket.grand_final_reset_id).bracket_side,
            Some(BracketSide::GrandFinalReset)
        );
    }
}
