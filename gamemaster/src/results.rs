//! Final placings of a tournament.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ladder::compute_standings;
use crate::participant::ParticipantId;
use crate::tournament::{Layout, Match, MatchId, Tournament, TournamentStatus};

/// Top finishers
///
/// Single elimination has no third-place match, so both semifinal losers
/// share third.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podium {
    pub first: Option<ParticipantId>,
    pub second: Option<ParticipantId>,
    pub third: Vec<ParticipantId>,
}

fn by_id(matches: &[Match]) -> HashMap<MatchId, &Match> {
    matches.iter().map(|m| (m.id, m)).collect()
}

/// The match whose result decides the champion
fn deciding_match<'a>(
    tournament: &Tournament,
    matches: &HashMap<MatchId, &'a Match>,
) -> Option<&'a Match> {
    let id = match tournament.layout.as_ref()? {
        Layout::Bracket(bracket) => bracket.final_match_id()?,
        Layout::DoubleBracket(bracket) => bracket.deciding_match_id(),
        Layout::LadderOrder(_) => return None,
    };
    matches.get(&id).copied().filter(|m| m.is_completed())
}

/// Winner of a completed bracket tournament
pub fn champion(tournament: &Tournament, matches: &[Match]) -> Option<ParticipantId> {
    if tournament.status != TournamentStatus::Completed {
        return None;
    }
    deciding_match(tournament, &by_id(matches)).and_then(|m| m.winner_id)
}

/// Loser of the deciding match of a completed bracket tournament
pub fn runner_up(tournament: &Tournament, matches: &[Match]) -> Option<ParticipantId> {
    if tournament.status != TournamentStatus::Completed {
        return None;
    }
    deciding_match(tournament, &by_id(matches)).and_then(|m| m.loser_id)
}

/// Podium for any mode
///
/// Bracket podiums are empty until the tournament is completed; a ladder
/// podium reflects the current standings of scored participants.
pub fn podium(tournament: &Tournament, matches: &[Match]) -> Podium {
    let lookup = by_id(matches);
    match tournament.layout.as_ref() {
        Some(Layout::LadderOrder(order)) => {
            let mut top = compute_standings(
                &tournament.participant_ids,
                matches,
                order,
                tournament.ladder_type(),
            )
            .into_iter()
            .filter(|s| s.score.is_some())
            .map(|s| s.participant_id);
            Podium {
                first: top.next(),
                second: top.next(),
                third: top.next().into_iter().collect(),
            }
        }
        Some(_) if tournament.status != TournamentStatus::Completed => Podium::default(),
        Some(Layout::Bracket(bracket)) => {
            let third = bracket
                .matches_by_round
                .len()
                .checked_sub(2)
                .and_then(|semis| bracket.matches_by_round.get(semis))
                .into_iter()
                .flatten()
                .filter_map(|id| lookup.get(id).and_then(|m| m.loser_id))
                .collect();
            Podium {
                first: champion(tournament, matches),
                second: runner_up(tournament, matches),
                third,
            }
        }
        Some(Layout::DoubleBracket(bracket)) => {
            let third = bracket
                .losers
                .iter()
                .flatten()
                .filter_map(|id| lookup.get(id))
                .filter(|m| m.is_completed())
                .filter_map(|m| m.loser_id)
                .last()
                .into_iter()
                .collect();
            Podium {
                first: champion(tournament, matches),
                second: runner_up(tournament, matches),
                third,
            }
        }
        None => Podium::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::{Bracket, Slot, TournamentMode, TournamentSettings};
    use crate::participant::ParticipantKind;
    use chrono::Utc;
    use uuid::Uuid;

    fn played(tid: Uuid, round: u32, winner: ParticipantId, loser: ParticipantId) -> Match {
        let mut m = Match::new(tid, round, 0, None, Utc::now());
        m.a = Slot::Occupied(winner);
        m.b = Slot::Occupied(loser);
        m.score_a = 2;
        m.winner_id = Some(winner);
        m.loser_id = Some(loser);
        m.status = crate::tournament::MatchStatus::Completed;
        m
    }

    fn tournament(layout: Layout, status: TournamentStatus) -> Tournament {
        let now = Utc::now();
        Tournament {
            id: Uuid::new_v4(),
            name: "Cup".to_string(),
            mode: layout.mode(),
            participant_kind: ParticipantKind::Individual,
            status,
            participant_ids: Vec::new(),
            settings: TournamentSettings::default(),
            layout: Some(layout),
            now_playing: None,
            archived: false,
            start_date: None,
            end_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_single_elim_podium_shares_third() {
        let tid = Uuid::new_v4();
        let p: Vec<ParticipantId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let semi_a = played(tid, 0, p[0], p[3]);
        let semi_b = played(tid, 0, p[1], p[2]);
        let final_match = played(tid, 1, p[1], p[0]);
        let layout = Layout::Bracket(Bracket {
            size: 4,
            matches_by_round: vec![vec![semi_a.id, semi_b.id], vec![final_match.id]],
        });
        let matches = vec![semi_a, semi_b, final_match];

        let t = tournament(layout.clone(), TournamentStatus::Completed);
        let result = podium(&t, &matches);
        assert_eq!(result.first, Some(p[1]));
        assert_eq!(result.second, Some(p[0]));
        assert_eq!(result.third, vec![p[3], p[2]]);

        let active = tournament(layout, TournamentStatus::Active);
        assert_eq!(podium(&active, &matches), Podium::default());
        assert_eq!(champion(&active, &matches), None);
    }

    #[test]
    fn test_ladder_podium_skips_unscored() {
        let tid = Uuid::new_v4();
        let p: Vec<ParticipantId> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut t = tournament(Layout::LadderOrder(p.clone()), TournamentStatus::Active);
        t.participant_ids = p.clone();
        assert_eq!(t.mode, TournamentMode::Ladder);
        let records = vec![
            Match::score_record(tid, p[2], 10, Utc::now()),
            Match::score_record(tid, p[0], 4, Utc::now()),
        ];

        let result = podium(&t, &records);
        assert_eq!(result.first, Some(p[2]));
        assert_eq!(result.second, Some(p[0]));
        assert!(result.third.is_empty());
    }
}
