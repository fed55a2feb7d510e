//! Ladder score aggregation and ranking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::participant::ParticipantId;
use crate::tournament::{LadderType, Match};

/// One row of the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderStanding {
    pub participant_id: ParticipantId,
    /// 1-based position
    pub rank: usize,
    /// Current score, `None` if nothing was submitted
    pub score: Option<i64>,
}

/// Current score of every participant with at least one record
///
/// Points: the most recent record counts. Time: the lowest record counts.
pub fn current_scores(records: &[Match], ladder_type: LadderType) -> HashMap<ParticipantId, i64> {
    let mut latest: HashMap<ParticipantId, &Match> = HashMap::new();
    let mut best: HashMap<ParticipantId, i64> = HashMap::new();

    for record in records.iter().filter(|m| m.is_score_record()) {
        let Some(participant_id) = record.a_id() else {
            continue;
        };
        match ladder_type {
            LadderType::Points => {
                let newer = latest
                    .get(&participant_id)
                    .is_none_or(|current| record.recorded_at() >= current.recorded_at());
                if newer {
                    latest.insert(participant_id, record);
                }
            }
            LadderType::Time => {
                best.entry(participant_id)
                    .and_modify(|value| *value = (*value).min(record.score_a))
                    .or_insert(record.score_a);
            }
        }
    }

    match ladder_type {
        LadderType::Points => latest
            .into_iter()
            .map(|(id, record)| (id, record.score_a))
            .collect(),
        LadderType::Time => best,
    }
}

/// Rank participants
///
/// Scored participants come first, best score on top, ties broken by their
/// position in `ladder_order` (IDs missing from it go after those present,
/// then by input order). Unscored participants follow in input order.
pub fn compute_standings(
    participant_ids: &[ParticipantId],
    records: &[Match],
    ladder_order: &[ParticipantId],
    ladder_type: LadderType,
) -> Vec<LadderStanding> {
    let scores = current_scores(records, ladder_type);
    let position: HashMap<ParticipantId, usize> = ladder_order
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let (mut scored, unscored): (Vec<(ParticipantId, Option<i64>)>, Vec<_>) = participant_ids
        .iter()
        .map(|id| (*id, scores.get(id).copied()))
        .partition(|(_, score)| score.is_some());

    scored.sort_by(|(id_a, score_a), (id_b, score_b)| {
        let by_score = match ladder_type {
            LadderType::Points => score_b.cmp(score_a),
            LadderType::Time => score_a.cmp(score_b),
        };
        let pos_a = position.get(id_a).copied().unwrap_or(usize::MAX);
        let pos_b = position.get(id_b).copied().unwrap_or(usize::MAX);
        by_score.then(pos_a.cmp(&pos_b))
    });

    scored
        .into_iter()
        .chain(unscored)
        .enumerate()
        .map(|(idx, (participant_id, score))| LadderStanding {
            participant_id,
            rank: idx + 1,
            score,
        })
        .collect()
}

/// Lowest recorded value for a participant
pub fn best_time(records: &[Match], participant_id: ParticipantId) -> Option<i64> {
    records
        .iter()
        .filter(|m| m.is_score_record() && m.a_id() == Some(participant_id))
        .map(|m| m.score_a)
        .min()
}

/// Every record of a participant, newest first
pub fn score_history(records: &[Match], participant_id: ParticipantId) -> Vec<Match> {
    let mut history: Vec<Match> = records
        .iter()
        .filter(|m| m.is_score_record() && m.a_id() == Some(participant_id))
        .cloned()
        .collect();
    history.reverse();
    history.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
    history
}
