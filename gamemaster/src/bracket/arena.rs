//! In-memory match arena with a placement work queue.
//!
//! Every bracket match is loaded into the arena, results and byes push
//! placements onto a FIFO queue, and the queue is drained until the bracket
//! is quiet again. Only matches that changed are handed back for saving.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

use crate::participant::ParticipantId;
use crate::tournament::{Advance, Match, MatchId, MatchStatus, Slot};

/// One pending write of a slot into a downstream match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    target: Advance,
    slot: Slot,
}

/// Match decided without being played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBye {
    pub match_id: MatchId,
    /// `None` when both sides were byes
    pub winner_id: Option<ParticipantId>,
}

/// Bracket matches addressed by ID
pub struct MatchArena {
    matches: Vec<Match>,
    index: HashMap<MatchId, usize>,
    dirty: Vec<bool>,
    queue: VecDeque<Placement>,
    resolved_byes: Vec<ResolvedBye>,
    now: DateTime<Utc>,
}

impl MatchArena {
    /// Load matches; they are considered unchanged
    pub fn new(matches: Vec<Match>, now: DateTime<Utc>) -> Self {
        let index = matches
            .iter()
            .enumerate()
            .map(|(idx, m)| (m.id, idx))
            .collect();
        let dirty = vec![false; matches.len()];
        Self {
            matches,
            index,
            dirty,
            queue: VecDeque::new(),
            resolved_byes: Vec::new(),
            now,
        }
    }

    /// Load freshly built matches; all of them will be saved
    pub fn fresh(matches: Vec<Match>, now: DateTime<Utc>) -> Self {
        let mut arena = Self::new(matches, now);
        arena.dirty.fill(true);
        arena
    }

    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.index.get(&id).map(|&idx| &self.matches[idx])
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Queue a slot write into `target`
    pub fn place(&mut self, target: Advance, slot: Slot) {
        self.queue.push_back(Placement { target, slot });
    }

    /// Auto-complete every bye match, then drain the queue
    pub fn resolve_byes(&mut self) {
        for idx in 0..self.matches.len() {
            self.try_resolve(idx);
        }
        self.run();
    }

    /// Record a played result and advance both participants
    ///
    /// The caller has validated the match: it is pending, both sides are
    /// occupied, and the scores are not equal.
    pub fn complete(&mut self, match_id: MatchId, score_a: i64, score_b: i64) {
        let Some(&idx) = self.index.get(&match_id) else {
            log::error!("Cannot complete unknown match {}", match_id);
            return;
        };
        let now = self.now;
        let m = &mut self.matches[idx];
        let (winner, loser) = if score_a > score_b {
            (m.a, m.b)
        } else {
            (m.b, m.a)
        };

        m.score_a = score_a;
        m.score_b = score_b;
        m.winner_id = winner.participant();
        m.loser_id = loser.participant();
        m.status = MatchStatus::Completed;
        m.played_at = Some(now);
        m.updated_at = now;
        self.dirty[idx] = true;

        let (winner_to, loser_to) = (m.winner_to, m.loser_to);
        if let Some(target) = winner_to {
            self.place(target, winner);
        }
        if let Some(target) = loser_to {
            self.place(target, loser);
        }
        self.run();
    }

    /// Drain the placement queue
    pub fn run(&mut self) {
        while let Some(Placement { target, slot }) = self.queue.pop_front() {
            let Some(&idx) = self.index.get(&target.match_id) else {
                log::error!(
                    "Advancement target {} missing, bracket stalled",
                    target.match_id
                );
                continue;
            };

            let m = &mut self.matches[idx];
            if m.is_completed() {
                log::error!("Advancement into completed match {} skipped", m.id);
                continue;
            }
            let current = m.slot_on_mut(target.side);
            if !current.is_empty() {
                log::error!(
                    "Slot {:?} of match {} already filled, placement skipped",
                    target.side,
                    target.match_id
                );
                continue;
            }

            *current = slot;
            m.updated_at = self.now;
            self.dirty[idx] = true;
            log::debug!("Placed {:?} into match {} side {:?}", slot, m.id, target.side);

            self.try_resolve(idx);
        }
    }

    /// Complete the match at `idx` if a bye decides it
    fn try_resolve(&mut self, idx: usize) {
        let now = self.now;
        let m = &mut self.matches[idx];
        if !m.is_pending() {
            return;
        }

        let winner = match (m.a, m.b) {
            (Slot::Occupied(id), Slot::Bye) | (Slot::Bye, Slot::Occupied(id)) => Slot::Occupied(id),
            (Slot::Bye, Slot::Bye) => Slot::Bye,
            _ => return,
        };

        m.winner_id = winner.participant();
        m.loser_id = None;
        m.status = MatchStatus::Completed;
        m.played_at = Some(now);
        m.updated_at = now;
        self.dirty[idx] = true;
        self.resolved_byes.push(ResolvedBye {
            match_id: m.id,
            winner_id: winner.participant(),
        });
        log::debug!("Match {} resolved as a bye", m.id);

        let (winner_to, loser_to) = (m.winner_to, m.loser_to);
        if let Some(target) = winner_to {
            self.place(target, winner);
        }
        if let Some(target) = loser_to {
            self.place(target, Slot::Bye);
        }
    }

    /// First playable match following `order`
    pub fn first_playable(&self, order: &[MatchId]) -> Option<MatchId> {
        order
            .iter()
            .copied()
            .find(|id| self.get(*id).is_some_and(Match::is_playable))
    }

    /// Byes resolved since the last call
    pub fn take_resolved_byes(&mut self) -> Vec<ResolvedBye> {
        std::mem::take(&mut self.resolved_byes)
    }

    /// Changed matches in load order; clears the change flags
    pub fn take_dirty(&mut self) -> Vec<Match> {
        self.matches
            .iter()
            .zip(self.dirty.iter_mut())
            .filter_map(|(m, dirty)| std::mem::take(dirty).then(|| m.clone()))
            .collect()
    }

    /// All matches in load order
    pub fn into_matches(self) -> Vec<Match> {
        self.matches
    }
}
