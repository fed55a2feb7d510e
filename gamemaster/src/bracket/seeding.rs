//! Seed placement for power-of-two brackets.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::SeedingMode;
use crate::participant::ParticipantId;

/// Smallest power of two that is at least `n` (1 for `n == 0`)
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Number of rounds in a bracket of `size` (a power of two)
pub fn round_count(size: usize) -> usize {
    size.max(1).trailing_zeros() as usize
}

/// Seed index for every slot of a bracket
///
/// Entry `i` is the 0-based seed placed in slot `i`. Slots pair up as
/// `(0, 1), (2, 3), ...` in the first round, so top seeds meet as late as
/// possible.
///
/// ```
/// use gamemaster::bracket::slot_order;
///
/// assert_eq!(slot_order(8), vec![0, 7, 3, 4, 1, 6, 2, 5]);
/// ```
pub fn slot_order(bracket_size: usize) -> Vec<usize> {
    if bracket_size <= 1 {
        return vec![0];
    }

    let mut order = vec![0, 1];
    while order.len() < bracket_size {
        let n = order.len() * 2;
        order = order
            .chunks(2)
            .flat_map(|pair| [pair[0], n - 1 - pair[0], pair[1], n - 1 - pair[1]])
            .collect();
    }
    order
}

/// Participant index for every slot, `None` where the seed is a bye
pub fn bracket_seeding(participant_count: usize, bracket_size: usize) -> Vec<Option<usize>> {
    slot_order(bracket_size)
        .into_iter()
        .map(|seed| (seed < participant_count).then_some(seed))
        .collect()
}

/// Turns an entry list into seed order according to a [`SeedingMode`]
#[derive(Debug, Clone, Copy)]
pub struct Seeder {
    mode: SeedingMode,
}

impl Seeder {
    pub fn new(mode: SeedingMode) -> Self {
        Self { mode }
    }

    /// Participants ordered by seed (first is top seed)
    pub fn arrange(&self, participant_ids: &[ParticipantId]) -> Vec<ParticipantId> {
        let mut seeded = participant_ids.to_vec();
        match self.mode {
            SeedingMode::Ordered => {}
            SeedingMode::Random => seeded.shuffle(&mut rand::rng()),
            SeedingMode::Seeded(seed) => seeded.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
        seeded
    }

    /// Participants laid out slot by slot for round 0, `None` for byes
    pub fn place(&self, participant_ids: &[ParticipantId]) -> Vec<Option<ParticipantId>> {
        let seeded = self.arrange(participant_ids);
        let size = next_power_of_two(seeded.len());
        bracket_seeding(seeded.len(), size)
            .into_iter()
            .map(|seed| seed.map(|idx| seeded[idx]))
            .collect()
    }
}
