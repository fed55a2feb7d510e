//! In-memory repository used by tests, benchmarks and the CLI simulator.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::errors::StorageResult;
use super::repository::{MatchRepository, ParticipantRepository, TournamentRepository};
use crate::participant::{Participant, ParticipantId};
use crate::tournament::{Match, MatchId, Tournament, TournamentId};

#[derive(Default)]
struct Store {
    tournaments: HashMap<TournamentId, Tournament>,
    matches: HashMap<MatchId, Match>,
    /// Match IDs per tournament in first-save order
    match_index: HashMap<TournamentId, Vec<MatchId>>,
    participants: HashMap<ParticipantId, Participant>,
}

impl Store {
    fn put_match(&mut self, m: &Match) {
        if self.matches.insert(m.id, m.clone()).is_none() {
            self.match_index.entry(m.tournament_id).or_default().push(m.id);
        }
    }
}

/// Repository backed by hash maps behind an async lock
///
/// Clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    store: Arc<RwLock<Store>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with participants
    pub async fn with_participants(
        self,
        participants: impl IntoIterator<Item = Participant>,
    ) -> Self {
        {
            let mut store = self.store.write().await;
            for p in participants {
                store.participants.insert(p.id, p);
            }
        }
        self
    }

    /// Total number of stored matches across all tournaments
    pub async fn match_count(&self) -> usize {
        self.store.read().await.matches.len()
    }
}

#[async_trait]
impl TournamentRepository for MemoryRepository {
    async fn get_tournament(&self, id: TournamentId) -> StorageResult<Option<Tournament>> {
        Ok(self.store.read().await.tournaments.get(&id).cloned())
    }

    async fn save_tournament(&self, tournament: &Tournament) -> StorageResult<()> {
        self.store
            .write()
            .await
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn delete_tournament(&self, id: TournamentId) -> StorageResult<()> {
        self.store.write().await.tournaments.remove(&id);
        Ok(())
    }

    async fn list_tournaments(&self) -> StorageResult<Vec<Tournament>> {
        Ok(self.store.read().await.tournaments.values().cloned().collect())
    }
}

#[async_trait]
impl MatchRepository for MemoryRepository {
    async fn get_match(&self, id: MatchId) -> StorageResult<Option<Match>> {
        Ok(self.store.read().await.matches.get(&id).cloned())
    }

    async fn save_match(&self, m: &Match) -> StorageResult<()> {
        self.store.write().await.put_match(m);
        Ok(())
    }

    async fn save_matches(&self, matches: &[Match]) -> StorageResult<()> {
        let mut store = self.store.write().await;
        for m in matches {
            store.put_match(m);
        }
        Ok(())
    }

    async fn delete_match(&self, id: MatchId) -> StorageResult<()> {
        let mut store = self.store.write().await;
        if let Some(m) = store.matches.remove(&id)
            && let Some(ids) = store.match_index.get_mut(&m.tournament_id)
        {
            ids.retain(|existing| *existing != id);
        }
        Ok(())
    }

    async fn get_matches_for_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> StorageResult<Vec<Match>> {
        let store = self.store.read().await;
        let Some(ids) = store.match_index.get(&tournament_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| store.matches.get(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ParticipantRepository for MemoryRepository {
    async fn get_participant(&self, id: ParticipantId) -> StorageResult<Option<Participant>> {
        Ok(self.store.read().await.participants.get(&id).cloned())
    }

    async fn save_participant(&self, participant: &Participant) -> StorageResult<()> {
        self.store
            .write()
            .await
            .participants
            .insert(participant.id, participant.clone());
        Ok(())
    }

    async fn delete_participant(&self, id: ParticipantId) -> StorageResult<()> {
        self.store.write().await.participants.remove(&id);
        Ok(())
    }

    async fn get_participants_by_ids(
        &self,
        ids: &[ParticipantId],
    ) -> StorageResult<Vec<Participant>> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| store.participants.get(id))
            .cloned()
            .collect())
    }
}
