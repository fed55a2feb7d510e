//! Repository trait definitions and the PostgreSQL implementation.
//!
//! Engines only talk to these traits, so they run unchanged against the
//! in-memory store used in tests and the CLI, or against PostgreSQL.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::errors::StorageResult;
use crate::participant::{Participant, ParticipantId};
use crate::tournament::{Match, MatchId, Tournament, TournamentId};

/// Trait for tournament storage
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Find tournament by ID
    async fn get_tournament(&self, id: TournamentId) -> StorageResult<Option<Tournament>>;

    /// Insert or replace a tournament
    async fn save_tournament(&self, tournament: &Tournament) -> StorageResult<()>;

    /// Delete a tournament (matches are not touched)
    async fn delete_tournament(&self, id: TournamentId) -> StorageResult<()>;

    /// All tournaments, in no particular order
    async fn list_tournaments(&self) -> StorageResult<Vec<Tournament>>;
}

/// Trait for match storage
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Find match by ID
    async fn get_match(&self, id: MatchId) -> StorageResult<Option<Match>>;

    /// Insert or replace a match
    async fn save_match(&self, m: &Match) -> StorageResult<()>;

    /// Insert or replace several matches
    async fn save_matches(&self, matches: &[Match]) -> StorageResult<()> {
        for m in matches {
            self.save_match(m).await?;
        }
        Ok(())
    }

    /// Delete a match
    async fn delete_match(&self, id: MatchId) -> StorageResult<()>;

    /// Matches of a tournament in the order they were first saved
    async fn get_matches_for_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> StorageResult<Vec<Match>>;
}

/// Trait for participant storage
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Find participant by ID
    async fn get_participant(&self, id: ParticipantId) -> StorageResult<Option<Participant>>;

    /// Insert or replace a participant
    async fn save_participant(&self, participant: &Participant) -> StorageResult<()>;

    /// Delete a participant
    async fn delete_participant(&self, id: ParticipantId) -> StorageResult<()>;

    /// Participants for the given IDs, in the order of `ids`; unknown IDs are skipped
    async fn get_participants_by_ids(
        &self,
        ids: &[ParticipantId],
    ) -> StorageResult<Vec<Participant>>;
}

/// Everything the engines need from storage
pub trait Repository: TournamentRepository + MatchRepository + ParticipantRepository {}

impl<T> Repository for T where T: TournamentRepository + MatchRepository + ParticipantRepository {}

/// PostgreSQL repository storing each record as a JSONB document
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const UPSERT_MATCH: &str = "INSERT INTO gm_matches (id, tournament_id, doc) VALUES ($1, $2, $3)
     ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc";

#[async_trait]
impl TournamentRepository for PgRepository {
    async fn get_tournament(&self, id: TournamentId) -> StorageResult<Option<Tournament>> {
        let row = sqlx::query("SELECT doc FROM gm_tournaments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(r) => Some(r.try_get::<Json<Tournament>, _>("doc")?.0),
            None => None,
        })
    }

    async fn save_tournament(&self, tournament: &Tournament) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO gm_tournaments (id, updated_at, doc) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET updated_at = EXCLUDED.updated_at, doc = EXCLUDED.doc",
        )
        .bind(tournament.id)
        .bind(tournament.updated_at)
        .bind(Json(tournament))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_tournament(&self, id: TournamentId) -> StorageResult<()> {
        sqlx::query("DELETE FROM gm_tournaments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_tournaments(&self) -> StorageResult<Vec<Tournament>> {
        let rows = sqlx::query("SELECT doc FROM gm_tournaments")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| -> StorageResult<Tournament> {
                Ok(r.try_get::<Json<Tournament>, _>("doc")?.0)
            })
            .collect()
    }
}

#[async_trait]
impl MatchRepository for PgRepository {
    async fn get_match(&self, id: MatchId) -> StorageResult<Option<Match>> {
        let row = sqlx::query("SELECT doc FROM gm_matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(r) => Some(r.try_get::<Json<Match>, _>("doc")?.0),
            None => None,
        })
    }

    async fn save_match(&self, m: &Match) -> StorageResult<()> {
        sqlx::query(UPSERT_MATCH)
            .bind(m.id)
            .bind(m.tournament_id)
            .bind(Json(m))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_matches(&self, matches: &[Match]) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        for m in matches {
            sqlx::query(UPSERT_MATCH)
                .bind(m.id)
                .bind(m.tournament_id)
                .bind(Json(m))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_match(&self, id: MatchId) -> StorageResult<()> {
        sqlx::query("DELETE FROM gm_matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_matches_for_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> StorageResult<Vec<Match>> {
        let rows = sqlx::query("SELECT doc FROM gm_matches WHERE tournament_id = $1 ORDER BY seq")
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| -> StorageResult<Match> { Ok(r.try_get::<Json<Match>, _>("doc")?.0) })
            .collect()
    }
}

#[async_trait]
impl ParticipantRepository for PgRepository {
    async fn get_participant(&self, id: ParticipantId) -> StorageResult<Option<Participant>> {
        let row = sqlx::query("SELECT doc FROM gm_participants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(r) => Some(r.try_get::<Json<Participant>, _>("doc")?.0),
            None => None,
        })
    }

    async fn save_participant(&self, participant: &Participant) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO gm_participants (id, doc) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(participant.id)
        .bind(Json(participant))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_participant(&self, id: ParticipantId) -> StorageResult<()> {
        sqlx::query("DELETE FROM gm_participants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_participants_by_ids(
        &self,
        ids: &[ParticipantId],
    ) -> StorageResult<Vec<Participant>> {
        let rows = sqlx::query("SELECT doc FROM gm_participants WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut found = rows
            .into_iter()
            .map(|r| -> StorageResult<Participant> {
                Ok(r.try_get::<Json<Participant>, _>("doc")?.0)
            })
            .collect::<StorageResult<Vec<Participant>>>()?;

        // Postgres returns rows in arbitrary order
        found.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
        Ok(found)
    }
}
