//! Tournament manager for creating, editing and retiring tournaments.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::checks::{ensure_mode, ensure_status, load_tournament};
use super::errors::{TournamentError, TournamentResult};
use super::models::{
    LadderType, Tournament, TournamentId, TournamentMode, TournamentSettings, TournamentStatus,
};
use crate::db::Repository;
use crate::events::{EngineEvent, EventSink};
use crate::ladder::compute_standings;
use crate::participant::{ParticipantId, ParticipantKind};

/// Input for [`TournamentManager::create_tournament`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTournamentInput {
    pub name: String,
    pub mode: TournamentMode,
    #[serde(default)]
    pub participant_kind: ParticipantKind,
    #[serde(default)]
    pub participant_ids: Vec<ParticipantId>,
    /// Ladder mode only; defaults to points
    #[serde(default)]
    pub ladder_type: Option<LadderType>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl CreateTournamentInput {
    pub fn new(name: impl Into<String>, mode: TournamentMode) -> Self {
        Self {
            name: name.into(),
            mode,
            participant_kind: ParticipantKind::Individual,
            participant_ids: Vec::new(),
            ladder_type: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_participants(mut self, participant_ids: Vec<ParticipantId>) -> Self {
        self.participant_ids = participant_ids;
        self
    }

    pub fn with_ladder_type(mut self, ladder_type: LadderType) -> Self {
        self.ladder_type = Some(ladder_type);
        self
    }
}

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn Repository>,
    events: Arc<dyn EventSink>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(repo: Arc<dyn Repository>, events: Arc<dyn EventSink>) -> Self {
        Self { repo, events }
    }

    /// Create a draft tournament
    pub async fn create_tournament(
        &self,
        input: CreateTournamentInput,
    ) -> TournamentResult<Tournament> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidInput(
                "tournament name is required".to_string(),
            ));
        }

        let end_date = match (input.start_date, input.end_date) {
            (Some(start), Some(end)) if end < start => {
                return Err(TournamentError::InvalidInput(
                    "end date is before start date".to_string(),
                ));
            }
            (Some(start), Some(end)) if end == start => None,
            (_, end) => end,
        };

        let ladder_type = match input.mode {
            TournamentMode::Ladder => Some(input.ladder_type.unwrap_or_default()),
            _ => None,
        };

        let mut participant_ids: Vec<ParticipantId> =
            Vec::with_capacity(input.participant_ids.len());
        for id in input.participant_ids {
            if !participant_ids.contains(&id) {
                participant_ids.push(id);
            }
        }

        let now = Utc::now();
        let tournament = Tournament {
            id: Uuid::new_v4(),
            name: name.to_string(),
            mode: input.mode,
            participant_kind: input.participant_kind,
            status: TournamentStatus::Draft,
            participant_ids,
            settings: TournamentSettings { ladder_type },
            layout: None,
            now_playing: None,
            archived: false,
            start_date: input.start_date,
            end_date,
            created_at: now,
            updated_at: now,
        };
        self.repo.save_tournament(&tournament).await?;

        log::info!(
            "Created {} tournament '{}' ({})",
            tournament.mode,
            tournament.name,
            tournament.id
        );
        Ok(tournament)
    }

    /// Get a tournament
    pub async fn get_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        load_tournament(self.repo.as_ref(), tournament_id).await
    }

    /// All tournaments, most recently updated first
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let mut tournaments = self.repo.list_tournaments().await?;
        tournaments.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(tournaments)
    }

    /// Enter a participant; entering twice is a no-op
    pub async fn add_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_status(&tournament, TournamentStatus::Draft)?;

        if tournament.has_participant(participant_id) {
            return Ok(tournament);
        }
        tournament.participant_ids.push(participant_id);
        tournament.touch(Utc::now());
        self.repo.save_tournament(&tournament).await?;
        Ok(tournament)
    }

    /// Withdraw a participant before the tournament starts
    pub async fn remove_participant(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_status(&tournament, TournamentStatus::Draft)?;

        if !tournament.has_participant(participant_id) {
            return Err(TournamentError::ParticipantNotEntered {
                participant_id,
                tournament_id,
            });
        }
        tournament.participant_ids.retain(|id| *id != participant_id);
        tournament.touch(Utc::now());
        self.repo.save_tournament(&tournament).await?;
        Ok(tournament)
    }

    /// Archive or unarchive a tournament
    pub async fn set_archived(
        &self,
        tournament_id: TournamentId,
        archived: bool,
    ) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        tournament.archived = archived;
        tournament.touch(Utc::now());
        self.repo.save_tournament(&tournament).await?;
        Ok(tournament)
    }

    /// Return an active tournament to draft, discarding every match
    pub async fn revert_to_draft(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_status(&tournament, TournamentStatus::Active)?;

        let removed = self.delete_matches(tournament_id).await?;
        tournament.status = TournamentStatus::Draft;
        tournament.layout = None;
        tournament.now_playing = None;
        tournament.touch(Utc::now());
        self.repo.save_tournament(&tournament).await?;

        log::info!(
            "Tournament {} reverted to draft ({} matches removed)",
            tournament_id,
            removed
        );
        Ok(tournament)
    }

    /// Delete a tournament and its matches
    pub async fn delete_tournament(&self, tournament_id: TournamentId) -> TournamentResult<()> {
        load_tournament(self.repo.as_ref(), tournament_id).await?;
        self.delete_matches(tournament_id).await?;
        self.repo.delete_tournament(tournament_id).await?;
        log::info!("Deleted tournament {}", tournament_id);
        Ok(())
    }

    /// Close an active ladder; the current leader is the champion
    pub async fn complete_ladder(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Tournament> {
        let mut tournament = load_tournament(self.repo.as_ref(), tournament_id).await?;
        ensure_mode(&tournament, TournamentMode::Ladder)?;
        ensure_status(&tournament, TournamentStatus::Active)?;

        let records = self.repo.get_matches_for_tournament(tournament_id).await?;
        let champion_id = compute_standings(
            &tournament.participant_ids,
            &records,
            tournament.ladder_order().unwrap_or_default(),
            tournament.ladder_type(),
        )
        .first()
        .filter(|s| s.score.is_some())
        .map(|s| s.participant_id);

        tournament.status = TournamentStatus::Completed;
        tournament.touch(Utc::now());
        self.repo.save_tournament(&tournament).await?;

        log::info!("Ladder {} completed", tournament_id);
        self.events.emit(EngineEvent::TournamentCompleted {
            tournament_id,
            champion_id,
        });
        Ok(tournament)
    }

    async fn delete_matches(&self, tournament_id: TournamentId) -> TournamentResult<usize> {
        let matches = self.repo.get_matches_for_tournament(tournament_id).await?;
        for m in &matches {
            self.repo.delete_match(m.id).await?;
        }
        Ok(matches.len())
    }
}
