//! Participant manager.

use chrono::Utc;
use std::sync::Arc;

use super::models::{Participant, ParticipantId, ParticipantKind, TeamMember};
use crate::db::Repository;
use crate::tournament::{TournamentError, TournamentResult};

/// Creates and edits participants
#[derive(Clone)]
pub struct ParticipantManager {
    repo: Arc<dyn Repository>,
}

impl ParticipantManager {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create and store a participant
    pub async fn create_participant(
        &self,
        name: &str,
        kind: ParticipantKind,
        members: Vec<TeamMember>,
    ) -> TournamentResult<Participant> {
        let name = validate_name(name)?;
        let participant = Participant::new(name, kind, members);
        self.repo.save_participant(&participant).await?;
        log::debug!("Created participant {} ({})", participant.name, participant.id);
        Ok(participant)
    }

    pub async fn get_participant(&self, id: ParticipantId) -> TournamentResult<Participant> {
        self.repo
            .get_participant(id)
            .await?
            .ok_or(TournamentError::ParticipantNotFound(id))
    }

    /// Participants in the order of `ids`; unknown IDs are skipped
    pub async fn get_participants(
        &self,
        ids: &[ParticipantId],
    ) -> TournamentResult<Vec<Participant>> {
        Ok(self.repo.get_participants_by_ids(ids).await?)
    }

    /// Change name and/or team members; kind is fixed at creation
    pub async fn update_participant(
        &self,
        id: ParticipantId,
        name: Option<&str>,
        members: Option<Vec<TeamMember>>,
    ) -> TournamentResult<Participant> {
        let mut participant = self.get_participant(id).await?;
        if let Some(name) = name {
            participant.name = validate_name(name)?;
        }
        if let Some(members) = members {
            participant.members = members;
        }
        participant.updated_at = Utc::now();
        self.repo.save_participant(&participant).await?;
        Ok(participant)
    }

    pub async fn delete_participant(&self, id: ParticipantId) -> TournamentResult<()> {
        self.get_participant(id).await?;
        self.repo.delete_participant(id).await?;
        Ok(())
    }
}

fn validate_name(name: &str) -> TournamentResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::InvalidInput(
            "participant name is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
