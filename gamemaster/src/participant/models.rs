//! Participant data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Participant ID type
pub type ParticipantId = Uuid;

/// Whether a participant is one person or a team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    #[default]
    Individual,
    Pair,
}

/// Member of a team participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
}

impl TeamMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Tournament participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub kind: ParticipantKind,
    pub name: String,
    /// Team members (pairs only)
    pub members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// Create a new participant with a fresh ID
    pub fn new(name: impl Into<String>, kind: ParticipantKind, members: Vec<TeamMember>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            members,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name shown in brackets and standings
    ///
    /// Pairs with members render as `"Team (Alice, Bob)"`.
    pub fn display_name(&self) -> String {
        if self.kind == ParticipantKind::Individual || self.members.is_empty() {
            return self.name.clone();
        }

        let members: Vec<&str> = self.members.iter().map(|m| m.name.as_str()).collect();
        format!("{} ({})", self.name, members.join(", "))
    }
}
