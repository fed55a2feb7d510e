//! Tournament participants: individuals or teams of two.

pub mod manager;
pub mod models;

pub use manager::ParticipantManager;
pub use models::{Participant, ParticipantId, ParticipantKind, TeamMember};
