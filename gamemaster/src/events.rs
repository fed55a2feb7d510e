//! Engine events and the sinks that receive them.
//!
//! Engines never hold global listeners; a sink is injected into
//! [`crate::GameMaster`] and every state transition is pushed into it.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::participant::ParticipantId;
use crate::tournament::{MatchId, TournamentId, TournamentMode};

/// State transition emitted by an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    TournamentStarted {
        tournament_id: TournamentId,
        mode: TournamentMode,
        participants: usize,
    },
    MatchCompleted {
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: ParticipantId,
        loser_id: ParticipantId,
    },
    /// A match decided without play
    ByeResolved {
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: Option<ParticipantId>,
    },
    /// Losers bracket champion won the first grand final
    BracketReset { tournament_id: TournamentId },
    TournamentCompleted {
        tournament_id: TournamentId,
        champion_id: Option<ParticipantId>,
    },
    BracketRegenerated { tournament_id: TournamentId },
    LadderScoreRecorded {
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        value: i64,
    },
    TieOrderChanged {
        tournament_id: TournamentId,
        order: Vec<ParticipantId>,
    },
}

/// Receiver of engine events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Forwards events over a bounded channel
///
/// Emitting never blocks the engine: when the channel is full the event is
/// dropped with a warning.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: EngineEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                log::warn!("Event channel full, dropping {:?}", event);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Event receiver dropped");
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
