//! Tournament and match data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::participant::{ParticipantId, ParticipantKind};

/// Tournament ID type
pub type TournamentId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// How a tournament is played out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentMode {
    /// Single elimination bracket
    SingleElim,
    /// Winners and losers brackets with a grand final
    DoubleElim,
    /// Score ladder, no head-to-head matches
    Ladder,
}

impl std::fmt::Display for TournamentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentMode::SingleElim => write!(f, "single_elim"),
            TournamentMode::DoubleElim => write!(f, "double_elim"),
            TournamentMode::Ladder => write!(f, "ladder"),
        }
    }
}

/// Tournament lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Participants can be added and removed
    Draft,
    /// Bracket or ladder is live
    Active,
    /// A champion has been decided
    Completed,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Draft => write!(f, "draft"),
            TournamentStatus::Active => write!(f, "active"),
            TournamentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Ladder scoring rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderType {
    /// Higher is better, the latest submission counts
    #[default]
    Points,
    /// Lower is better, only improvements are kept
    Time,
}

impl std::fmt::Display for LadderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LadderType::Points => write!(f, "points"),
            LadderType::Time => write!(f, "time"),
        }
    }
}

/// Mode-specific tournament settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettings {
    /// Ladder scoring type (ladder mode only)
    pub ladder_type: Option<LadderType>,
}

/// Single elimination bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Bracket size (power of two)
    pub size: usize,
    /// Match IDs grouped by round, each round ordered by slot
    pub matches_by_round: Vec<Vec<MatchId>>,
}

impl Bracket {
    /// The match that decides the champion
    pub fn final_match_id(&self) -> Option<MatchId> {
        self.matches_by_round
            .last()
            .and_then(|round| round.first())
            .copied()
    }

    /// All match IDs in play order (round by round)
    pub fn match_ids(&self) -> Vec<MatchId> {
        self.matches_by_round.iter().flatten().copied().collect()
    }
}

/// Double elimination bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleBracket {
    /// Bracket size (power of two)
    pub size: usize,
    /// Winners bracket match IDs by round
    pub winners: Vec<Vec<MatchId>>,
    /// Losers bracket match IDs by round (empty for two participants)
    pub losers: Vec<Vec<MatchId>>,
    /// Grand final between both bracket champions
    pub grand_final_id: MatchId,
    /// Second grand final, played only if the losers champion wins the first
    pub grand_final_reset_id: MatchId,
    /// Whether the bracket reset has been triggered
    pub is_reset: bool,
}

impl DoubleBracket {
    /// All match IDs in play order: winners, losers, grand final, reset
    pub fn match_ids(&self) -> Vec<MatchId> {
        self.winners
            .iter()
            .flatten()
            .chain(self.losers.iter().flatten())
            .copied()
            .chain([self.grand_final_id, self.grand_final_reset_id])
            .collect()
    }

    /// The match whose winner is the champion
    pub fn deciding_match_id(&self) -> MatchId {
        if self.is_reset {
            self.grand_final_reset_id
        } else {
            self.grand_final_id
        }
    }
}

/// Mode-specific structure of a started tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Single elimination
    Bracket(Bracket),
    /// Double elimination
    DoubleBracket(DoubleBracket),
    /// Ladder tie-break order
    LadderOrder(Vec<ParticipantId>),
}

impl Layout {
    /// Mode this layout belongs to
    pub fn mode(&self) -> TournamentMode {
        match self {
            Layout::Bracket(_) => TournamentMode::SingleElim,
            Layout::DoubleBracket(_) => TournamentMode::DoubleElim,
            Layout::LadderOrder(_) => TournamentMode::Ladder,
        }
    }
}

/// Tournament record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub mode: TournamentMode,
    pub participant_kind: ParticipantKind,
    pub status: TournamentStatus,
    /// Entered participants, in entry order
    pub participant_ids: Vec<ParticipantId>,
    pub settings: TournamentSettings,
    /// Present once the tournament has started
    pub layout: Option<Layout>,
    /// First playable match, if any
    pub now_playing: Option<MatchId>,
    pub archived: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Single elimination bracket, if started in that mode
    pub fn bracket(&self) -> Option<&Bracket> {
        match &self.layout {
            Some(Layout::Bracket(bracket)) => Some(bracket),
            _ => None,
        }
    }

    /// Double elimination bracket, if started in that mode
    pub fn double_bracket(&self) -> Option<&DoubleBracket> {
        match &self.layout {
            Some(Layout::DoubleBracket(bracket)) => Some(bracket),
            _ => None,
        }
    }

    /// Ladder tie-break order, if started in ladder mode
    pub fn ladder_order(&self) -> Option<&[ParticipantId]> {
        match &self.layout {
            Some(Layout::LadderOrder(order)) => Some(order),
            _ => None,
        }
    }

    /// Ladder scoring type (defaults to points)
    pub fn ladder_type(&self) -> LadderType {
        self.settings.ladder_type.unwrap_or_default()
    }

    /// Whether the participant is entered in this tournament
    pub fn has_participant(&self, participant_id: ParticipantId) -> bool {
        self.participant_ids.contains(&participant_id)
    }

    /// Bump the modification timestamp
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Bracket a double elimination match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Winners,
    Losers,
    GrandFinal,
    GrandFinalReset,
}

impl std::fmt::Display for BracketSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketSide::Winners => write!(f, "winners"),
            BracketSide::Losers => write!(f, "losers"),
            BracketSide::GrandFinal => write!(f, "grand_final"),
            BracketSide::GrandFinalReset => write!(f, "grand_final_reset"),
        }
    }
}

/// Match state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Completed,
}

/// Contents of one side of a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Not yet determined; an upstream match will fill it
    #[default]
    Empty,
    /// Nobody will ever arrive here
    Bye,
    /// Participant seated
    Occupied(ParticipantId),
}

impl Slot {
    /// Seated participant, if any
    pub fn participant(&self) -> Option<ParticipantId> {
        match self {
            Slot::Occupied(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Slot::Bye)
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }
}

impl From<Option<ParticipantId>> for Slot {
    fn from(value: Option<ParticipantId>) -> Self {
        match value {
            Some(id) => Slot::Occupied(id),
            None => Slot::Bye,
        }
    }
}

/// Side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// A for even slots, B for odd slots
    pub fn from_parity(slot: usize) -> Self {
        if slot % 2 == 0 { Side::A } else { Side::B }
    }
}

/// Edge from a match outcome to the slot it fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Advance {
    pub match_id: MatchId,
    pub side: Side,
}

impl Advance {
    pub fn new(match_id: MatchId, side: Side) -> Self {
        Self { match_id, side }
    }
}

/// A bracket match or, in ladder mode, a single scored attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Round within the bracket side (0-based)
    pub round: u32,
    /// Position within the round (0-based)
    pub slot: u32,
    /// Double elimination only
    pub bracket_side: Option<BracketSide>,
    pub a: Slot,
    pub b: Slot,
    pub score_a: i64,
    pub score_b: i64,
    pub winner_id: Option<ParticipantId>,
    pub loser_id: Option<ParticipantId>,
    pub status: MatchStatus,
    /// Where the winner goes
    pub winner_to: Option<Advance>,
    /// Where the loser goes (double elimination winners bracket)
    pub loser_to: Option<Advance>,
    pub played_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Create an empty pending bracket match
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        slot: u32,
        bracket_side: Option<BracketSide>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            slot,
            bracket_side,
            a: Slot::Empty,
            b: Slot::Empty,
            score_a: 0,
            score_b: 0,
            winner_id: None,
            loser_id: None,
            status: MatchStatus::Pending,
            winner_to: None,
            loser_to: None,
            played_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a completed ladder score record
    pub fn score_record(
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        value: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            a: Slot::Occupied(participant_id),
            score_a: value,
            winner_id: Some(participant_id),
            status: MatchStatus::Completed,
            played_at: Some(now),
            ..Self::new(tournament_id, 0, 0, None, now)
        }
    }

    pub fn a_id(&self) -> Option<ParticipantId> {
        self.a.participant()
    }

    pub fn b_id(&self) -> Option<ParticipantId> {
        self.b.participant()
    }

    pub fn slot_on(&self, side: Side) -> Slot {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    pub fn slot_on_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MatchStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Pending with both participants seated
    pub fn is_playable(&self) -> bool {
        self.is_pending() && self.a.is_occupied() && self.b.is_occupied()
    }

    /// Ladder attempt rather than a head-to-head match
    pub fn is_score_record(&self) -> bool {
        self.is_completed() && self.a.is_occupied() && self.b.is_empty()
    }

    /// Completed head-to-head match with a reported, nonzero score
    pub fn has_real_result(&self) -> bool {
        self.is_completed()
            && self.a.is_occupied()
            && self.b.is_occupied()
            && (self.score_a != 0 || self.score_b != 0)
    }

    /// When the match was decided, falling back to creation time
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.played_at.unwrap_or(self.created_at)
    }
}
