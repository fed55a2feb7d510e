//! Integration tests for tournament and participant management

use chrono::NaiveDate;
use gamemaster::db::{MatchRepository, MemoryRepository};
use gamemaster::participant::{ParticipantKind, TeamMember};
use gamemaster::tournament::{
    CreateTournamentInput, LadderType, TournamentError, TournamentMode, TournamentStatus,
};
use gamemaster::{EngineConfig, GameMaster};
use std::sync::Arc;
use std::time::Duration;

fn game_master() -> (GameMaster, MemoryRepository) {
    let repo = MemoryRepository::new();
    let gm = GameMaster::new(Arc::new(repo.clone()), EngineConfig::default());
    (gm, repo)
}

async fn entrants(gm: &GameMaster, n: usize) -> Vec<uuid::Uuid> {
    let mut ids = Vec::new();
    for i in 0..n {
        let p = gm
            .participants()
            .create_participant(&format!("Entrant {i}"), ParticipantKind::Individual, vec![])
            .await
            .unwrap();
        ids.push(p.id);
    }
    ids
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_create_defaults() {
    let (gm, _) = game_master();

    let ladder = gm
        .tournaments()
        .create_tournament(CreateTournamentInput::new("  Club Ladder  ", TournamentMode::Ladder))
        .await
        .unwrap();
    assert_eq!(ladder.name, "Club Ladder");
    assert_eq!(ladder.status, TournamentStatus::Draft);
    assert_eq!(ladder.settings.ladder_type, Some(LadderType::Points));
    assert!(ladder.layout.is_none());
    assert!(!ladder.archived);

    let bracket = gm
        .tournaments()
        .create_tournament(
            CreateTournamentInput::new("Cup", TournamentMode::SingleElim)
                .with_ladder_type(LadderType::Time),
        )
        .await
        .unwrap();
    assert_eq!(bracket.settings.ladder_type, None);
}

#[tokio::test]
async fn test_create_validates_input() {
    let (gm, _) = game_master();

    let err = gm
        .tournaments()
        .create_tournament(CreateTournamentInput::new("   ", TournamentMode::SingleElim))
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidInput(_)));

    let mut input = CreateTournamentInput::new("Backwards", TournamentMode::SingleElim);
    input.start_date = Some(date(2026, 5, 10));
    input.end_date = Some(date(2026, 5, 9));
    let err = gm.tournaments().create_tournament(input).await.unwrap_err();
    assert!(matches!(err, TournamentError::InvalidInput(_)));

    // A one-day event stores no end date
    let mut input = CreateTournamentInput::new("One Day", TournamentMode::SingleElim);
    input.start_date = Some(date(2026, 5, 10));
    input.end_date = Some(date(2026, 5, 10));
    let one_day = gm.tournaments().create_tournament(input).await.unwrap();
    assert_eq!(one_day.start_date, Some(date(2026, 5, 10)));
    assert_eq!(one_day.end_date, None);

    assert!(gm.tournaments().list_tournaments().await.unwrap().len() == 1);
}

#[tokio::test]
async fn test_duplicate_entries_collapse() {
    let (gm, _) = game_master();
    let ids = entrants(&gm, 2).await;

    let tournament = gm
        .tournaments()
        .create_tournament(
            CreateTournamentInput::new("Dupes", TournamentMode::SingleElim)
                .with_participants(vec![ids[0], ids[1], ids[0]]),
        )
        .await
        .unwrap();
    assert_eq!(tournament.participant_ids, ids);

    let again = gm
        .tournaments()
        .add_participant(tournament.id, ids[1])
        .await
        .unwrap();
    assert_eq!(again.participant_ids, ids);
}

#[tokio::test]
async fn test_entry_list_locked_after_start() {
    let (gm, _) = game_master();
    let ids = entrants(&gm, 3).await;

    let tournament = gm
        .tournaments()
        .create_tournament(
            CreateTournamentInput::new("Locked", TournamentMode::SingleElim)
                .with_participants(ids[..2].to_vec()),
        )
        .await
        .unwrap();

    let tournament = gm
        .tournaments()
        .add_participant(tournament.id, ids[2])
        .await
        .unwrap();
    assert_eq!(tournament.participant_ids.len(), 3);

    let tournament = gm
        .tournaments()
        .remove_participant(tournament.id, ids[0])
        .await
        .unwrap();
    assert_eq!(tournament.participant_ids, vec![ids[1], ids[2]]);

    let err = gm
        .tournaments()
        .remove_participant(tournament.id, ids[0])
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::ParticipantNotEntered { .. }));

    gm.start_tournament(tournament.id).await.unwrap();

    let err = gm
        .tournaments()
        .add_participant(tournament.id, ids[0])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TournamentError::InvalidState {
            expected: TournamentStatus::Draft,
            actual: TournamentStatus::Active
        }
    ));

    let err = gm.start_tournament(tournament.id).await.unwrap_err();
    assert!(matches!(err, TournamentError::InvalidState { .. }));
}

#[tokio::test]
async fn test_list_most_recently_updated_first() {
    let (gm, _) = game_master();

    let first = gm
        .tournaments()
        .create_tournament(CreateTournamentInput::new("First", TournamentMode::Ladder))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = gm
        .tournaments()
        .create_tournament(CreateTournamentInput::new("Second", TournamentMode::Ladder))
        .await
        .unwrap();

    let listed: Vec<_> = gm
        .tournaments()
        .list_tournaments()
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(listed, vec![second.id, first.id]);

    tokio::time::sleep(Duration::from_millis(5)).await;
    let archived = gm.tournaments().set_archived(first.id, true).await.unwrap();
    assert!(archived.archived);

    let listed: Vec<_> = gm
        .tournaments()
        .list_tournaments()
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(listed, vec![first.id, second.id]);

    let unarchived = gm.tournaments().set_archived(first.id, false).await.unwrap();
    assert!(!unarchived.archived);
}

#[tokio::test]
async fn test_revert_to_draft_discards_matches() {
    let (gm, repo) = game_master();
    let ids = entrants(&gm, 4).await;

    let tournament = gm
        .tournaments()
        .create_tournament(
            CreateTournamentInput::new("Redo", TournamentMode::DoubleElim).with_participants(ids),
        )
        .await
        .unwrap();

    let err = gm
        .tournaments()
        .revert_to_draft(tournament.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidState { .. }));

    gm.start_tournament(tournament.id).await.unwrap();
    assert!(repo.match_count().await > 0);

    let reverted = gm.tournaments().revert_to_draft(tournament.id).await.unwrap();
    assert_eq!(reverted.status, TournamentStatus::Draft);
    assert!(reverted.layout.is_none());
    assert!(reverted.now_playing.is_none());
    assert_eq!(repo.match_count().await, 0);

    let restarted = gm.start_tournament(tournament.id).await.unwrap();
    assert!(restarted.now_playing.is_some());
}

#[tokio::test]
async fn test_delete_cascades_to_matches() {
    let (gm, repo) = game_master();
    let ids = entrants(&gm, 5).await;

    let tournament = gm
        .tournaments()
        .create_tournament(
            CreateTournamentInput::new("Gone", TournamentMode::SingleElim).with_participants(ids),
        )
        .await
        .unwrap();
    gm.start_tournament(tournament.id).await.unwrap();
    assert_eq!(
        repo.get_matches_for_tournament(tournament.id)
            .await
            .unwrap()
            .len(),
        7
    );

    gm.tournaments().delete_tournament(tournament.id).await.unwrap();
    assert_eq!(repo.match_count().await, 0);

    let err = gm
        .tournaments()
        .get_tournament(tournament.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotFound(_)));

    let err = gm.matches(tournament.id).await.unwrap_err();
    assert!(matches!(err, TournamentError::NotFound(_)));
}

#[tokio::test]
async fn test_participant_lifecycle() {
    let (gm, _) = game_master();

    let pair = gm
        .participants()
        .create_participant(
            "Net Result",
            ParticipantKind::Pair,
            vec![TeamMember::new("Ana"), TeamMember::new("Bo")],
        )
        .await
        .unwrap();
    assert_eq!(pair.kind, ParticipantKind::Pair);
    assert_eq!(pair.members.len(), 2);

    let renamed = gm
        .participants()
        .update_participant(pair.id, Some("Net Gain"), None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Net Gain");
    assert_eq!(renamed.members.len(), 2);

    let fetched = gm
        .participants()
        .get_participants(&[pair.id])
        .await
        .unwrap();
    assert_eq!(fetched, vec![renamed]);

    gm.participants().delete_participant(pair.id).await.unwrap();
    let err = gm.participants().get_participant(pair.id).await.unwrap_err();
    assert!(matches!(err, TournamentError::ParticipantNotFound(_)));
}
