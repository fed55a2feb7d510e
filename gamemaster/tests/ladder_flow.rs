//! Integration tests for ladder tournaments

use gamemaster::db::MemoryRepository;
use gamemaster::ladder::{Direction, ScoreOutcome};
use gamemaster::participant::{ParticipantId, ParticipantKind};
use gamemaster::tournament::{
    CreateTournamentInput, LadderType, Tournament, TournamentError, TournamentMode,
    TournamentStatus,
};
use gamemaster::{EngineConfig, EngineEvent, GameMaster, RecordingSink};
use std::sync::Arc;

async fn setup(n: usize, ladder_type: LadderType) -> (GameMaster, RecordingSink, Tournament) {
    let sink = RecordingSink::new();
    let gm = GameMaster::with_events(
        Arc::new(MemoryRepository::new()),
        EngineConfig::default(),
        Arc::new(sink.clone()),
    );

    let mut ids: Vec<ParticipantId> = Vec::new();
    for i in 0..n {
        let p = gm
            .participants()
            .create_participant(&format!("Runner {i}"), ParticipantKind::Individual, vec![])
            .await
            .expect("create participant");
        ids.push(p.id);
    }

    let tournament = gm
        .tournaments()
        .create_tournament(
            CreateTournamentInput::new("Weekly Ladder", TournamentMode::Ladder)
                .with_participants(ids)
                .with_ladder_type(ladder_type),
        )
        .await
        .expect("create tournament");
    let tournament = gm.start_ladder_tournament(tournament.id).await.expect("start");
    (gm, sink, tournament)
}

fn order(standings: &[gamemaster::ladder::LadderStanding]) -> Vec<ParticipantId> {
    standings.iter().map(|s| s.participant_id).collect()
}

#[tokio::test]
async fn test_start_sets_ladder_order() {
    let (_, sink, tournament) = setup(3, LadderType::Points).await;

    assert_eq!(tournament.status, TournamentStatus::Active);
    assert_eq!(
        tournament.ladder_order(),
        Some(tournament.participant_ids.as_slice())
    );
    assert!(tournament.now_playing.is_none());
    assert!(matches!(
        sink.events().first(),
        Some(EngineEvent::TournamentStarted {
            mode: TournamentMode::Ladder,
            participants: 3,
            ..
        })
    ));
}

#[tokio::test]
async fn test_points_latest_submission_counts() {
    let (gm, _, tournament) = setup(3, LadderType::Points).await;
    let ids = tournament.participant_ids.clone();

    for (pid, value) in [(ids[0], 40), (ids[1], 25), (ids[0], 10)] {
        let outcome = gm
            .report_ladder_score(tournament.id, pid, value, None)
            .await
            .unwrap();
        assert!(outcome.is_recorded());
    }

    let standings = gm.compute_ladder_standings(tournament.id).await.unwrap();
    assert_eq!(order(&standings), vec![ids[1], ids[0], ids[2]]);
    assert_eq!(standings[0].score, Some(25));
    assert_eq!(standings[1].score, Some(10));
    assert_eq!(standings[2].score, None);
    assert_eq!(
        standings.iter().map(|s| s.rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let history = gm.ladder_history(tournament.id, ids[0]).await.unwrap();
    assert_eq!(
        history.iter().map(|m| m.score_a).collect::<Vec<_>>(),
        vec![10, 40]
    );
}

#[tokio::test]
async fn test_points_accepts_negative_values() {
    let (gm, _, tournament) = setup(3, LadderType::Points).await;
    let ids = tournament.participant_ids.clone();

    for (pid, value) in [(ids[0], -5), (ids[1], 3), (ids[2], -12)] {
        let outcome = gm
            .report_ladder_score(tournament.id, pid, value, None)
            .await
            .unwrap();
        assert!(outcome.is_recorded());
    }

    let standings = gm.compute_ladder_standings(tournament.id).await.unwrap();
    assert_eq!(order(&standings), vec![ids[1], ids[0], ids[2]]);
    assert_eq!(standings[1].score, Some(-5));
    assert_eq!(standings[2].score, Some(-12));

    gm.report_ladder_score(tournament.id, ids[1], -20, None)
        .await
        .unwrap();
    let standings = gm.compute_ladder_standings(tournament.id).await.unwrap();
    assert_eq!(order(&standings), vec![ids[0], ids[2], ids[1]]);
    assert_eq!(standings[2].score, Some(-20));
}

#[tokio::test]
async fn test_time_only_improvements_are_stored() {
    let (gm, _, tournament) = setup(2, LadderType::Time).await;
    let ids = tournament.participant_ids.clone();

    gm.report_ladder_score(tournament.id, ids[0], 95, None)
        .await
        .unwrap();
    let before = gm.compute_ladder_standings(tournament.id).await.unwrap();
    let records_before = gm.matches(tournament.id).await.unwrap().len();

    for slower in [95, 120] {
        let outcome = gm
            .report_ladder_score(tournament.id, ids[0], slower, None)
            .await
            .unwrap();
        assert_eq!(outcome, ScoreOutcome::NotImproved { current_best: 95 });
    }
    assert_eq!(gm.compute_ladder_standings(tournament.id).await.unwrap(), before);
    assert_eq!(gm.matches(tournament.id).await.unwrap().len(), records_before);

    let outcome = gm
        .report_ladder_score(tournament.id, ids[0], 90, None)
        .await
        .unwrap();
    assert!(outcome.is_recorded());
    let after = gm.compute_ladder_standings(tournament.id).await.unwrap();
    assert_eq!(after[0].score, Some(90));
}

#[tokio::test]
async fn test_time_ranks_lowest_first() {
    let (gm, _, tournament) = setup(3, LadderType::Time).await;
    let ids = tournament.participant_ids.clone();

    gm.report_ladder_score(tournament.id, ids[0], 300, None)
        .await
        .unwrap();
    gm.report_ladder_score(tournament.id, ids[2], 250, None)
        .await
        .unwrap();

    let standings = gm.compute_ladder_standings(tournament.id).await.unwrap();
    assert_eq!(order(&standings), vec![ids[2], ids[0], ids[1]]);
}

#[tokio::test]
async fn test_report_rejections() {
    let (gm, _, tournament) = setup(2, LadderType::Points).await;

    let outsider = uuid::Uuid::new_v4();
    let err = gm
        .report_ladder_score(tournament.id, outsider, 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::ParticipantNotEntered { .. }));

    let draft = gm
        .tournaments()
        .create_tournament(
            CreateTournamentInput::new("Not started", TournamentMode::Ladder)
                .with_participants(tournament.participant_ids.clone()),
        )
        .await
        .unwrap();
    let err = gm
        .report_ladder_score(draft.id, tournament.participant_ids[0], 5, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TournamentError::InvalidState {
            expected: TournamentStatus::Active,
            actual: TournamentStatus::Draft
        }
    ));
}

#[tokio::test]
async fn test_reorder_tie_group() {
    let (gm, sink, tournament) = setup(4, LadderType::Points).await;
    let ids = tournament.participant_ids.clone();

    for pid in &ids[..3] {
        gm.report_ladder_score(tournament.id, *pid, 50, None)
            .await
            .unwrap();
    }

    // ids[0] is already on top of the tie group
    let none = gm
        .reorder_tie_group(tournament.id, ids[0], Direction::Up)
        .await
        .unwrap();
    assert!(none.is_none());

    // ids[2] is the last tied participant; ids[3] has no score
    let none = gm
        .reorder_tie_group(tournament.id, ids[2], Direction::Down)
        .await
        .unwrap();
    assert!(none.is_none());

    let none = gm
        .reorder_tie_group(tournament.id, ids[3], Direction::Up)
        .await
        .unwrap();
    assert!(none.is_none());

    let updated = gm
        .reorder_tie_group(tournament.id, ids[2], Direction::Up)
        .await
        .unwrap()
        .expect("tie partner above");
    assert_eq!(
        updated.ladder_order(),
        Some([ids[0], ids[2], ids[1], ids[3]].as_slice())
    );

    let standings = gm.compute_ladder_standings(tournament.id).await.unwrap();
    assert_eq!(order(&standings), vec![ids[0], ids[2], ids[1], ids[3]]);
    assert!(
        sink.events()
            .iter()
            .any(|e| matches!(e, EngineEvent::TieOrderChanged { .. }))
    );

    // A later score breaks the tie regardless of manual order
    gm.report_ladder_score(tournament.id, ids[1], 70, None)
        .await
        .unwrap();
    let standings = gm.compute_ladder_standings(tournament.id).await.unwrap();
    assert_eq!(order(&standings), vec![ids[1], ids[0], ids[2], ids[3]]);
}

#[tokio::test]
async fn test_complete_ladder_and_podium() {
    let (gm, sink, tournament) = setup(4, LadderType::Points).await;
    let ids = tournament.participant_ids.clone();

    for (pid, value) in [(ids[3], 12), (ids[1], 30), (ids[2], 18)] {
        gm.report_ladder_score(tournament.id, pid, value, None)
            .await
            .unwrap();
    }

    let completed = gm.tournaments().complete_ladder(tournament.id).await.unwrap();
    assert_eq!(completed.status, TournamentStatus::Completed);
    assert_eq!(gm.champion(tournament.id).await.unwrap(), Some(ids[1]));

    let podium = gm.podium(tournament.id).await.unwrap();
    assert_eq!(podium.first, Some(ids[1]));
    assert_eq!(podium.second, Some(ids[2]));
    assert_eq!(podium.third, vec![ids[3]]);

    assert!(sink.events().iter().any(|e| matches!(
        e,
        EngineEvent::TournamentCompleted { champion_id: Some(id), .. } if *id == ids[1]
    )));

    let err = gm
        .report_ladder_score(tournament.id, ids[0], 99, None)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidState { .. }));
}

#[tokio::test]
async fn test_ladder_starts_without_participants() {
    let gm = GameMaster::new(Arc::new(MemoryRepository::new()), EngineConfig::default());
    let tournament = gm
        .tournaments()
        .create_tournament(CreateTournamentInput::new("Empty", TournamentMode::Ladder))
        .await
        .unwrap();

    let started = gm.start_tournament(tournament.id).await.unwrap();
    assert_eq!(started.status, TournamentStatus::Active);
    assert!(gm.compute_ladder_standings(tournament.id).await.unwrap().is_empty());
}
