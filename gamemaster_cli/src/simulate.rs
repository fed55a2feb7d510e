//! Full tournament simulation with generated participants and scores.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use gamemaster::db::Repository;
use gamemaster::ladder::LadderStanding;
use gamemaster::participant::{ParticipantId, ParticipantKind, TeamMember};
use gamemaster::tournament::{CreateTournamentInput, Tournament, TournamentMode, TournamentStatus};
use gamemaster::{EngineEvent, GameMaster, Podium, RecordingSink};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CliConfig;

/// Upper bound on reported results, well above any bracket's match count
const MAX_REPORTS: usize = 8 * crate::config::MAX_PARTICIPANTS;

/// Outcome of one simulated tournament
pub struct Summary {
    pub tournament: Tournament,
    pub podium: Podium,
    /// Final ladder standings, empty for brackets
    pub standings: Vec<LadderStanding>,
    pub names: HashMap<ParticipantId, String>,
    pub reported: usize,
    pub byes: usize,
}

impl Summary {
    pub fn name_of(&self, id: Option<ParticipantId>) -> &str {
        id.and_then(|id| self.names.get(&id))
            .map(String::as_str)
            .unwrap_or("-")
    }
}

/// Generated result for a head-to-head match, never a draw
fn random_scores(rng: &mut StdRng) -> (i64, i64) {
    let winner = rng.random_range(1..=10);
    let loser = rng.random_range(0..winner);
    if rng.random_bool(0.5) {
        (winner, loser)
    } else {
        (loser, winner)
    }
}

/// Create participants, run the tournament to completion and collect results
pub async fn run(config: &CliConfig, repo: Arc<dyn Repository>) -> Result<Summary> {
    let sink = RecordingSink::new();
    let gm = GameMaster::with_events(repo, config.engine.clone(), Arc::new(sink.clone()));
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let kind = if config.mode == TournamentMode::DoubleElim {
        ParticipantKind::Pair
    } else {
        ParticipantKind::Individual
    };

    let mut names = HashMap::new();
    let mut ids = Vec::with_capacity(config.participants);
    for i in 1..=config.participants {
        let members = match kind {
            ParticipantKind::Pair => vec![
                TeamMember::new(format!("Player {}a", i)),
                TeamMember::new(format!("Player {}b", i)),
            ],
            ParticipantKind::Individual => Vec::new(),
        };
        let participant = gm
            .participants()
            .create_participant(&format!("Entrant {i}"), kind, members)
            .await?;
        names.insert(participant.id, participant.display_name());
        ids.push(participant.id);
    }

    let mut input = CreateTournamentInput::new(format!("Simulated {}", config.mode), config.mode)
        .with_participants(ids.clone());
    input.participant_kind = kind;
    if config.mode == TournamentMode::Ladder {
        input = input.with_ladder_type(config.ladder_type);
    }
    let tournament = gm.tournaments().create_tournament(input).await?;
    let mut tournament = gm
        .start_tournament(tournament.id)
        .await
        .context("Failed to start tournament")?;
    info!(
        "Started {} tournament {} with {} participants",
        tournament.mode,
        tournament.id,
        ids.len()
    );

    let mut reported = 0;
    match config.mode {
        TournamentMode::Ladder => {
            for round in 0..config.ladder_rounds {
                for id in &ids {
                    let value = rng.random_range(10..=500);
                    let outcome = gm
                        .report_ladder_score(tournament.id, *id, value, None)
                        .await?;
                    reported += 1;
                    debug!(
                        "Round {}: {} submitted {} (stored: {})",
                        round + 1,
                        names[id],
                        value,
                        outcome.is_recorded()
                    );
                }
            }
            tournament = gm.tournaments().complete_ladder(tournament.id).await?;
        }
        TournamentMode::SingleElim | TournamentMode::DoubleElim => {
            while let Some(match_id) = tournament.now_playing {
                if reported >= MAX_REPORTS {
                    bail!("Tournament {} did not finish", tournament.id);
                }
                let (score_a, score_b) = random_scores(&mut rng);
                tournament = gm
                    .report_match(tournament.id, match_id, score_a, score_b)
                    .await
                    .with_context(|| format!("Failed to report match {match_id}"))?;
                reported += 1;
                println!("  match {:>3}: {} - {}", reported, score_a, score_b);
            }
        }
    }

    if tournament.status != TournamentStatus::Completed {
        bail!(
            "Tournament {} stopped in state {}",
            tournament.id,
            tournament.status
        );
    }

    let byes = sink
        .events()
        .iter()
        .filter(|e| matches!(e, EngineEvent::ByeResolved { .. }))
        .count();
    let podium = gm.podium(tournament.id).await?;
    let standings = match tournament.mode {
        TournamentMode::Ladder => gm.compute_ladder_standings(tournament.id).await?,
        _ => Vec::new(),
    };
    info!("Tournament {} completed after {} reports", tournament.id, reported);

    Ok(Summary {
        tournament,
        podium,
        standings,
        names,
        reported,
        byes,
    })
}

/// Print final standings (ladder) and the podium
pub fn print_summary(summary: &Summary) {
    let tournament = &summary.tournament;
    println!();
    println!("{} ({})", tournament.name, tournament.id);
    println!(
        "  {} results reported, {} byes resolved",
        summary.reported, summary.byes
    );

    if tournament.mode == TournamentMode::Ladder {
        println!();
        println!("  Standings ({}):", tournament.ladder_type());
        for row in &summary.standings {
            let score = row
                .score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>4}. {:<24} {:>6}",
                row.rank,
                summary.name_of(Some(row.participant_id)),
                score
            );
        }
    }

    if let Some(bracket) = tournament.double_bracket()
        && bracket.is_reset
    {
        println!("  Grand final went to a bracket reset");
    }

    println!();
    println!("  Champion:  {}", summary.name_of(summary.podium.first));
    println!("  Runner-up: {}", summary.name_of(summary.podium.second));
    let third: Vec<&str> = summary
        .podium
        .third
        .iter()
        .map(|id| summary.name_of(Some(*id)))
        .collect();
    if !third.is_empty() {
        println!("  Third:     {}", third.join(", "));
    }
}
