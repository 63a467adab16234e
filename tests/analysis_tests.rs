mod common;

use common::*;
use sleepscore::analysis::{lopsided_matchups, summarize, ScoredGame};
use sleepscore::schedule::{GameRecord, Outcome};
use sleepscore::scorer::ScoreBreakdown;

fn side(team: &str, game_id: u64, home: bool, outcome: Outcome) -> GameRecord {
    let mut r = game(team, "2024-01-10", 19, 0, boston());
    r.game_id = Some(game_id);
    r.is_home = home;
    r.outcome = Some(outcome);
    r
}

fn scored(score: i32) -> ScoreBreakdown {
    ScoreBreakdown {
        final_score: score,
        raw_total: score,
        ..Default::default()
    }
}

#[test]
fn test_summary_buckets_and_loss_ratio() {
    let records = vec![
        side("A", 1, true, Outcome::Win),
        side("B", 1, false, Outcome::Loss),
        side("A", 2, true, Outcome::Loss),
        side("B", 2, false, Outcome::Win),
    ];
    let scores = vec![scored(100), scored(50), scored(85), scored(-20)];
    let games: Vec<ScoredGame> = records
        .iter()
        .zip(scores.iter())
        .map(|(record, breakdown)| ScoredGame { record, breakdown })
        .collect();

    let summary = summarize(&games, 100);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.above_baseline, 0);

    // 50 (L), 85 (L), -20 (W)
    assert_eq!(summary.below_baseline.games, 3);
    assert_eq!(summary.below_baseline.losses, 2);
    assert!((summary.below_baseline.loss_ratio() - 200.0 / 3.0).abs() < 1e-9);

    let bucket = |low: i32| summary.buckets.iter().find(|b| b.low == low).unwrap().tally;
    assert_eq!(bucket(80).games, 1);
    assert_eq!(bucket(40).losses, 1);
    assert_eq!(bucket(0).games, 0);
    // 100 and -20 land in no bucket
    let bucketed: usize = summary.buckets.iter().map(|b| b.tally.games).sum();
    assert_eq!(bucketed, 2);
}

#[test]
fn test_lopsided_matchups() {
    let records = vec![
        side("Heat", 1, true, Outcome::Win),
        side("Celtics", 1, false, Outcome::Loss),
        side("Heat", 2, true, Outcome::Win),
        side("Celtics", 2, false, Outcome::Loss),
        side("Heat", 3, false, Outcome::Loss),
        side("Nuggets", 3, true, Outcome::Win),
        // Opponent missing from the file
        side("Heat", 4, true, Outcome::Win),
    ];
    let scores = vec![
        scored(100),
        scored(40),
        scored(100),
        scored(70),
        scored(60),
        scored(100),
        scored(100),
    ];
    let games: Vec<ScoredGame> = records
        .iter()
        .zip(scores.iter())
        .map(|(record, breakdown)| ScoredGame { record, breakdown })
        .collect();

    let found = lopsided_matchups(&games, 40, 60, 100);
    let ids: Vec<u64> = found.iter().map(|m| m.game_id).collect();
    assert_eq!(ids, vec![1, 3]);

    assert_eq!(found[0].home, "Heat");
    assert_eq!(found[0].visitor, "Celtics");
    assert_eq!(found[0].visitor_score, 40);
    assert_eq!(found[1].home_score, 100);
    assert_eq!(found[1].visitor_score, 60);
}
