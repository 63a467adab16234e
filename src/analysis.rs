use crate::scorer::{ScoreBreakdown, TimelineScores};
use crate::schedule::{GameRecord, Outcome, Timeline};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Half-open `[low, high)` score bands for the distribution report.
pub const SCORE_BUCKETS: [(i32, i32); 5] = [(80, 100), (60, 80), (40, 60), (20, 40), (0, 20)];

#[derive(Debug, Clone, Copy)]
pub struct ScoredGame<'a> {
    pub record: &'a GameRecord,
    pub breakdown: &'a ScoreBreakdown,
}

/// Lines up each record with its breakdown. `scores` must come from scoring
/// `timelines` in the same order.
pub fn pair_up<'a>(timelines: &'a [Timeline], scores: &'a [TimelineScores]) -> Vec<ScoredGame<'a>> {
    timelines
        .iter()
        .zip(scores.iter())
        .flat_map(|(t, s)| {
            debug_assert_eq!(t.entity_id(), s.entity_id);
            t.records()
                .iter()
                .zip(s.breakdowns.iter())
                .map(|(record, breakdown)| ScoredGame { record, breakdown })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
}

impl OutcomeTally {
    fn add(&mut self, outcome: Option<Outcome>) {
        self.games += 1;
        match outcome {
            Some(Outcome::Win) => self.wins += 1,
            Some(Outcome::Loss) => self.losses += 1,
            None => {}
        }
    }

    /// Losses as a percentage of all games in the tally.
    pub fn loss_ratio(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.losses as f64 / self.games as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBucket {
    pub low: i32,
    pub high: i32,
    pub tally: OutcomeTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total: usize,
    pub above_baseline: usize,
    pub below_baseline: OutcomeTally,
    pub buckets: Vec<ScoreBucket>,
}

pub fn summarize(games: &[ScoredGame], baseline: i32) -> ScoreSummary {
    let mut below_baseline = OutcomeTally::default();
    let mut above_baseline = 0;
    let mut buckets: Vec<ScoreBucket> = SCORE_BUCKETS
        .iter()
        .map(|&(low, high)| ScoreBucket {
            low,
            high,
            tally: OutcomeTally::default(),
        })
        .collect();

    for g in games {
        let score = g.breakdown.final_score;
        if score > baseline {
            above_baseline += 1;
        }
        if score < baseline {
            below_baseline.add(g.record.outcome);
        }
        if let Some(bucket) = buckets.iter_mut().find(|b| b.low <= score && score < b.high) {
            bucket.tally.add(g.record.outcome);
        }
    }

    ScoreSummary {
        total: games.len(),
        above_baseline,
        below_baseline,
        buckets,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matchup {
    pub game_id: u64,
    pub date: NaiveDate,
    pub visitor: String,
    pub visitor_score: i32,
    pub home: String,
    pub home_score: i32,
}

/// Games where one side is worn down (score inside `[low, high]`) while the
/// other arrives at `rested` (normally the ceiling). Both perspectives of a
/// game must share a game id.
pub fn lopsided_matchups(games: &[ScoredGame], low: i32, high: i32, rested: i32) -> Vec<Matchup> {
    let mut sides: BTreeMap<u64, (Option<&ScoredGame>, Option<&ScoredGame>)> = BTreeMap::new();
    for g in games {
        let Some(id) = g.record.game_id else {
            continue;
        };
        let entry = sides.entry(id).or_default();
        if g.record.is_home {
            entry.0 = Some(g);
        } else {
            entry.1 = Some(g);
        }
    }

    let tired = |s: i32| low <= s && s <= high;

    let mut found: Vec<Matchup> = sides
        .into_iter()
        .filter_map(|(game_id, pair)| match pair {
            (Some(home), Some(visitor)) => Some((game_id, home, visitor)),
            _ => None,
        })
        .filter(|(_, home, visitor)| {
            let h = home.breakdown.final_score;
            let v = visitor.breakdown.final_score;
            (tired(h) && v == rested) || (tired(v) && h == rested)
        })
        .map(|(game_id, home, visitor)| Matchup {
            game_id,
            date: home.record.sequence_date,
            visitor: visitor.record.entity_id.clone(),
            visitor_score: visitor.breakdown.final_score,
            home: home.record.entity_id.clone(),
            home_score: home.breakdown.final_score,
        })
        .collect();

    found.sort_by(|a, b| a.date.cmp(&b.date).then(a.game_id.cmp(&b.game_id)));
    found
}
