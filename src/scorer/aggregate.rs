use super::types::ScoreBreakdown;
use crate::config::ScoreBounds;

/// Baseline plus every adjustment, before clipping.
pub fn raw_total(b: &ScoreBreakdown, baseline: i32) -> i32 {
    [
        b.density,
        b.altitude,
        b.nightlife,
        b.sleep_debt,
        b.circadian,
        b.rest_time,
    ]
    .iter()
    .fold(baseline, |acc, delta| acc.saturating_add(*delta))
}

/// Upper clip always applies; the lower one only when configured.
pub fn clip(total: i32, bounds: &ScoreBounds) -> i32 {
    let capped = total.min(bounds.score_ceiling);
    match bounds.score_floor {
        Some(floor) => capped.max(floor),
        None => capped,
    }
}

/// Fills `raw_total` and `final_score` from the adjustments already set.
pub fn finalize(b: &mut ScoreBreakdown, bounds: &ScoreBounds) {
    b.raw_total = raw_total(b, bounds.baseline);
    b.final_score = clip(b.raw_total, bounds);
}
