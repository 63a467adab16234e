use super::hours_to_duration;
use super::types::CircadianBand;
use crate::config::{CircadianBands, ScoringWeights};
use crate::error::RuleFailure;
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

/// Kickoff as the players' bodies feel it: local kickoff shifted by the
/// running sleep debt, as `hour + minute / 60`.
pub fn body_clock_hour(local_start: DateTime<Tz>, debt_hours: f64) -> Result<f64, RuleFailure> {
    let shifted = local_start
        .checked_add_signed(hours_to_duration(debt_hours)?)
        .ok_or_else(|| RuleFailure::Arithmetic("body clock out of range".to_string()))?;
    Ok(shifted.hour() as f64 + shifted.minute() as f64 / 60.0)
}

/// Both bands are inclusive at each end.
pub fn classify(hour: f64, bands: &CircadianBands) -> CircadianBand {
    if bands.handicapped_start <= hour && hour <= bands.handicapped_end {
        CircadianBand::Handicapped
    } else if bands.optimal_start <= hour && hour <= bands.optimal_end {
        CircadianBand::Optimal
    } else {
        CircadianBand::Neutral
    }
}

pub fn adjustment(band: CircadianBand, w: &ScoringWeights) -> i32 {
    match band {
        CircadianBand::Handicapped => w.penalty_handicapped_hours,
        CircadianBand::Optimal => w.bonus_optimal_hours,
        CircadianBand::Neutral => 0,
    }
}
