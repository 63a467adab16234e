use crate::error::RuleFailure;
use crate::resolver::LocationCache;
use crate::schedule::GameRecord;
use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Instant at which venue UTC offsets are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetClock {
    /// One instant for the whole run. Results drift across DST changes
    /// between runs but never within one.
    Fixed(DateTime<Utc>),
    /// The current game's kickoff.
    GameStart,
}

impl OffsetClock {
    fn instant_for(&self, curr: &GameRecord) -> Result<DateTime<Utc>, RuleFailure> {
        match self {
            Self::Fixed(at) => Ok(*at),
            Self::GameStart => curr
                .start_instant
                .map(|s| s.with_timezone(&Utc))
                .ok_or_else(|| RuleFailure::Arithmetic("missing kickoff".to_string())),
        }
    }
}

/// Signed UTC offset in hours, fractional for half-hour zones.
pub fn utc_offset_hours(tz: Tz, at: DateTime<Utc>) -> f64 {
    let offset = tz.offset_from_utc_datetime(&at.naive_utc());
    offset.fix().local_minus_utc() as f64 / 3600.0
}

/// Pulls debt toward zero by whole rest days without crossing it.
pub fn decay(candidate: f64, elapsed_days: i64) -> f64 {
    let days = elapsed_days as f64;
    if candidate > 0.0 {
        (candidate - days).max(0.0)
    } else if candidate < 0.0 {
        (candidate + days).min(0.0)
    } else {
        candidate
    }
}

/// One fold step: debt carried into `curr` given the debt at `prev`.
pub fn step(
    prev_debt: f64,
    prev: &GameRecord,
    curr: &GameRecord,
    prev_tz: Option<Tz>,
    curr_tz: Option<Tz>,
    clock: &OffsetClock,
) -> Result<f64, RuleFailure> {
    let prev_tz = prev_tz.ok_or_else(|| RuleFailure::Resolution(format!("timezone for {}", prev.venue)))?;
    let curr_tz = curr_tz.ok_or_else(|| RuleFailure::Resolution(format!("timezone for {}", curr.venue)))?;

    let at = clock.instant_for(curr)?;
    let tz_diff = utc_offset_hours(curr_tz, at) - utc_offset_hours(prev_tz, at);
    let candidate = prev_debt + tz_diff;

    let (prev_start, curr_start) = match (prev.start_instant, curr.start_instant) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(RuleFailure::Arithmetic("missing kickoff".to_string())),
    };
    // num_days truncates toward zero
    let elapsed_days = curr_start.signed_duration_since(prev_start).num_days();

    let next = decay(candidate, elapsed_days);
    if !next.is_finite() {
        return Err(RuleFailure::Arithmetic(format!("non-finite debt {}", next)));
    }
    Ok(next)
}

/// Sequential fold over a timeline. `state[0]` is always zero; a failed
/// step freezes the previous value.
pub fn accumulate(
    entity: &str,
    records: &[GameRecord],
    clock: &OffsetClock,
    cache: &LocationCache,
) -> Vec<f64> {
    let mut state = Vec::with_capacity(records.len());
    if records.is_empty() {
        return state;
    }
    state.push(0.0);

    for idx in 1..records.len() {
        let prev_debt = state[idx - 1];
        let prev = &records[idx - 1];
        let curr = &records[idx];
        let next = match step(
            prev_debt,
            prev,
            curr,
            super::venue_timezone(prev, cache),
            super::venue_timezone(curr, cache),
            clock,
        ) {
            Ok(v) => v,
            Err(e) => {
                warn!(entity, index = idx, rule = "sleep_debt", error = %e, "Sleep debt carried forward");
                prev_debt
            }
        };
        state.push(next);
    }

    state
}

/// `-k * |trunc(debt)|`
pub fn penalty(debt: f64, per_hour: i32) -> i32 {
    (debt.trunc().abs() as i32)
        .saturating_mul(per_hour)
        .saturating_neg()
}
