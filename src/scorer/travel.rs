use super::hours_to_duration;
use crate::config::TravelParams;
use crate::error::RuleFailure;
use crate::geo::Coordinates;
use crate::schedule::GameRecord;
use chrono::DateTime;
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestEstimate {
    /// `None` when either venue had no coordinates; the flight then counts
    /// as zero hours.
    pub distance_miles: Option<f64>,
    pub flight_hours: f64,
    pub arrival: DateTime<Tz>,
    pub rest_hours: f64,
}

/// Everything the estimator needs about one side of a game pair.
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    pub record: &'a GameRecord,
    pub local_start: Option<DateTime<Tz>>,
    pub coordinates: Option<Coordinates>,
    pub timezone: Option<Tz>,
}

/// Rest between the end of `from` and the kickoff of `to`, allowing for a
/// post-game buffer, a straight-line flight and ground transit.
pub fn estimate_rest(from: &Leg, to: &Leg, params: &TravelParams) -> Result<RestEstimate, RuleFailure> {
    let from_start = from
        .local_start
        .ok_or_else(|| RuleFailure::Arithmetic("missing kickoff".to_string()))?;
    let to_start = to
        .local_start
        .ok_or_else(|| RuleFailure::Arithmetic("missing next kickoff".to_string()))?;

    if params.flight_speed_mph.is_nan() || params.flight_speed_mph <= 0.0 {
        return Err(RuleFailure::Arithmetic(format!(
            "flight speed must be positive, got {}",
            params.flight_speed_mph
        )));
    }

    let game_end = from_start
        .checked_add_signed(from.record.duration)
        .and_then(|t| t.checked_add_signed(hours_to_duration(params.post_game_buffer_hours).ok()?))
        .ok_or_else(|| RuleFailure::Arithmetic("game end out of range".to_string()))?;

    let distance_miles = match (from.coordinates, to.coordinates) {
        (Some(a), Some(b)) => Some(a.miles_to(&b)),
        _ => None,
    };
    let flight_hours = distance_miles.map_or(0.0, |d| d / params.flight_speed_mph);
    let travel = hours_to_duration(flight_hours + params.ground_buffer_hours)?;

    let landed = game_end
        .checked_add_signed(travel)
        .ok_or_else(|| RuleFailure::Arithmetic("arrival out of range".to_string()))?;
    let arrival = match to.timezone {
        Some(tz) => landed.with_timezone(&tz),
        None => landed.with_timezone(&to_start.timezone()),
    };

    let rest = to_start.signed_duration_since(arrival);
    let rest_hours = rest.num_milliseconds() as f64 / 3_600_000.0;

    Ok(RestEstimate {
        distance_miles,
        flight_hours,
        arrival,
        rest_hours,
    })
}

pub fn penalty(rest_hours: f64, threshold_hours: f64, magnitude: i32) -> i32 {
    if rest_hours < threshold_hours {
        magnitude
    } else {
        0
    }
}
