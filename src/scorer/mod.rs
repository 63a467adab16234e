pub mod aggregate;
pub mod circadian;
pub mod density;
pub mod sleep_debt;
pub mod travel;
pub mod types;
pub mod venue;

use self::density::DensityRule;
use self::sleep_debt::OffsetClock;
use self::travel::Leg;
pub use self::types::{CircadianBand, DensityCounts, ScoreBreakdown, TimelineScores};
use self::venue::StaticModifiers;
use crate::config::{Config, OffsetReference};
use crate::error::{RuleFailure, SleepScoreError, SsResult};
use crate::resolver::LocationCache;
use crate::schedule::{GameRecord, Timeline};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The scoring engine. Holds validated config and a pre-filled location
/// cache; scoring itself performs no lookups or I/O.
#[derive(Clone)]
pub struct Scorer {
    pub config: Config,
    density: DensityRule,
    modifiers: StaticModifiers,
    clock: OffsetClock,
    cache: Arc<LocationCache>,
}

impl Scorer {
    pub fn new(config: Config, cache: LocationCache) -> SsResult<Self> {
        Self::with_shared_cache(config, Arc::new(cache))
    }

    pub fn with_shared_cache(config: Config, cache: Arc<LocationCache>) -> SsResult<Self> {
        config.bands.validate()?;

        let travel = &config.travel;
        if travel.flight_speed_mph.is_nan() || travel.flight_speed_mph <= 0.0 {
            return Err(SleepScoreError::Config(format!(
                "--flight-speed-mph must be positive, got {}",
                travel.flight_speed_mph
            )));
        }
        if config.weights.penalty_sleep_debt_per_hour < 0 {
            return Err(SleepScoreError::Config(format!(
                "--penalty-sleep-debt-per-hour is a magnitude and must not be negative, got {}",
                config.weights.penalty_sleep_debt_per_hour
            )));
        }
        if let Some(floor) = config.bounds.score_floor {
            if floor > config.bounds.score_ceiling {
                return Err(SleepScoreError::Config(format!(
                    "score floor {} is above ceiling {}",
                    floor, config.bounds.score_ceiling
                )));
            }
        }

        let density = DensityRule {
            window_days: config.windows.get_window_days()?,
            min_games: config.windows.get_window_min_games()?,
            penalty_single: config.weights.penalty_density_single,
            penalty_multiple: config.weights.penalty_density_multiple,
        };
        let modifiers = StaticModifiers::new(&config.venues, &config.weights);

        let clock = match config.clock.offset_reference {
            OffsetReference::RunStart => {
                let at = config.clock.get_evaluation_instant()?.unwrap_or_else(Utc::now);
                info!("🕒 Reading UTC offsets at {}", at.to_rfc3339());
                OffsetClock::Fixed(at)
            }
            OffsetReference::GameStart => OffsetClock::GameStart,
        };

        debug!(
            "Density tiers: {} / {}, rest rule {}",
            density.penalty_single,
            density.penalty_multiple,
            if config.weights.include_rest_time { "on" } else { "off" }
        );

        Ok(Self {
            config,
            density,
            modifiers,
            clock,
            cache,
        })
    }

    /// Scores every game of one timeline, in timeline order.
    pub fn score_timeline(&self, timeline: &Timeline) -> Vec<ScoreBreakdown> {
        let entity = timeline.entity_id();
        let records = timeline.records();

        // Sequential: state[i] needs state[i - 1].
        let debts = sleep_debt::accumulate(entity, records, &self.clock, &self.cache);

        // Everything else only reads the finished fold.
        (0..records.len())
            .into_par_iter()
            .map(|idx| self.breakdown(entity, records, &debts, idx))
            .collect()
    }

    /// Timelines are independent, so they are scored in parallel.
    pub fn score_season(&self, timelines: &[Timeline]) -> Vec<TimelineScores> {
        timelines
            .par_iter()
            .map(|t| TimelineScores {
                entity_id: t.entity_id().to_string(),
                breakdowns: self.score_timeline(t),
            })
            .collect()
    }

    fn breakdown(&self, entity: &str, records: &[GameRecord], debts: &[f64], idx: usize) -> ScoreBreakdown {
        let w = &self.config.weights;
        let record = &records[idx];
        let mut b = ScoreBreakdown {
            index: idx,
            ..Default::default()
        };

        // Density
        let counts = self.density.evaluate(records, idx);
        b.conditions_met = counts.conditions_met;
        b.density = self.density.penalty(counts.conditions_met);

        // Venue
        b.altitude = self.modifiers.altitude(&record.venue);
        b.nightlife = self.modifiers.nightlife(&record.venue);

        // Sleep debt
        b.running_sleep_debt = debts[idx];
        b.sleep_debt = sleep_debt::penalty(b.running_sleep_debt, w.penalty_sleep_debt_per_hour);

        // Circadian
        let local_start = self.local_start(record);
        if let Some(start) = local_start {
            match circadian::body_clock_hour(start, b.running_sleep_debt) {
                Ok(hour) => {
                    b.body_clock_hour = Some(hour);
                    b.circadian_band = circadian::classify(hour, &self.config.bands);
                    b.circadian = circadian::adjustment(b.circadian_band, w);
                }
                Err(e) => log_failure(entity, idx, "circadian", &e),
            }
        }

        // Rest
        if idx > 0 {
            b.hours_between_games = hours_between(&records[idx - 1], record);
        }
        if let Some(next) = records.get(idx + 1) {
            let from = self.leg(record);
            let to = self.leg(next);
            match travel::estimate_rest(&from, &to, &self.config.travel) {
                Ok(est) => {
                    if est.distance_miles.is_none() {
                        warn!(
                            entity,
                            index = idx,
                            rule = "rest_time",
                            from = %record.venue,
                            to = %next.venue,
                            "Coordinates unresolved, assuming no flight"
                        );
                    }
                    b.rest_hours = Some(est.rest_hours);
                    if w.include_rest_time {
                        b.rest_time =
                            travel::penalty(est.rest_hours, w.rest_threshold_hours, w.penalty_short_rest);
                    }
                }
                Err(e) => log_failure(entity, idx, "rest_time", &e),
            }
        }

        aggregate::finalize(&mut b, &self.config.bounds);
        b
    }

    fn local_start(&self, record: &GameRecord) -> Option<DateTime<Tz>> {
        let start = record.start_instant?;
        Some(match venue_timezone(record, &self.cache) {
            Some(tz) => start.with_timezone(&tz),
            None => start,
        })
    }

    fn leg<'a>(&self, record: &'a GameRecord) -> Leg<'a> {
        Leg {
            record,
            local_start: self.local_start(record),
            coordinates: self.cache.coordinates(&record.venue),
            timezone: venue_timezone(record, &self.cache),
        }
    }
}

/// The record's own zone wins over the resolver's.
pub fn venue_timezone(record: &GameRecord, cache: &LocationCache) -> Option<Tz> {
    record
        .venue_timezone
        .or_else(|| cache.timezone(&record.venue))
}

/// Plain gap from the end of `prev` to the kickoff of `curr`, no travel.
pub fn hours_between(prev: &GameRecord, curr: &GameRecord) -> Option<f64> {
    let prev_end = prev.end_instant()?;
    let curr_start = curr.start_instant?;
    Some(curr_start.signed_duration_since(prev_end).num_milliseconds() as f64 / 3_600_000.0)
}

pub(crate) fn hours_to_duration(hours: f64) -> Result<Duration, RuleFailure> {
    if !hours.is_finite() {
        return Err(RuleFailure::Arithmetic(format!("non-finite hours {}", hours)));
    }
    Duration::try_milliseconds((hours * 3_600_000.0).round() as i64)
        .ok_or_else(|| RuleFailure::Arithmetic(format!("{} hours out of range", hours)))
}

fn log_failure(entity: &str, index: usize, rule: &'static str, e: &RuleFailure) {
    warn!(entity, index, rule, error = %e, "Rule skipped, neutral value used");
}
