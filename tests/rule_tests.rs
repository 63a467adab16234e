mod common;

use chrono::{Duration, TimeZone, Utc};
use common::*;
use rstest::rstest;
use sleepscore::config::{CircadianBands, ScoreBounds, ScoringWeights, TravelParams, VenueDefinitions};
use sleepscore::error::RuleFailure;
use sleepscore::resolver::LocationCache;
use sleepscore::scorer::aggregate::{clip, finalize, raw_total};
use sleepscore::scorer::circadian::{adjustment, body_clock_hour, classify};
use sleepscore::scorer::density::DensityRule;
use sleepscore::scorer::sleep_debt::{self, decay, utc_offset_hours, OffsetClock};
use sleepscore::scorer::travel::{self, estimate_rest, Leg};
use sleepscore::scorer::venue::StaticModifiers;
use sleepscore::scorer::{CircadianBand, ScoreBreakdown};

fn default_density() -> DensityRule {
    DensityRule {
        window_days: [1, 3, 5, 7],
        min_games: [2, 3, 4, 5],
        penalty_single: -40,
        penalty_multiple: -60,
    }
}

// --- DENSITY ---
#[rstest]
#[case(&[0], 0)] // season opener
#[case(&[0, 1], 1)] // back-to-back
#[case(&[0, 2], 0)] // one night off
#[case(&[0, 1, 2], 2)] // back-to-back and 3-in-3
#[case(&[0, 2, 3], 2)] // 3-in-4 plus back-to-back
#[case(&[0, 3], 0)]
#[case(&[0, 2, 4, 6, 7], 4)] // every window fires
#[case(&[0, 10, 11], 1)] // old game outside the widest window
fn test_density_conditions(#[case] offsets: &[i64], #[case] expected: u8) {
    let start = date("2024-01-01");
    let records: Vec<_> = offsets
        .iter()
        .map(|d| dated("Celtics", start + Duration::days(*d)))
        .collect();

    let counts = default_density().evaluate(&records, records.len() - 1);
    assert_eq!(
        counts.conditions_met, expected,
        "offsets {:?} counted {:?}",
        offsets, counts.window_counts
    );
}

#[test]
fn test_density_counts_include_current_game() {
    let records = vec![dated("Celtics", date("2024-01-01"))];
    let counts = default_density().evaluate(&records, 0);
    assert_eq!(counts.window_counts, [1, 1, 1, 1]);
}

#[rstest]
#[case(0, 0)]
#[case(1, -40)]
#[case(2, -60)]
#[case(4, -60)]
fn test_density_tiers(#[case] conditions: u8, #[case] expected: i32) {
    assert_eq!(default_density().penalty(conditions), expected);
}

// --- SLEEP DEBT ---
#[rstest]
#[case(3.0, 1, 2.0)]
#[case(3.0, 5, 0.0)]
#[case(-3.0, 1, -2.0)]
#[case(-3.0, 5, 0.0)]
#[case(0.0, 4, 0.0)]
#[case(2.5, 0, 2.5)]
#[case(-0.5, 1, 0.0)]
fn test_decay_toward_zero(#[case] candidate: f64, #[case] days: i64, #[case] expected: f64) {
    assert_eq!(decay(candidate, days), expected);
}

#[rstest]
#[case(2.9, -20)]
#[case(-3.5, -30)]
#[case(0.4, 0)]
#[case(0.0, 0)]
#[case(1e12, -i32::MAX)] // saturates instead of overflowing
fn test_sleep_debt_penalty_truncates(#[case] debt: f64, #[case] expected: i32) {
    assert_eq!(sleep_debt::penalty(debt, 10), expected);
}

#[test]
fn test_half_hour_offset() {
    let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    assert_eq!(utc_offset_hours(chrono_tz::Asia::Kolkata, at), 5.5);
    assert_eq!(utc_offset_hours(chrono_tz::America::New_York, at), -5.0);
}

#[test]
fn test_step_needs_both_timezones() {
    let prev = game("Celtics", "2024-01-10", 19, 0, boston());
    let curr = game("Celtics", "2024-01-11", 19, 0, miami());
    let clock = OffsetClock::Fixed(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());

    let result = sleep_debt::step(1.0, &prev, &curr, None, curr.venue_timezone, &clock);
    assert!(matches!(result, Err(RuleFailure::Resolution(_))));
}

#[test]
fn test_westward_trip_goes_negative() {
    // 21 hours apart, so nothing decays
    let prev = game("Celtics", "2024-01-10", 19, 0, boston());
    let curr = game("Celtics", "2024-01-11", 13, 0, portland());
    let clock = OffsetClock::Fixed(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());

    let debt = sleep_debt::step(0.0, &prev, &curr, prev.venue_timezone, curr.venue_timezone, &clock).unwrap();
    assert_eq!(debt, -3.0);
}

#[test]
fn test_westward_trip_decays_after_a_day() {
    // 27 hours apart: one day of recovery
    let prev = game("Celtics", "2024-01-10", 19, 0, boston());
    let curr = game("Celtics", "2024-01-11", 19, 0, portland());
    let clock = OffsetClock::Fixed(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());

    let debt = sleep_debt::step(0.0, &prev, &curr, prev.venue_timezone, curr.venue_timezone, &clock).unwrap();
    assert_eq!(debt, -2.0);
}

#[test]
fn test_elapsed_days_truncate() {
    // 41 hours apart: one whole day, not two
    let prev = game("Celtics", "2024-01-10", 19, 0, portland());
    let curr = game("Celtics", "2024-01-12", 15, 0, boston());
    let clock = OffsetClock::Fixed(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());

    let debt = sleep_debt::step(0.0, &prev, &curr, prev.venue_timezone, curr.venue_timezone, &clock).unwrap();
    assert_eq!(debt, 2.0);
}

#[test]
fn test_accumulate_starts_at_zero() {
    let records = vec![
        game("Celtics", "2024-01-10", 19, 0, portland()),
        game("Celtics", "2024-01-11", 19, 0, boston()),
    ];
    let clock = OffsetClock::Fixed(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    let debts = sleep_debt::accumulate("Celtics", &records, &clock, &LocationCache::empty());
    assert_eq!(debts, vec![0.0, 3.0]);
    assert!(sleep_debt::accumulate("Celtics", &[], &clock, &LocationCache::empty()).is_empty());
}

// --- CIRCADIAN ---
#[rstest]
#[case(16.0, CircadianBand::Handicapped)]
#[case(16.02, CircadianBand::Optimal)]
#[case(16.005, CircadianBand::Neutral)]
#[case(12.0, CircadianBand::Handicapped)]
#[case(11.99, CircadianBand::Neutral)]
#[case(20.0, CircadianBand::Optimal)]
#[case(20.5, CircadianBand::Neutral)]
#[case(2.0, CircadianBand::Neutral)]
fn test_circadian_bands(#[case] hour: f64, #[case] expected: CircadianBand) {
    assert_eq!(classify(hour, &CircadianBands::default()), expected);
}

#[test]
fn test_circadian_adjustments() {
    let w = ScoringWeights::default();
    assert_eq!(adjustment(CircadianBand::Handicapped, &w), -20);
    assert_eq!(adjustment(CircadianBand::Optimal, &w), 20);
    assert_eq!(adjustment(CircadianBand::Neutral, &w), 0);
}

#[rstest]
#[case(16, 0, 0.0, 16.0)]
#[case(16, 1, 0.0, 16.0 + 1.0 / 60.0)]
#[case(19, 0, 3.0, 22.0)]
#[case(19, 0, -2.0, 17.0)]
#[case(23, 30, 2.0, 1.5)] // wraps past midnight
fn test_body_clock(#[case] h: u32, #[case] m: u32, #[case] debt: f64, #[case] expected: f64) {
    let start = game("Celtics", "2024-01-10", h, m, boston()).start_instant.unwrap();
    let hour = body_clock_hour(start, debt).unwrap();
    assert!((hour - expected).abs() < 1e-9, "{} != {}", hour, expected);
}

#[test]
fn test_body_clock_rejects_non_finite_debt() {
    let start = game("Celtics", "2024-01-10", 19, 0, boston()).start_instant.unwrap();
    assert!(body_clock_hour(start, f64::NAN).is_err());
}

// --- REST ---
fn leg<'a>(record: &'a sleepscore::schedule::GameRecord, with_coords: bool) -> Leg<'a> {
    let coords = fixture_cache_coordinates(&record.venue);
    Leg {
        record,
        local_start: record.start_instant,
        coordinates: if with_coords { coords } else { None },
        timezone: record.venue_timezone,
    }
}

fn fixture_cache_coordinates(venue: &sleepscore::schedule::Venue) -> Option<sleepscore::geo::Coordinates> {
    LocationCache::prefetch(&fixture_table(), [venue]).coordinates(venue)
}

#[test]
fn test_rest_same_city() {
    let a = game("Celtics", "2024-01-10", 19, 0, boston());
    let b = game("Celtics", "2024-01-11", 19, 0, boston());
    let est = estimate_rest(&leg(&a, true), &leg(&b, true), &TravelParams::default()).unwrap();

    assert_eq!(est.distance_miles, Some(0.0));
    // 24h minus 2h game, 1h buffer, 1.5h ground
    assert!((est.rest_hours - 19.5).abs() < 1e-9);
    assert_eq!(est.arrival.timezone(), chrono_tz::America::New_York);
}

#[test]
fn test_rest_missing_coordinates_assumes_no_flight() {
    let a = game("Celtics", "2024-01-10", 19, 0, portland());
    let b = game("Celtics", "2024-01-11", 19, 0, boston());
    let est = estimate_rest(&leg(&a, false), &leg(&b, true), &TravelParams::default()).unwrap();

    assert_eq!(est.distance_miles, None);
    assert_eq!(est.flight_hours, 0.0);
    // 21h between kickoffs, 2 + 1 + 1.5 spent
    assert!((est.rest_hours - 16.5).abs() < 1e-9);
}

#[test]
fn test_rest_arrival_in_destination_zone() {
    let a = game("Celtics", "2024-01-10", 19, 0, boston());
    let b = game("Celtics", "2024-01-12", 19, 0, portland());
    let est = estimate_rest(&leg(&a, true), &leg(&b, true), &TravelParams::default()).unwrap();

    assert_eq!(est.arrival.timezone(), chrono_tz::America::Los_Angeles);
    assert!(est.flight_hours > 5.0 && est.flight_hours < 5.1);
}

#[test]
fn test_rest_missing_kickoff_fails() {
    let a = game("Celtics", "2024-01-10", 19, 0, boston());
    let mut b = game("Celtics", "2024-01-11", 19, 0, boston());
    b.start_instant = None;
    let mut to = leg(&b, true);
    to.local_start = None;
    assert!(estimate_rest(&leg(&a, true), &to, &TravelParams::default()).is_err());
}

#[rstest]
#[case(19.99, -10)]
#[case(20.0, 0)]
#[case(-3.0, -10)]
#[case(48.0, 0)]
fn test_rest_threshold(#[case] rest: f64, #[case] expected: i32) {
    assert_eq!(travel::penalty(rest, 20.0, -10), expected);
}

// --- VENUE ---
#[test]
fn test_static_modifiers() {
    let m = StaticModifiers::new(&VenueDefinitions::default(), &ScoringWeights::default());
    assert_eq!(m.altitude(&denver()), -10);
    assert_eq!(m.nightlife(&denver()), 0);
    assert_eq!(m.nightlife(&miami()), -10);
    assert_eq!(m.altitude(&boston()), 0);
    assert_eq!(m.nightlife(&boston()), 0);
}

// --- AGGREGATE ---
#[rstest]
#[case(130, None, 100)]
#[case(100, None, 100)]
#[case(-50, None, -50)]
#[case(-50, Some(0), 0)]
#[case(40, Some(0), 40)]
fn test_clip(#[case] total: i32, #[case] floor: Option<i32>, #[case] expected: i32) {
    let bounds = ScoreBounds {
        score_floor: floor,
        ..Default::default()
    };
    assert_eq!(clip(total, &bounds), expected);
}

#[test]
fn test_finalize_sums_adjustments() {
    let mut b = ScoreBreakdown {
        density: -60,
        altitude: -10,
        nightlife: -10,
        sleep_debt: -30,
        circadian: 20,
        rest_time: -10,
        ..Default::default()
    };
    finalize(&mut b, &ScoreBounds::default());
    assert_eq!(b.raw_total, 0);
    assert_eq!(b.final_score, 0);
}

#[test]
fn test_raw_total_saturates() {
    let b = ScoreBreakdown {
        density: i32::MIN,
        altitude: -200,
        circadian: i32::MAX,
        ..Default::default()
    };
    // Pins at MIN before the bonus is added
    assert_eq!(raw_total(&b, 100), -1);

    let b = ScoreBreakdown {
        circadian: i32::MAX,
        ..Default::default()
    };
    assert_eq!(raw_total(&b, 100), i32::MAX);
}
