#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use sleepscore::config::Config;
use sleepscore::resolver::{LocationCache, LocationTable, ResolvedLocation};
use sleepscore::schedule::{GameRecord, Timeline, Venue};
use sleepscore::scorer::Scorer;

// Mid-January: no DST anywhere in the fixture.
pub const PINNED_INSTANT: &str = "2024-01-15T12:00:00Z";

pub fn portland() -> Venue {
    Venue::new("Portland", "Oregon", "USA")
}

pub fn boston() -> Venue {
    Venue::new("Boston", "Massachusetts", "USA")
}

pub fn denver() -> Venue {
    Venue::new("Denver", "Colorado", "USA")
}

pub fn miami() -> Venue {
    Venue::new("Miami", "Florida", "USA")
}

pub fn phoenix() -> Venue {
    Venue::new("Phoenix", "Arizona", "USA")
}

pub fn fixture_table() -> LocationTable {
    [
        (portland(), ResolvedLocation::new(45.5152, -122.6784, "America/Los_Angeles")),
        (boston(), ResolvedLocation::new(42.3601, -71.0589, "America/New_York")),
        (denver(), ResolvedLocation::new(39.7392, -104.9903, "America/Denver")),
        (miami(), ResolvedLocation::new(25.7617, -80.1918, "America/New_York")),
        (phoenix(), ResolvedLocation::new(33.4484, -112.0740, "America/Phoenix")),
    ]
    .into_iter()
    .collect()
}

pub fn tz_of(venue: &Venue) -> Tz {
    match venue.city.as_str() {
        "Portland" => chrono_tz::America::Los_Angeles,
        "Denver" => chrono_tz::America::Denver,
        "Phoenix" => chrono_tz::America::Phoenix,
        _ => chrono_tz::America::New_York,
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A game at `venue` kicking off at `hour:minute` venue-local time.
pub fn game(entity: &str, day: &str, hour: u32, minute: u32, venue: Venue) -> GameRecord {
    let tz = tz_of(&venue);
    let d = date(day);
    let start = tz
        .from_local_datetime(&d.and_hms_opt(hour, minute, 0).unwrap())
        .single()
        .unwrap();
    GameRecord::builder()
        .entity_id(entity)
        .sequence_date(d)
        .start_instant(start)
        .venue(venue)
        .venue_timezone(tz)
        .build()
}

/// Date-only record, enough for the density rule.
pub fn dated(entity: &str, day: NaiveDate) -> GameRecord {
    GameRecord::builder()
        .entity_id(entity)
        .sequence_date(day)
        .venue(boston())
        .build()
}

pub fn pinned_config() -> Config {
    let mut config = Config::default();
    config.clock.evaluation_instant = Some(PINNED_INSTANT.to_string());
    config
}

pub fn scorer_for(config: Config, timelines: &[Timeline]) -> Scorer {
    let cache = LocationCache::for_timelines(&fixture_table(), timelines);
    Scorer::new(config, cache).unwrap()
}
