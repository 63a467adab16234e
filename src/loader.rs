use crate::analysis::ScoredGame;
use crate::error::{SleepScoreError, SsResult};
use crate::resolver::{LocationTable, ResolvedLocation};
use crate::schedule::{GameRecord, Outcome, Venue};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

const DEFAULT_GAME_LENGTH_MINUTES: i64 = 120;

/// One row of the normalized per-team schedule. Columns not listed here are
/// ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GameRow {
    #[serde(rename = "Game_ID")]
    game_id: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    date_converted: Option<String>,
    #[serde(rename = "start_datetime_ET")]
    start: Option<String>,
    #[serde(rename = "Home_Game")]
    home_game: Option<String>,
    #[serde(rename = "Team")]
    team: Option<String>,
    #[serde(rename = "Opponent")]
    opponent: Option<String>,
    #[serde(rename = "Team_PTS")]
    team_pts: Option<String>,
    #[serde(rename = "Opponent_PTS")]
    opponent_pts: Option<String>,
    win_loss: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    timezone: Option<String>,
    #[serde(rename = "LOG")]
    log: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    country: String,
    latitude: f64,
    longitude: f64,
    timezone: String,
}

pub fn load_games<R: Read>(reader: R, reference_tz: Tz) -> SsResult<Vec<GameRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0;

    for (row_idx, result) in rdr.deserialize::<GameRow>().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("[Row {}] CSV Parse Error: {}", row_idx + 1, e);
                skipped += 1;
                continue;
            }
        };
        match row_to_record(row, reference_tz) {
            Ok(rec) => records.push(rec),
            Err(e) => {
                warn!("[Row {}] Skipped: {}", row_idx + 1, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("⚠️  Skipped {} unusable schedule rows", skipped);
    }
    info!("📂 Loaded {} game records", records.len());
    Ok(records)
}

pub fn load_games_from_path<P: AsRef<Path>>(path: P, reference_tz: Tz) -> SsResult<Vec<GameRecord>> {
    let file = File::open(path.as_ref()).map_err(|e| {
        SleepScoreError::Io(std::io::Error::new(
            e.kind(),
            format!("could not open schedule '{}': {}", path.as_ref().display(), e),
        ))
    })?;
    load_games(file, reference_tz)
}

pub fn load_locations<R: Read>(reader: R) -> SsResult<LocationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table = LocationTable::new();
    for (row_idx, result) in rdr.deserialize::<LocationRow>().enumerate() {
        match result {
            Ok(row) => {
                let loc = ResolvedLocation::new(row.latitude, row.longitude, row.timezone);
                if loc.timezone().is_none() {
                    warn!("[Row {}] Unknown timezone '{}'", row_idx + 1, loc.timezone_id);
                }
                table.insert(Venue::new(row.city, row.state, row.country), loc);
            }
            Err(e) => warn!("[Row {}] Invalid location: {}", row_idx + 1, e),
        }
    }

    debug!("Location table holds {} venues", table.len());
    Ok(table)
}

pub fn load_locations_from_path<P: AsRef<Path>>(path: P) -> SsResult<LocationTable> {
    load_locations(File::open(path)?)
}

fn row_to_record(row: GameRow, reference_tz: Tz) -> SsResult<GameRecord> {
    let team = non_blank(row.team)
        .ok_or_else(|| SleepScoreError::Validation("missing Team".to_string()))?;

    let start_instant = non_blank(row.start).and_then(|s| {
        let parsed = parse_start(&s, reference_tz);
        if parsed.is_none() {
            warn!(team = %team, "Unparseable kickoff '{}'", s);
        }
        parsed
    });

    let sequence_date = non_blank(row.date_converted)
        .and_then(|s| parse_date(&s))
        .or_else(|| non_blank(row.date).and_then(|s| parse_date(&s)))
        .or_else(|| start_instant.map(|s| s.date_naive()))
        .ok_or_else(|| SleepScoreError::Validation(format!("no usable date for '{}'", team)))?;

    let venue_timezone = non_blank(row.timezone).and_then(|s| {
        let tz = s.parse::<Tz>().ok();
        if tz.is_none() {
            warn!(team = %team, "Unknown timezone '{}'", s);
        }
        tz
    });

    let duration = match non_blank(row.log) {
        None => Duration::minutes(DEFAULT_GAME_LENGTH_MINUTES),
        Some(s) => parse_game_length(&s).unwrap_or_else(|| {
            warn!(team = %team, "Unparseable game length '{}', using 2:00", s);
            Duration::minutes(DEFAULT_GAME_LENGTH_MINUTES)
        }),
    };

    let outcome = non_blank(row.win_loss)
        .and_then(|s| s.parse::<Outcome>().ok())
        .or_else(|| {
            let ours = row.team_pts.as_deref().and_then(parse_points)?;
            let theirs = row.opponent_pts.as_deref().and_then(parse_points)?;
            Some(if ours > theirs { Outcome::Win } else { Outcome::Loss })
        });

    Ok(GameRecord {
        entity_id: team,
        game_id: row.game_id.as_deref().and_then(parse_points).map(|v| v as u64),
        sequence_date,
        start_instant,
        duration,
        venue: Venue::new(
            row.city.unwrap_or_default(),
            row.state.unwrap_or_default(),
            row.country.unwrap_or_default(),
        ),
        venue_timezone,
        is_home: row.home_game.as_deref().map(parse_bool).unwrap_or(false),
        outcome,
        opponent: row.opponent.unwrap_or_default(),
    })
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "y")
}

fn parse_points(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// `2024-12-01`, `12/01/2024` or `Sun Dec 1 2024`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // Timestamps written where a date was expected
    let head = s.split([' ', 'T']).next().unwrap_or(s);
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(head, f).ok())
        .or_else(|| {
            ["%a %b %d %Y", "%a %b %e %Y"]
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        })
}

/// Offset-aware stamps keep their instant; naive ones are read in
/// `reference_tz`.
pub fn parse_start(s: &str, reference_tz: Tz) -> Option<DateTime<Tz>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&reference_tz));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M%:z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&reference_tz));
        }
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .and_then(|naive| reference_tz.from_local_datetime(&naive).earliest())
}

/// `2:15`, `2:15:00` or `0 days 02:15:00`.
pub fn parse_game_length(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (days, clock) = match s.split_once("days") {
        Some((d, rest)) => (d.trim().parse::<i64>().ok()?, rest.trim()),
        None => (0, s),
    };

    let parts: Vec<i64> = clock
        .split(':')
        .map(|p| p.trim().parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let (h, m, sec) = match parts.as_slice() {
        [h, m] => (*h, *m, 0),
        [h, m, sec] => (*h, *m, *sec),
        _ => return None,
    };
    if h < 0 || !(0..60).contains(&m) || !(0..60).contains(&sec) {
        return None;
    }

    Some(Duration::days(days) + Duration::hours(h) + Duration::minutes(m) + Duration::seconds(sec))
}

#[derive(Debug, Serialize)]
struct ScoredRow<'a> {
    #[serde(rename = "Game_ID")]
    game_id: Option<u64>,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "start_datetime_ET")]
    start: Option<String>,
    #[serde(rename = "Team")]
    team: &'a str,
    #[serde(rename = "Opponent")]
    opponent: &'a str,
    #[serde(rename = "Home_Game")]
    home_game: bool,
    win_loss: Option<String>,
    city: &'a str,
    state: &'a str,
    country: &'a str,
    timezone: Option<String>,
    conditions_met: u8,
    penalty_multiple_games: i32,
    penalty_high_altitude: i32,
    penalty_nightlife_city: i32,
    running_sleep_debt: f64,
    penalty_sleep_debt: i32,
    body_clock_hour: Option<f64>,
    circadian_band: String,
    adjustment_circadian: i32,
    hours_between_games: Option<f64>,
    rest_hours: Option<f64>,
    penalty_rest_time: i32,
    sleep_score: i32,
}

impl<'a> From<&ScoredGame<'a>> for ScoredRow<'a> {
    fn from(g: &ScoredGame<'a>) -> Self {
        let r = g.record;
        let b = g.breakdown;
        Self {
            game_id: r.game_id,
            date: r.sequence_date.format("%Y-%m-%d").to_string(),
            start: r.start_instant.map(|s| s.format("%Y-%m-%d %H:%M:%S%:z").to_string()),
            team: &r.entity_id,
            opponent: &r.opponent,
            home_game: r.is_home,
            win_loss: r.outcome.map(|o| o.to_string()),
            city: &r.venue.city,
            state: &r.venue.state,
            country: &r.venue.country,
            timezone: r.venue_timezone.map(|tz| tz.name().to_string()),
            conditions_met: b.conditions_met,
            penalty_multiple_games: b.density,
            penalty_high_altitude: b.altitude,
            penalty_nightlife_city: b.nightlife,
            running_sleep_debt: b.running_sleep_debt,
            penalty_sleep_debt: b.sleep_debt,
            body_clock_hour: b.body_clock_hour,
            circadian_band: b.circadian_band.to_string(),
            adjustment_circadian: b.circadian,
            hours_between_games: b.hours_between_games,
            rest_hours: b.rest_hours,
            penalty_rest_time: b.rest_time,
            sleep_score: b.final_score,
        }
    }
}

pub fn write_scored<W: Write>(writer: W, games: &[ScoredGame]) -> SsResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for g in games {
        wtr.serialize(ScoredRow::from(g))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_scored_to_path<P: AsRef<Path>>(path: P, games: &[ScoredGame]) -> SsResult<()> {
    let file = File::create(path.as_ref())?;
    write_scored(file, games)?;
    info!("💾 Wrote {} scored rows to '{}'", games.len(), path.as_ref().display());
    Ok(())
}
