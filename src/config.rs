use crate::error::{SleepScoreError, SsResult};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{parser::ValueSource, ArgMatches, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub weights: ScoringWeights,
    #[command(flatten)]
    pub windows: DensityWindows,
    #[command(flatten)]
    pub bands: CircadianBands,
    #[command(flatten)]
    pub travel: TravelParams,
    #[command(flatten)]
    pub venues: VenueDefinitions,
    #[command(flatten)]
    pub bounds: ScoreBounds,
    #[command(flatten)]
    pub clock: ClockParams,
}

/// Two magnitude tables are in circulation for the density rule. Neither is
/// canonical; pick one explicitly.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScoringProfile {
    /// -40 for a single density condition, -60 for several.
    #[default]
    Strict,
    /// -20 for a single density condition, -40 for several.
    Moderate,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OffsetReference {
    /// Every UTC offset is read at one instant shared by the whole run.
    #[default]
    RunStart,
    /// Offsets are read at the start of the game being scored.
    GameStart,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // === DENSITY ===
    #[arg(long, default_value_t = -40, allow_hyphen_values = true)]
    pub penalty_density_single: i32,
    #[arg(long, default_value_t = -60, allow_hyphen_values = true)]
    pub penalty_density_multiple: i32,

    // === VENUE ===
    #[arg(long, default_value_t = -10, allow_hyphen_values = true)]
    pub penalty_altitude: i32,
    #[arg(long, default_value_t = -10, allow_hyphen_values = true)]
    pub penalty_nightlife: i32,

    // === CIRCADIAN ===
    // Applied as -k * |trunc(debt)|
    #[arg(long, default_value_t = 10)]
    pub penalty_sleep_debt_per_hour: i32,
    #[arg(long, default_value_t = -20, allow_hyphen_values = true)]
    pub penalty_handicapped_hours: i32,
    #[arg(long, default_value_t = 20, allow_hyphen_values = true)]
    pub bonus_optimal_hours: i32,

    // === REST ===
    #[arg(long, default_value_t = -10, allow_hyphen_values = true)]
    pub penalty_short_rest: i32,
    #[arg(long, default_value_t = 20.0)]
    pub rest_threshold_hours: f64,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub include_rest_time: bool,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            penalty_density_single: -40,
            penalty_density_multiple: -60,
            penalty_altitude: -10,
            penalty_nightlife: -10,
            penalty_sleep_debt_per_hour: 10,
            penalty_handicapped_hours: -20,
            bonus_optimal_hours: 20,
            penalty_short_rest: -10,
            rest_threshold_hours: 20.0,
            include_rest_time: true,
        }
    }
}

impl ScoringWeights {
    pub fn for_profile(profile: ScoringProfile) -> Self {
        match profile {
            ScoringProfile::Strict => Self::default(),
            ScoringProfile::Moderate => Self {
                penalty_density_single: -20,
                penalty_density_multiple: -40,
                ..Self::default()
            },
        }
    }
}

/// Back-to-back and compressed-schedule windows. Entry `k` fires when at
/// least `window_min_games[k]` games (current one included) fall within
/// `window_days[k]` whole days before the current game.
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityWindows {
    #[arg(long, default_value = "1,3,5,7")]
    pub window_days: String,
    #[arg(long, default_value = "2,3,4,5")]
    pub window_min_games: String,
}

impl Default for DensityWindows {
    fn default() -> Self {
        Self {
            window_days: "1,3,5,7".to_string(),
            window_min_games: "2,3,4,5".to_string(),
        }
    }
}

impl DensityWindows {
    pub fn get_window_days(&self) -> SsResult<[i64; 4]> {
        let days = parse_array::<i64, 4>(&self.window_days, "window_days")?;
        if days.windows(2).any(|w| w[0] > w[1]) {
            return Err(SleepScoreError::Config(
                "--window-days must be non-decreasing".to_string(),
            ));
        }
        Ok(days)
    }

    pub fn get_window_min_games(&self) -> SsResult<[usize; 4]> {
        parse_array::<usize, 4>(&self.window_min_games, "window_min_games")
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircadianBands {
    #[arg(long, default_value_t = 12.0)]
    pub handicapped_start: f64,
    #[arg(long, default_value_t = 16.0)]
    pub handicapped_end: f64,
    // 16:01, kept apart from handicapped_end so the bands never overlap.
    #[arg(long, default_value_t = 16.0167)]
    pub optimal_start: f64,
    #[arg(long, default_value_t = 20.0)]
    pub optimal_end: f64,
}

impl Default for CircadianBands {
    fn default() -> Self {
        Self {
            handicapped_start: 12.0,
            handicapped_end: 16.0,
            optimal_start: 16.0167,
            optimal_end: 20.0,
        }
    }
}

impl CircadianBands {
    pub fn validate(&self) -> SsResult<()> {
        if self.handicapped_start > self.handicapped_end || self.optimal_start > self.optimal_end {
            return Err(SleepScoreError::Config(
                "circadian band start must not exceed its end".to_string(),
            ));
        }
        let overlaps = self.handicapped_start <= self.optimal_end
            && self.optimal_start <= self.handicapped_end;
        if overlaps {
            return Err(SleepScoreError::Config(format!(
                "circadian bands overlap: handicapped [{}, {}], optimal [{}, {}]",
                self.handicapped_start, self.handicapped_end, self.optimal_start, self.optimal_end
            )));
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelParams {
    #[arg(long, default_value_t = 500.0)]
    pub flight_speed_mph: f64,
    #[arg(long, default_value_t = 1.0)]
    pub post_game_buffer_hours: f64,
    #[arg(long, default_value_t = 1.5)]
    pub ground_buffer_hours: f64,
}

impl Default for TravelParams {
    fn default() -> Self {
        Self {
            flight_speed_mph: 500.0,
            post_game_buffer_hours: 1.0,
            ground_buffer_hours: 1.5,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueDefinitions {
    #[arg(long, default_value = "Denver")]
    pub altitude_cities: String,
    #[arg(long, default_value = "Los Angeles,Miami,Chicago,Dallas")]
    pub nightlife_cities: String,
}

impl Default for VenueDefinitions {
    fn default() -> Self {
        Self {
            altitude_cities: "Denver".to_string(),
            nightlife_cities: "Los Angeles,Miami,Chicago,Dallas".to_string(),
        }
    }
}

impl VenueDefinitions {
    pub fn get_altitude_cities(&self) -> HashSet<String> {
        split_names(&self.altitude_cities)
    }

    pub fn get_nightlife_cities(&self) -> HashSet<String> {
        split_names(&self.nightlife_cities)
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBounds {
    #[arg(long, default_value_t = 100)]
    pub baseline: i32,
    #[arg(long, default_value_t = 100)]
    pub score_ceiling: i32,
    /// Lower clip. Unset means totals may go arbitrarily negative.
    #[arg(long, allow_hyphen_values = true)]
    pub score_floor: Option<i32>,
}

impl Default for ScoreBounds {
    fn default() -> Self {
        Self {
            baseline: 100,
            score_ceiling: 100,
            score_floor: None,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockParams {
    #[arg(long, value_enum, default_value_t = OffsetReference::RunStart)]
    pub offset_reference: OffsetReference,
    /// RFC 3339 instant used for `run-start` offsets. Defaults to now.
    #[arg(long)]
    pub evaluation_instant: Option<String>,
    #[arg(long, default_value = "America/New_York")]
    pub reference_timezone: String,
}

impl Default for ClockParams {
    fn default() -> Self {
        Self {
            offset_reference: OffsetReference::RunStart,
            evaluation_instant: None,
            reference_timezone: "America/New_York".to_string(),
        }
    }
}

impl ClockParams {
    pub fn get_reference_timezone(&self) -> SsResult<Tz> {
        self.reference_timezone.parse::<Tz>().map_err(|_| {
            SleepScoreError::Config(format!(
                "unknown reference timezone '{}'",
                self.reference_timezone
            ))
        })
    }

    pub fn get_evaluation_instant(&self) -> SsResult<Option<DateTime<Utc>>> {
        match &self.evaluation_instant {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| {
                    SleepScoreError::Config(format!("invalid --evaluation-instant '{}': {}", s, e))
                }),
        }
    }
}

impl Config {
    pub fn for_profile(profile: ScoringProfile) -> Self {
        Self {
            weights: ScoringWeights::for_profile(profile),
            ..Self::default()
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SsResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies every field the user set explicitly on the command line over
    /// the values already held (file or profile defaults).
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(weights.penalty_density_single);
        update_if_present!(weights.penalty_density_multiple);
        update_if_present!(weights.penalty_altitude);
        update_if_present!(weights.penalty_nightlife);
        update_if_present!(weights.penalty_sleep_debt_per_hour);
        update_if_present!(weights.penalty_handicapped_hours);
        update_if_present!(weights.bonus_optimal_hours);
        update_if_present!(weights.penalty_short_rest);
        update_if_present!(weights.rest_threshold_hours);
        update_if_present!(weights.include_rest_time);

        update_if_present!(windows.window_days);
        update_if_present!(windows.window_min_games);

        update_if_present!(bands.handicapped_start);
        update_if_present!(bands.handicapped_end);
        update_if_present!(bands.optimal_start);
        update_if_present!(bands.optimal_end);

        update_if_present!(travel.flight_speed_mph);
        update_if_present!(travel.post_game_buffer_hours);
        update_if_present!(travel.ground_buffer_hours);

        update_if_present!(venues.altitude_cities);
        update_if_present!(venues.nightlife_cities);

        update_if_present!(bounds.baseline);
        update_if_present!(bounds.score_ceiling);
        update_if_present!(bounds.score_floor);

        update_if_present!(clock.offset_reference);
        update_if_present!(clock.evaluation_instant);
        update_if_present!(clock.reference_timezone);
    }
}

fn split_names(s: &str) -> HashSet<String> {
    s.split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect()
}

fn parse_array<T, const N: usize>(s: &str, name: &str) -> SsResult<[T; N]>
where
    T: std::str::FromStr + Copy + Default,
{
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != N {
        return Err(SleepScoreError::Config(format!(
            "--{} requires {} values",
            name.replace('_', "-"),
            N
        )));
    }
    let mut arr = [T::default(); N];
    for (i, p) in parts.iter().enumerate() {
        arr[i] = p.trim().parse().map_err(|_| {
            SleepScoreError::Config(format!("Invalid number '{}' in --{}", p, name))
        })?;
    }
    Ok(arr)
}
