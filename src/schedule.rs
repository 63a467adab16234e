use crate::error::{SleepScoreError, SsResult};
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{Display, EnumString};
use typed_builder::TypedBuilder;

/// Where a game is played. Doubles as the cache key for location lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Venue {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Venue {
    pub fn new(city: impl Into<String>, state: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.city.trim().is_empty()
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.city, self.state, self.country)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Outcome {
    #[strum(serialize = "W")]
    #[serde(rename = "W")]
    Win,
    #[strum(serialize = "L")]
    #[serde(rename = "L")]
    Loss,
}

/// One team's view of one game.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GameRecord {
    #[builder(setter(into))]
    pub entity_id: String,
    #[builder(default, setter(strip_option))]
    pub game_id: Option<u64>,
    pub sequence_date: NaiveDate,
    /// Kickoff in the league's reference zone.
    #[builder(default, setter(strip_option))]
    pub start_instant: Option<DateTime<Tz>>,
    #[builder(default = Duration::hours(2))]
    pub duration: Duration,
    pub venue: Venue,
    #[builder(default, setter(strip_option))]
    pub venue_timezone: Option<Tz>,
    #[builder(default = false)]
    pub is_home: bool,
    #[builder(default, setter(strip_option))]
    pub outcome: Option<Outcome>,
    #[builder(default, setter(into))]
    pub opponent: String,
}

impl GameRecord {
    pub fn end_instant(&self) -> Option<DateTime<Tz>> {
        self.start_instant
            .and_then(|s| s.checked_add_signed(self.duration))
    }

    fn ordering_key(&self) -> (NaiveDate, Option<i64>) {
        (
            self.sequence_date,
            self.start_instant.map(|s| s.timestamp()),
        )
    }
}

/// One entity's games in kickoff order.
#[derive(Debug, Clone)]
pub struct Timeline {
    entity_id: String,
    records: Vec<GameRecord>,
}

impl Timeline {
    /// Accepts records already in order; rejects anything else.
    pub fn new(entity_id: impl Into<String>, records: Vec<GameRecord>) -> SsResult<Self> {
        let entity_id = entity_id.into();

        if let Some(stray) = records.iter().find(|r| r.entity_id != entity_id) {
            return Err(SleepScoreError::Validation(format!(
                "record for '{}' found in timeline of '{}'",
                stray.entity_id, entity_id
            )));
        }

        for (idx, pair) in records.windows(2).enumerate() {
            if pair[1].sequence_date < pair[0].sequence_date {
                return Err(SleepScoreError::Validation(format!(
                    "timeline '{}' goes back in time at index {} ({} after {})",
                    entity_id,
                    idx + 1,
                    pair[1].sequence_date,
                    pair[0].sequence_date
                )));
            }
        }

        // Records without a kickoff don't reset the comparison.
        let mut last_kickoff: Option<DateTime<Tz>> = None;
        for (idx, r) in records.iter().enumerate() {
            let start = match r.start_instant {
                Some(s) => s,
                None => continue,
            };
            if let Some(prev) = last_kickoff {
                if start < prev {
                    return Err(SleepScoreError::Validation(format!(
                        "timeline '{}' kickoff at index {} precedes an earlier game",
                        entity_id, idx
                    )));
                }
            }
            last_kickoff = Some(start);
        }

        Ok(Self { entity_id, records })
    }

    /// Sorts by date then kickoff before validating.
    pub fn from_unsorted(entity_id: impl Into<String>, mut records: Vec<GameRecord>) -> SsResult<Self> {
        records.sort_by_key(GameRecord::ordering_key);
        Self::new(entity_id, records)
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Splits a flat record list into one sorted timeline per entity, ordered by
/// entity id. Fails if any entity's kickoffs disagree with its dates.
pub fn group_timelines(records: Vec<GameRecord>) -> SsResult<Vec<Timeline>> {
    let mut by_entity: BTreeMap<String, Vec<GameRecord>> = BTreeMap::new();
    for r in records {
        by_entity.entry(r.entity_id.clone()).or_default().push(r);
    }

    by_entity
        .into_iter()
        .map(|(entity_id, records)| Timeline::from_unsorted(entity_id, records))
        .collect()
}
