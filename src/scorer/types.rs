use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CircadianBand {
    Handicapped,
    Optimal,
    #[default]
    Neutral,
}

/// Games counted inside each density window, the current game included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DensityCounts {
    pub window_counts: [usize; 4],
    pub conditions_met: u8,
}

/// Per-game output of the engine. All adjustments default to neutral so a
/// record with unusable inputs still yields a breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub index: usize,

    // Density
    pub conditions_met: u8,
    pub density: i32,

    // Venue
    pub altitude: i32,
    pub nightlife: i32,

    // Circadian
    pub running_sleep_debt: f64,
    pub sleep_debt: i32,
    pub body_clock_hour: Option<f64>,
    pub circadian_band: CircadianBand,
    pub circadian: i32,

    // Rest
    pub hours_between_games: Option<f64>,
    pub rest_hours: Option<f64>,
    pub rest_time: i32,

    // Totals
    pub raw_total: i32,
    pub final_score: i32,
}

impl ScoreBreakdown {
    pub fn adjustments(&self) -> [(&'static str, i32); 6] {
        [
            ("density", self.density),
            ("altitude", self.altitude),
            ("nightlife", self.nightlife),
            ("sleep_debt", self.sleep_debt),
            ("circadian", self.circadian),
            ("rest_time", self.rest_time),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineScores {
    pub entity_id: String,
    pub breakdowns: Vec<ScoreBreakdown>,
}
