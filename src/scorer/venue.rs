use crate::config::{ScoringWeights, VenueDefinitions};
use crate::schedule::Venue;
use std::collections::HashSet;

/// Fixed per-city penalties. No history involved.
#[derive(Debug, Clone, Default)]
pub struct StaticModifiers {
    altitude_cities: HashSet<String>,
    nightlife_cities: HashSet<String>,
    penalty_altitude: i32,
    penalty_nightlife: i32,
}

impl StaticModifiers {
    pub fn new(defs: &VenueDefinitions, w: &ScoringWeights) -> Self {
        Self {
            altitude_cities: defs.get_altitude_cities(),
            nightlife_cities: defs.get_nightlife_cities(),
            penalty_altitude: w.penalty_altitude,
            penalty_nightlife: w.penalty_nightlife,
        }
    }

    pub fn altitude(&self, venue: &Venue) -> i32 {
        if self.altitude_cities.contains(venue.city.trim()) {
            self.penalty_altitude
        } else {
            0
        }
    }

    pub fn nightlife(&self, venue: &Venue) -> i32 {
        if self.nightlife_cities.contains(venue.city.trim()) {
            self.penalty_nightlife
        } else {
            0
        }
    }
}
