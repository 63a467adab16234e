use crate::geo::Coordinates;
use crate::schedule::{GameRecord, Timeline, Venue};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub timezone_id: String,
}

impl ResolvedLocation {
    pub fn new(latitude: f64, longitude: f64, timezone_id: impl Into<String>) -> Self {
        Self {
            coordinates: Coordinates::new(latitude, longitude),
            timezone_id: timezone_id.into(),
        }
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone_id.trim().parse::<Tz>().ok()
    }
}

/// Maps a venue to coordinates and a timezone. Implementations must be
/// idempotent; callers resolve each distinct venue at most once per run.
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, venue: &Venue) -> Option<ResolvedLocation>;
}

/// Fixed lookup table, typically loaded from a locations CSV.
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    entries: HashMap<Venue, ResolvedLocation>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, venue: Venue, location: ResolvedLocation) {
        self.entries.insert(normalize(&venue), location);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Venue, ResolvedLocation)> for LocationTable {
    fn from_iter<I: IntoIterator<Item = (Venue, ResolvedLocation)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (venue, location) in iter {
            table.insert(venue, location);
        }
        table
    }
}

impl LocationResolver for LocationTable {
    fn resolve(&self, venue: &Venue) -> Option<ResolvedLocation> {
        self.entries.get(&normalize(venue)).cloned()
    }
}

fn normalize(venue: &Venue) -> Venue {
    Venue::new(venue.city.trim(), venue.state.trim(), venue.country.trim())
}

/// What the engine actually reads for one venue.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CachedLocation {
    pub coordinates: Option<Coordinates>,
    pub timezone: Option<Tz>,
}

/// Per-run snapshot of resolver answers, filled before scoring starts so the
/// engine never blocks on lookups. Keyed on trimmed venues.
#[derive(Debug, Clone, Default)]
pub struct LocationCache {
    entries: HashMap<Venue, CachedLocation>,
    misses: HashSet<Venue>,
}

impl LocationCache {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn prefetch<'a, R, I>(resolver: &R, venues: I) -> Self
    where
        R: LocationResolver + ?Sized,
        I: IntoIterator<Item = &'a Venue>,
    {
        let mut cache = Self::default();
        for raw in venues {
            let venue = normalize(raw);
            if cache.entries.contains_key(&venue) || cache.misses.contains(&venue) {
                continue;
            }
            if venue.is_blank() {
                cache.misses.insert(venue);
                continue;
            }

            match resolver.resolve(&venue) {
                Some(found) => {
                    let coordinates = Some(found.coordinates).filter(|c| c.is_valid());
                    if coordinates.is_none() {
                        warn!(venue = %venue, "Resolver returned invalid coordinates");
                    }
                    let timezone = found.timezone();
                    if timezone.is_none() {
                        warn!(venue = %venue, tz = %found.timezone_id, "Unknown timezone id");
                    }
                    debug!(venue = %venue, ?coordinates, ?timezone, "Resolved location");
                    cache.entries.insert(
                        venue,
                        CachedLocation {
                            coordinates,
                            timezone,
                        },
                    );
                }
                None => {
                    warn!(venue = %venue, "Could not resolve location");
                    cache.misses.insert(venue);
                }
            }
        }

        info!(
            "📍 Resolved {} locations ({} unresolved)",
            cache.entries.len(),
            cache.misses.len()
        );
        cache
    }

    pub fn for_timelines<R: LocationResolver + ?Sized>(resolver: &R, timelines: &[Timeline]) -> Self {
        Self::prefetch(
            resolver,
            timelines
                .iter()
                .flat_map(|t| t.records().iter().map(|r| &r.venue)),
        )
    }

    pub fn get(&self, venue: &Venue) -> Option<&CachedLocation> {
        self.entries.get(&normalize(venue))
    }

    pub fn coordinates(&self, venue: &Venue) -> Option<Coordinates> {
        self.get(venue).and_then(|c| c.coordinates)
    }

    pub fn timezone(&self, venue: &Venue) -> Option<Tz> {
        self.get(venue).and_then(|c| c.timezone)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn misses(&self) -> impl Iterator<Item = &Venue> {
        self.misses.iter()
    }

    /// Gives records without a timezone the cached one for their venue.
    /// Returns how many records were filled.
    pub fn fill_missing_timezones(&self, records: &mut [GameRecord]) -> usize {
        let mut filled = 0;
        for r in records.iter_mut().filter(|r| r.venue_timezone.is_none()) {
            if let Some(tz) = self.timezone(&r.venue) {
                r.venue_timezone = Some(tz);
                filled += 1;
            }
        }
        filled
    }
}
