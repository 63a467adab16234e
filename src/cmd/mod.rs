pub mod matchups;
pub mod score;

use sleepscore::config::Config;
use sleepscore::error::{SleepScoreError, SsResult};
use sleepscore::loader;
use sleepscore::resolver::{LocationCache, LocationResolver};
use sleepscore::schedule::{group_timelines, Timeline};
use sleepscore::scorer::Scorer;
use std::path::Path;
use tracing::{info, warn};

/// Loads a schedule, resolves its venues once, and builds the scorer.
pub fn load_season(
    input: &Path,
    config: &Config,
    resolver: &dyn LocationResolver,
    team: Option<&str>,
) -> SsResult<(Vec<Timeline>, Scorer)> {
    let reference_tz = config.clock.get_reference_timezone()?;
    let mut records = loader::load_games_from_path(input, reference_tz)?;

    if let Some(team) = team {
        records.retain(|r| r.entity_id.eq_ignore_ascii_case(team));
        if records.is_empty() {
            return Err(SleepScoreError::Validation(format!(
                "no games found for team '{}'",
                team
            )));
        }
    }

    let cache = LocationCache::prefetch(resolver, records.iter().map(|r| &r.venue));
    let filled = cache.fill_missing_timezones(&mut records);
    if filled > 0 {
        info!("🌐 Filled {} missing timezones from the location table", filled);
    }
    let unresolved = records.iter().filter(|r| r.venue_timezone.is_none()).count();
    if unresolved > 0 {
        warn!("⚠️  {} games still have no timezone", unresolved);
    }

    let timelines = group_timelines(records)?;
    info!("🏀 {} team timelines", timelines.len());

    let scorer = Scorer::new(config.clone(), cache)?;
    Ok((timelines, scorer))
}
