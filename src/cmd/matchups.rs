use crate::reports;
use clap::Args;
use sleepscore::analysis::{lopsided_matchups, pair_up};
use sleepscore::config::Config;
use sleepscore::error::SsResult;
use sleepscore::resolver::LocationResolver;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct MatchupArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = 40, allow_hyphen_values = true)]
    pub low: i32,

    #[arg(long, default_value_t = 60, allow_hyphen_values = true)]
    pub high: i32,
}

pub fn run(args: MatchupArgs, config: Config, resolver: &dyn LocationResolver) -> SsResult<()> {
    let (timelines, scorer) = super::load_season(&args.input, &config, resolver, None)?;
    let scores = scorer.score_season(&timelines);
    let games = pair_up(&timelines, &scores);

    let rested = config.bounds.score_ceiling;
    let found = lopsided_matchups(&games, args.low, args.high, rested);
    reports::print_matchup_report(&found, args.low, args.high, rested);

    if let Some(path) = &args.output {
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        for m in &found {
            wtr.serialize(m)?;
        }
        wtr.flush()?;
        info!("💾 Wrote {} matchups to '{}'", found.len(), path.display());
    }
    Ok(())
}
