use crate::reports;
use clap::Args;
use sleepscore::analysis::{pair_up, summarize};
use sleepscore::config::Config;
use sleepscore::error::SsResult;
use sleepscore::loader;
use sleepscore::resolver::LocationResolver;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Score a single team only.
    #[arg(short, long)]
    pub team: Option<String>,

    /// Print the per-game breakdown table for every team.
    #[arg(long, default_value_t = false)]
    pub details: bool,
}

pub fn run(args: ScoreArgs, config: Config, resolver: &dyn LocationResolver) -> SsResult<()> {
    let (timelines, scorer) = super::load_season(&args.input, &config, resolver, args.team.as_deref())?;

    let scores = scorer.score_season(&timelines);
    let games = pair_up(&timelines, &scores);

    if let Some(path) = &args.output {
        loader::write_scored_to_path(path, &games)?;
    }

    if args.details || args.team.is_some() {
        for timeline in &timelines {
            let team_games: Vec<_> = games
                .iter()
                .filter(|g| g.record.entity_id == timeline.entity_id())
                .copied()
                .collect();
            reports::print_timeline_report(timeline.entity_id(), &team_games, &config.weights);
        }
    }

    let summary = summarize(&games, config.bounds.baseline);
    reports::print_summary_report(&summary, config.bounds.baseline);
    Ok(())
}
