use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use sleepscore::config::{Config, ScoringProfile};
use sleepscore::loader;
use sleepscore::resolver::LocationTable;
use std::path::Path;
use std::process;
use tracing::{error, info, warn, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fatigue/sleep scores for a travelling team's schedule", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// CSV of city,state,country,latitude,longitude,timezone
    #[arg(global = true, short, long, default_value = "data/locations.csv")]
    locations: String,

    /// JSON config; replaces the profile defaults.
    #[arg(global = true, short, long)]
    weights: Option<String>,

    #[arg(global = true, short, long, value_enum, default_value_t = ScoringProfile::Strict)]
    profile: ScoringProfile,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Score(cmd::score::ScoreArgs),
    Matchups(cmd::matchups::MatchupArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    info!("🚀 Initializing SleepScore...");

    let (cli_config, sub_name) = match &cli.command {
        Commands::Score(args) => (&args.config, "score"),
        Commands::Matchups(args) => (&args.config, "matchups"),
    };
    let Some(sub_matches) = matches.subcommand_matches(sub_name) else {
        error!("Subcommand '{}' missing from parsed arguments", sub_name);
        process::exit(2);
    };

    // Base: weights file, else the chosen profile. CLI flags go on top.
    let mut config = match &cli.weights {
        Some(path) => {
            info!("⚖️  Loading Config from: {}", path);
            Config::load_from_file(path).unwrap_or_else(|e| {
                error!("❌ Failed to load config '{}': {}", path, e);
                process::exit(1);
            })
        }
        None => {
            info!("⚖️  Using '{}' profile", cli.profile);
            Config::for_profile(cli.profile)
        }
    };
    config.merge_from_cli(cli_config, sub_matches);

    let table = if Path::new(&cli.locations).exists() {
        info!("📂 Loading Locations: {}", cli.locations);
        loader::load_locations_from_path(&cli.locations).unwrap_or_else(|e| {
            error!("❌ Failed to load locations '{}': {}", cli.locations, e);
            process::exit(1);
        })
    } else {
        warn!(
            "⚠️  Location table '{}' not found. Travel distances fall back to zero.",
            cli.locations
        );
        LocationTable::new()
    };

    let result = match cli.command {
        Commands::Score(args) => cmd::score::run(args, config, &table),
        Commands::Matchups(args) => cmd::matchups::run(args, config, &table),
    };

    if let Err(e) = result {
        error!("\n❌ FATAL ERROR:");
        error!("   {}", e);
        process::exit(1);
    }
}
