//! Threat-Brain: a Gomoku engine speaking the tournament manager protocol.
//!
//! ## Usage
//!
//! - `pbrain-threat` - play with the default genome
//! - `pbrain-threat '[8,16,32,64,128,512,1000,2000,0.5]'` - play with a genome
//! - `pbrain-threat --genome-file genome.json --lookahead` - lookahead strategy

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::TypedValueParser as _;
use log::{error, info};

use threat_brain::constants::{MAX_RUN_LENGTH, RELEVANCE_RADIUS};
use threat_brain::genome::Genome;
use threat_brain::output::Output;
use threat_brain::protocol::{Engine, EngineOptions};
use threat_brain::threat::{Evaluator, Strategy};

/// Threat-Brain: a single-ply Gomoku engine
#[derive(Parser)]
#[command(name = "pbrain-threat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Genome as a JSON array: bucket weights followed by aggression in [0, 1]
    #[arg(conflicts_with = "genome_file")]
    genome: Option<String>,

    /// Read the genome JSON from a file
    #[arg(long, value_name = "PATH")]
    genome_file: Option<PathBuf>,

    /// Subtract the opponent's best reply from each candidate's value
    #[arg(long)]
    lookahead: bool,

    /// Cells scanned along each axis, counting the candidate
    #[arg(long, default_value_t = MAX_RUN_LENGTH, value_parser = clap::value_parser!(u8).range(2..=9).map(usize::from))]
    max_run_length: usize,

    /// Neighborhood radius for candidate cells
    #[arg(long, default_value_t = RELEVANCE_RADIUS, value_parser = clap::value_parser!(u8).range(1..=20).map(usize::from))]
    radius: usize,

    /// Answer fully tied positions with SUGGEST instead of a move
    #[arg(long)]
    suggest_on_tie: bool,

    /// Answer `INFO evaluate x,y` with a DEBUG line
    #[arg(long)]
    debug_eval: bool,

    /// Seed for the tie-break generator
    #[arg(long)]
    seed: Option<u64>,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_genome(cli: &Cli) -> Result<Genome> {
    let json = match (&cli.genome, &cli.genome_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("reading genome file {}", path.display()))?,
        (None, None) => return Ok(Genome::default()),
    };
    json.parse().context("invalid genome")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let genome = load_genome(&cli).inspect_err(|e| error!("{e:#}"))?;
    info!("genome {genome:?}");

    let strategy = if cli.lookahead {
        Strategy::Lookahead
    } else {
        Strategy::Heuristic
    };
    let evaluator = Evaluator::new(genome, strategy)
        .with_max_run_length(cli.max_run_length)
        .with_radius(cli.radius);
    let options = EngineOptions {
        suggest_on_tie: cli.suggest_on_tie,
        debug_eval: cli.debug_eval,
        seed: cli.seed,
    };

    let mut engine =
        Engine::new(evaluator, options, Output::stdout()).context("starting compute worker")?;
    engine
        .run(io::stdin().lock())
        .context("protocol I/O failed")?;
    Ok(())
}
