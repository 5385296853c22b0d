//! Headless duel runner
//!
//! Pits two characters against each other, grants the winner experience and
//! prints the match report.

use std::path::PathBuf;
use std::sync::Arc;

use arena_duel::arena::{Duel, DuelReport, Entrant, TracingPresenter};
use arena_duel::core::config::{load_config, ArenaConfig};
use arena_duel::core::error::Result;
use arena_duel::progression::{JsonProfileStore, ProgressionEngine};
use arena_duel::world::Terrain;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Arena Duel - run a headless one-on-one match
#[derive(Parser, Debug)]
#[command(name = "arena-duel")]
#[command(about = "Run a one-on-one arena duel and persist the winner's progression")]
struct Args {
    /// Character id fighting for the red team
    #[arg(long, default_value = "red")]
    red: String,

    /// Character id fighting for the blue team
    #[arg(long, default_value = "blue")]
    blue: String,

    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding one JSON profile per character
    #[arg(long, default_value = "profiles")]
    profiles: PathBuf,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Override the match time limit in seconds
    #[arg(long)]
    max_seconds: Option<f32>,

    /// Half width of the square arena floor
    #[arg(long, default_value_t = 20.0)]
    arena_size: f32,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arena_duel=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(max_seconds) = args.max_seconds {
        config.duel.max_seconds = max_seconds;
        config.validate()?;
    }

    let store = JsonProfileStore::new(&args.profiles);
    let mut engine = ProgressionEngine::new(store, config.progression.clone(), seed);

    let red = Entrant::load(&args.red, &engine);
    let blue = Entrant::load(&args.blue, &engine);

    let terrain = Arc::new(Terrain::flat(args.arena_size));
    let mut duel = Duel::new(config, terrain, red, blue, seed)?;
    duel.set_presenter(Box::new(TracingPresenter));

    let report = duel.run(&mut engine)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, seed),
    }

    Ok(())
}

fn print_report(report: &DuelReport, seed: u64) {
    println!("=== Match {} (seed {}) ===", report.match_id, seed);
    match (&report.winner, report.winner_team) {
        (Some(winner), Some(team)) => println!("Winner: {} ({:?})", winner, team),
        _ if report.timed_out => println!("Draw: time limit reached"),
        _ => println!("Draw: no survivors"),
    }
    println!("Decided at: {:.1}s", report.decided_at);

    for award in &report.xp_awards {
        println!(
            "{} gained {} XP (level {} -> {})",
            award.character, award.amount, award.level_before, award.level_after
        );
        for upgrade in &award.upgrades {
            println!("  + {:?}", upgrade);
        }
    }

    for survivor in &report.survivors {
        println!(
            "  {:<12} {:?} {:>6.1}/{:<6.1} {:?}",
            survivor.character_id, survivor.team, survivor.health, survivor.max_health, survivor.state
        );
    }
    println!("Events logged: {}", report.events);
}
