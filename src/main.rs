//! Hexbugs - command-line runner
//!
//! Seeds one founder at the centre of the world and runs the adaptive
//! schedule until the turn limit or extinction, then writes a snapshot.

use std::path::PathBuf;

use clap::Parser;
use hexbugs::core::config::SimulationConfig;
use hexbugs::core::error::Result;
use hexbugs::report::{Census, PopulationSnapshot};
use hexbugs::simulation::{Simulation, SimulationState};
use tracing_subscriber::EnvFilter;

/// Run a hexbugs population
#[derive(Parser, Debug)]
#[command(name = "hexbugs")]
#[command(about = "Evolve a population of gene-tree agents on a hex world")]
struct Args {
    /// Random seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Turns to run
    #[arg(long, default_value_t = 10_000)]
    turns: u64,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the final JSON snapshot
    #[arg(long, default_value = "hexbugs_snapshot.json")]
    output: PathBuf,

    /// Log a status line every n turns
    #[arg(long, default_value_t = 100)]
    status_every: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexbugs=info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    tracing::info!(
        seed = config.seed,
        width = config.world.width,
        height = config.world.height,
        turns = args.turns,
        "hexbugs starting"
    );

    let mut sim = Simulation::with_founder(config)?;
    let every = args.status_every.max(1);
    for _ in 0..args.turns {
        if sim.is_extinct() {
            tracing::info!(turn = sim.turn(), "all agents dead");
            break;
        }
        sim.step()?;
        if sim.turn() % every == 0 {
            log_status(&sim.state);
        }
    }

    let census = Census::take(&sim.state);
    tracing::info!(
        turn = census.turn,
        population = census.population,
        red = census.red,
        green = census.green,
        blue = census.blue,
        "final census"
    );
    for notable in &census.notables {
        tracing::info!(title = %notable.title, uid = %notable.uid, score = notable.score, "notable");
    }

    PopulationSnapshot::capture(&sim.state).write(&args.output)?;
    tracing::info!(path = %args.output.display(), "snapshot written");
    Ok(())
}

fn log_status(state: &SimulationState) {
    let Some(stats) = state.history.latest() else {
        return;
    };
    let cells = (state.world.width() * state.world.height()) as f64;
    let oldest = state
        .population
        .first()
        .and_then(|id| state.agent(id))
        .map(|a| a.uid.0)
        .unwrap_or(0);
    tracing::info!(
        turn = stats.turn,
        population = stats.population,
        density = %format!("{:.1}%", stats.population as f64 * 100.0 / cells),
        oldest,
        uids = state.next_uid(),
        food = %format!("{:.0}", stats.total_food.raw() as f64 / cells),
        mass = %format!("{:.0}", stats.mean_mass().raw() as f64 / 1024.0),
        genes = stats.mean_genes(),
        age_floor = state.config.division.age_floor,
        "status"
    );
}
