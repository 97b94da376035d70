//! av-sim command line front end

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use av_engine::GameConfig;
use av_sim::{BatchConfig, BatchRunner, load_config};
use clap::Parser;

#[derive(Parser)]
#[command(name = "av-sim")]
#[command(about = "Batch spin simulator for the avalanche engine")]
struct Cli {
    /// Number of spins to play
    #[arg(short, long, default_value_t = 100_000)]
    spins: u64,

    /// Base seed for all worker streams
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Stake per spin
    #[arg(short, long, default_value_t = 1.0)]
    bet: f64,

    /// Logical workers (defaults to the CPU count)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Use free spins weights
    #[arg(long)]
    free_spins: bool,

    /// Plant an explosive wild on every first drop
    #[arg(long)]
    force_explosive_wild: bool,

    /// Game configuration file (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.spins == 0 {
        bail!("--spins must be at least 1");
    }

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GameConfig::standard(),
    };
    let runner = BatchRunner::new(Arc::new(config)).context("Invalid game config")?;

    let batch = BatchConfig {
        spins: cli.spins,
        base_seed: cli.seed,
        bet: cli.bet,
        free_spins: cli.free_spins,
        force_explosive_wild: cli.force_explosive_wild,
        workers: cli.workers.unwrap_or_else(num_cpus::get),
    };
    let report = runner.run(&batch).context("Batch run failed")?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }
    Ok(())
}
