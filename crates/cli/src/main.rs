mod commands;
pub mod defaults;
mod printing;
mod scenario;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{init, run, validate};

/// metabreed: breeding stage of a metapopulation simulator
///
/// Runs individual-based reproduction across a set of patches: parents are
/// chosen by a mating system, offspring counts follow a demographic model,
/// and selection acts on offspring survival or on parentage.
#[derive(Parser, Debug)]
#[command(name = "metabreed")]
#[command(author, version, about = "Simulates reproduction in a structured population", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a template scenario file to start from.
    Init {
        /// Output path
        #[arg(short, long, default_value = defaults::SCENARIO_FILE)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run a scenario generation by generation.
    Run {
        /// Scenario file (JSON)
        #[arg(short, long, default_value = defaults::SCENARIO_FILE)]
        config: PathBuf,

        /// Override number of generations
        #[arg(short, long)]
        generations: Option<usize>,

        /// Override random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Show progress bar
        #[arg(long)]
        progress: bool,

        /// Print the final per-patch summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a scenario without running it.
    Validate {
        /// Scenario file (JSON)
        #[arg(short, long, default_value = defaults::SCENARIO_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init { output, force } => {
            init::init_scenario(&output, force)?;
        }
        Commands::Run {
            config,
            generations,
            seed,
            progress,
            json,
        } => {
            run::run_scenario(&config, generations, seed, progress, json)?;
        }
        Commands::Validate { config } => {
            validate::validate_scenario(&config)?;
        }
    }

    Ok(())
}
