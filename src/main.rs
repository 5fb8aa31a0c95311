//! Eldritch CLI - headless harness for the encounter engine.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use eldritch::simulation::Strategy;
use std::path::PathBuf;
use std::process::ExitCode;

/// Eldritch - proximity encounters and dice combat, without the map
#[derive(Parser, Debug)]
#[command(name = "eldritch")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scripted walk and print every encounter
    Walk {
        /// Scenario file (.json)
        #[arg(required = true)]
        scenario: PathBuf,

        /// Dice seed (overrides the scenario's seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::WalkFormat,
    },

    /// Run seeded duels per species and aggregate outcomes
    Balance {
        /// Only duel this species (default: all five)
        #[arg(long)]
        species: Option<String>,

        /// Duels per species (default: 1000)
        #[arg(short, long, default_value = "1000")]
        duels: u64,

        /// Starting seed (increments for each duel)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Autopilot: aggressive, cautious or pacifist
        #[arg(long, default_value = "aggressive")]
        strategy: Strategy,

        /// Engine config file (default: built-in values)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BalanceFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Load and validate an engine config file
    CheckConfig {
        /// Config file (.json)
        #[arg(required = true)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Walk {
            scenario,
            seed,
            format,
        } => cli::walk::execute(&scenario, seed, format),

        Commands::Balance {
            species,
            duels,
            seed,
            threads,
            strategy,
            config,
            format,
            progress,
        } => cli::balance::execute(
            species.as_deref(),
            duels,
            seed,
            threads,
            strategy,
            config.as_deref(),
            format,
            progress,
        ),

        Commands::CheckConfig { config } => cli::check_config::execute(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
