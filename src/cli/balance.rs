//! Balance command implementation.

use super::output::{DuelStats, JsonBalanceResult, format_balance_csv, format_balance_text};
use super::{BalanceFormat, CliError};
use eldritch::simulation::{Strategy, run_duel};
use eldritch::{EncounterConfig, Species};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Execute the balance command.
///
/// # Errors
///
/// Returns an error if the species is unknown, the config cannot be loaded,
/// or the output cannot be serialized.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    species: Option<&str>,
    duels: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    strategy: Strategy,
    config_path: Option<&Path>,
    format: BalanceFormat,
    progress: bool,
) -> Result<(), CliError> {
    let roster: Vec<Species> = match species {
        Some(name) => {
            let species = Species::parse(name).ok_or_else(|| {
                let known: Vec<&str> = Species::ALL.iter().copied().map(Species::name).collect();
                CliError::new(format!(
                    "unknown species '{name}' (expected one of: {})",
                    known.join(", ")
                ))
            })?;
            vec![species]
        }
        None => Species::ALL.to_vec(),
    };

    let config = match config_path {
        Some(path) => EncounterConfig::load(path)
            .map_err(|e| CliError::new(format!("{}: {e}", path.display())))?,
        None => EncounterConfig::default(),
    };

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    // Base seed
    let base_seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(42, |d| d.as_secs())
    });

    let total = duels.saturating_mul(roster.len() as u64);

    // Progress bar
    let pb = if progress {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} duels ({per_sec})",
            )
            .map_err(|e| CliError::new(format!("invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates into its own DuelStats, merged at the end
    let stats = (0..total)
        .into_par_iter()
        .fold(
            || DuelStats::new(&roster),
            |mut local, i| {
                let species_idx = usize::try_from(i % roster.len() as u64).unwrap_or(0);
                let duel_seed = base_seed.wrapping_add(i / roster.len() as u64);
                let result = run_duel(duel_seed, roster[species_idx], strategy, &config);
                local.add_result(&result);
                local
            },
        )
        .reduce(
            || DuelStats::new(&roster),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    // Update progress bar after completion
    if let Some(pb) = pb {
        pb.set_position(stats.duels_run);
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    #[allow(clippy::cast_precision_loss)]
    let duels_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.duels_run as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BalanceFormat::Text => {
            println!();
            print!("{}", format_balance_text(&stats, strategy));
            println!();
            println!("Duration: {:.2}s ({:.0} duels/sec)", duration.as_secs_f64(), duels_per_sec);
        }
        BalanceFormat::Json => {
            let json_result = JsonBalanceResult::from_stats(&stats, strategy);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
        BalanceFormat::Csv => {
            print!("{}", format_balance_csv(&stats));
        }
    }

    Ok(())
}
