//! Check-config command implementation.

use super::CliError;
use eldritch::EncounterConfig;
use std::path::Path;

/// Execute the check-config command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub(crate) fn execute(path: &Path) -> Result<(), CliError> {
    let config = EncounterConfig::load(path)
        .map_err(|e| CliError::new(format!("{}: {e}", path.display())))?;

    println!("{}: OK", path.display());
    println!(
        "  Trigger radius: {:.0} m (warning at {:.0} m)",
        config.trigger_radius_m, config.warning_radius_m
    );
    println!("  Scan interval: {} ms", config.scan_interval_ms);
    println!(
        "  Costs: attack {} | defend {} | flee {} | observe {} | investigate {}",
        config.costs.attack,
        config.costs.defend,
        config.costs.flee,
        config.costs.observe,
        config.costs.investigate
    );
    println!(
        "  Victory: {}..{} steps, {}..{} XP",
        config.victory_steps.min,
        config.victory_steps.max,
        config.victory_experience.min,
        config.victory_experience.max
    );
    Ok(())
}
