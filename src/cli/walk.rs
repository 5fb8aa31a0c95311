//! Walk command implementation.

use super::output::format_walk_text;
use super::{CliError, WalkFormat};
use eldritch::simulation::{Scenario, run_scenario};
use std::path::Path;

/// Execute the walk command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or the report cannot be
/// serialized.
pub(crate) fn execute(path: &Path, seed: Option<u64>, format: WalkFormat) -> Result<(), CliError> {
    let scenario = Scenario::load(path)
        .map_err(|e| CliError::new(format!("{}: {e}", path.display())))?;
    let report = run_scenario(&scenario, seed);

    match format {
        WalkFormat::Text => print!("{}", format_walk_text(&report)),
        WalkFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
