//! Output formatting utilities for CLI.

use eldritch::combat::CombatOutcome;
use eldritch::simulation::{DuelResult, Strategy, WalkReport};
use eldritch::{EncounterEvent, EncounterOutcome, Species};
use serde::Serialize;
use std::fmt::Write as _;

/// Format one engine event as a log line.
pub(super) fn format_event(event: &EncounterEvent) -> String {
    match event {
        EncounterEvent::ProximityWarning {
            entity,
            name,
            distance_m,
        } => format!("[{entity}] {name} is near ({distance_m:.0} m)"),
        EncounterEvent::Triggered {
            entity,
            title,
            choices,
            ..
        } => {
            let choices: Vec<String> = choices.iter().map(ToString::to_string).collect();
            format!("[{entity}] {title} Choices: {}", choices.join(", "))
        }
        EncounterEvent::TurnResolved { line } => format!("    {line}"),
        EncounterEvent::Resolved {
            entity,
            outcome,
            rewards,
        } => {
            let mut line = format!("[{entity}] resolved: {outcome}");
            if rewards.steps > 0 {
                let _ = write!(line, ", +{} steps", rewards.steps);
            }
            if rewards.experience > 0 {
                let _ = write!(line, ", +{} XP", rewards.experience);
            }
            if !rewards.items.is_empty() {
                let _ = write!(line, ", items: {}", rewards.items.join(", "));
            }
            if !rewards.discoveries.is_empty() {
                let _ = write!(line, ", discovered: {}", rewards.discoveries.join(", "));
            }
            line
        }
        EncounterEvent::StepsChanged { balance } => format!("    steps: {balance}"),
        EncounterEvent::ActionRejected { message } => format!("    rejected: {message}"),
        EncounterEvent::LevelUp(level_up) => format!("    level up! now level {}", level_up.level),
    }
}

/// Format a walk report as human-readable text.
pub(super) fn format_walk_text(report: &WalkReport) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Walk ({} waypoints, seed {}, {} strategy)",
        report.waypoints, report.seed, report.strategy
    );
    output.push_str("========================================\n\n");

    for event in &report.events {
        output.push_str(&format_event(event));
        output.push('\n');
    }

    let ledger = &report.ledger;
    let player = &report.player;
    output.push_str("\nLedger:\n");
    let _ = writeln!(output, "  Encounters: {}", report.encounters.len());
    let _ = writeln!(
        output,
        "  Steps: {} (earned {}, spent {})",
        ledger.balance, ledger.steps_earned, ledger.steps_spent
    );
    let _ = writeln!(output, "  Experience: {}", ledger.experience);
    let _ = writeln!(output, "  Items: {}", ledger.items.len());
    let _ = writeln!(output, "  Discoveries: {}", ledger.discoveries.len());
    output.push_str("\nPlayer:\n");
    let _ = writeln!(
        output,
        "  Level {} | HP {}/{} | Sanity {}",
        player.level, player.health, player.max_health, player.sanity
    );

    output
}

/// Per-species duel counters.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct SpeciesStats {
    /// Duels fought.
    pub(super) duels: u64,
    /// Battles won.
    pub(super) victories: u64,
    /// Battles lost.
    pub(super) defeats: u64,
    /// Escapes, from the intro or mid-battle.
    pub(super) fled: u64,
    /// Duels that never reached a battle outcome.
    pub(super) other: u64,
    /// Battle turns across all duels.
    total_rounds: u64,
    /// Health left across victories.
    victory_health: u64,
}

/// Balance statistics aggregated over many duels.
#[derive(Debug)]
pub(super) struct DuelStats {
    /// Species in report order.
    species: Vec<Species>,
    /// Counters, parallel to `species`.
    rows: Vec<SpeciesStats>,
    /// Total duels run.
    pub(super) duels_run: u64,
}

impl DuelStats {
    /// Create empty stats for the given species.
    pub(super) fn new(species: &[Species]) -> Self {
        Self {
            species: species.to_vec(),
            rows: vec![SpeciesStats::default(); species.len()],
            duels_run: 0,
        }
    }

    /// Add a duel result to the stats.
    pub(super) fn add_result(&mut self, result: &DuelResult) {
        self.duels_run += 1;
        let Some(idx) = self.species.iter().position(|s| *s == result.species) else {
            return;
        };
        let row = &mut self.rows[idx];
        row.duels += 1;
        row.total_rounds += u64::from(result.rounds);
        match result.outcome {
            EncounterOutcome::Combat(CombatOutcome::Victory) => {
                row.victories += 1;
                row.victory_health += u64::try_from(result.health_left).unwrap_or(0);
            }
            EncounterOutcome::Combat(CombatOutcome::Defeat) => row.defeats += 1,
            EncounterOutcome::Combat(CombatOutcome::Fled) => row.fled += 1,
            _ => row.other += 1,
        }
    }

    /// Merge another partial result into this one.
    pub(super) fn merge(&mut self, other: &DuelStats) {
        self.duels_run += other.duels_run;
        for (row, theirs) in self.rows.iter_mut().zip(&other.rows) {
            row.duels += theirs.duels;
            row.victories += theirs.victories;
            row.defeats += theirs.defeats;
            row.fled += theirs.fled;
            row.other += theirs.other;
            row.total_rounds += theirs.total_rounds;
            row.victory_health += theirs.victory_health;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn rate(count: u64, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        count as f64 / total as f64
    }

    fn iter_rows(&self) -> impl Iterator<Item = (Species, &SpeciesStats)> {
        self.species.iter().copied().zip(&self.rows)
    }
}

impl SpeciesStats {
    /// Victory rate (0.0-1.0).
    pub(super) fn victory_rate(&self) -> f64 {
        DuelStats::rate(self.victories, self.duels)
    }

    /// Defeat rate (0.0-1.0).
    pub(super) fn defeat_rate(&self) -> f64 {
        DuelStats::rate(self.defeats, self.duels)
    }

    /// Flee rate (0.0-1.0).
    pub(super) fn flee_rate(&self) -> f64 {
        DuelStats::rate(self.fled, self.duels)
    }

    /// Mean battle turns per duel.
    pub(super) fn avg_rounds(&self) -> f64 {
        DuelStats::rate(self.total_rounds, self.duels)
    }

    /// Mean health left after a victory.
    pub(super) fn avg_victory_health(&self) -> f64 {
        DuelStats::rate(self.victory_health, self.victories)
    }
}

/// JSON-serializable balance result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBalanceResult {
    /// Total duels run.
    duels_run: u64,
    /// Autopilot used.
    strategy: Strategy,
    /// Per-species statistics.
    species: Vec<JsonSpeciesResult>,
}

/// JSON-serializable per-species stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonSpeciesResult {
    /// Species name.
    species: String,
    /// Duels fought.
    duels: u64,
    /// Victory rate (0.0-1.0).
    victory_rate: f64,
    /// Defeat rate (0.0-1.0).
    defeat_rate: f64,
    /// Flee rate (0.0-1.0).
    flee_rate: f64,
    /// Mean battle turns.
    avg_rounds: f64,
    /// Mean health left after a victory.
    avg_victory_health: f64,
}

impl JsonBalanceResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &DuelStats, strategy: Strategy) -> Self {
        let species = stats
            .iter_rows()
            .map(|(species, row)| JsonSpeciesResult {
                species: species.name().to_string(),
                duels: row.duels,
                victory_rate: row.victory_rate(),
                defeat_rate: row.defeat_rate(),
                flee_rate: row.flee_rate(),
                avg_rounds: row.avg_rounds(),
                avg_victory_health: row.avg_victory_health(),
            })
            .collect();

        Self {
            duels_run: stats.duels_run,
            strategy,
            species,
        }
    }
}

/// Format balance stats as human-readable text.
pub(super) fn format_balance_text(stats: &DuelStats, strategy: Strategy) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Balance Results ({} duels, {strategy})", stats.duels_run);
    output.push_str("========================================\n\n");

    for (species, row) in stats.iter_rows() {
        let _ = writeln!(output, "{} ({} duels):", species.name(), row.duels);
        let _ = writeln!(
            output,
            "  Victory {:.1}% | Defeat {:.1}% | Fled {:.1}%",
            row.victory_rate() * 100.0,
            row.defeat_rate() * 100.0,
            row.flee_rate() * 100.0
        );
        if row.other > 0 {
            let _ = writeln!(output, "  Other: {}", row.other);
        }
        let _ = writeln!(
            output,
            "  Average: {:.1} turns, {:.1} HP left on victory",
            row.avg_rounds(),
            row.avg_victory_health()
        );
    }

    output
}

/// Format balance stats as CSV.
pub(super) fn format_balance_csv(stats: &DuelStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("species,duels,victory_rate,defeat_rate,flee_rate,avg_rounds,avg_victory_health\n");

    // Data rows
    for (species, row) in stats.iter_rows() {
        let _ = writeln!(
            output,
            "{},{},{:.4},{:.4},{:.4},{:.2},{:.2}",
            species.name(),
            row.duels,
            row.victory_rate(),
            row.defeat_rate(),
            row.flee_rate(),
            row.avg_rounds(),
            row.avg_victory_health()
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel(
        species: Species,
        outcome: EncounterOutcome,
        rounds: u32,
        health_left: i32,
    ) -> DuelResult {
        DuelResult {
            seed: 0,
            species,
            strategy: Strategy::Aggressive,
            outcome,
            rounds,
            health_left,
            steps_spent: u64::from(rounds) * 10,
        }
    }

    #[test]
    fn test_add_and_merge() {
        let species = [Species::VoidWalker, Species::CosmicBeast];
        let mut a = DuelStats::new(&species);
        let victory = EncounterOutcome::Combat(CombatOutcome::Victory);
        let defeat = EncounterOutcome::Combat(CombatOutcome::Defeat);
        a.add_result(&duel(Species::VoidWalker, victory, 4, 60));
        let mut b = DuelStats::new(&species);
        b.add_result(&duel(Species::VoidWalker, defeat, 6, 0));
        b.add_result(&duel(Species::CosmicBeast, EncounterOutcome::Abandoned, 0, 100));
        a.merge(&b);

        assert_eq!(a.duels_run, 3);
        let walker = &a.rows[0];
        assert_eq!(walker.duels, 2);
        assert!((walker.victory_rate() - 0.5).abs() < 1e-9);
        assert!((walker.avg_rounds() - 5.0).abs() < 1e-9);
        assert!((walker.avg_victory_health() - 60.0).abs() < 1e-9);
        assert_eq!(a.rows[1].other, 1);
    }

    #[test]
    fn test_csv_has_row_per_species() {
        let stats = DuelStats::new(&Species::ALL);
        let csv = format_balance_csv(&stats);
        assert_eq!(csv.lines().count(), 1 + Species::ALL.len());
        assert!(csv.contains("Crystal Guardian,0,"));
    }
}
