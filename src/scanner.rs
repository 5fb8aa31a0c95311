//! Proximity scanning.
//!
//! A scan measures the haversine distance from the player to every
//! un-encountered entity, in the fixed order monsters, POIs, mystery zones.
//! The first entity inside the trigger radius is latched and reported; the
//! nearest entity inside the warning ring is reported as a warning. Scans
//! are rate limited by [`ScanClock`] rather than run on every position fix.

use serde::Serialize;

use crate::config::EncounterConfig;
use crate::geo::GeoPoint;
use crate::world::{EntityCategory, EntityId, EntityProvider};

/// An entity that crossed the trigger radius this scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trigger {
    /// The latched entity.
    pub entity: EntityId,
    /// Distance from the player in meters.
    pub distance_m: f64,
}

/// The nearest entity inside the warning ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityWarning {
    /// The approaching entity.
    pub entity: EntityId,
    /// Distance from the player in meters.
    pub distance_m: f64,
}

/// Outcome of one scan tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScanReport {
    /// Whether the scan was skipped for lack of a usable position.
    pub skipped: bool,
    /// Entity latched this tick, if any.
    pub triggered: Option<Trigger>,
    /// Entity that was in trigger range but not latched because an
    /// encounter was already open.
    pub suppressed: Option<Trigger>,
    /// Nearest entity in the warning ring, if any.
    pub warning: Option<ProximityWarning>,
    /// Number of live entities measured.
    pub measured: usize,
}

impl ScanReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Distance-based trigger detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityScanner {
    trigger_radius_m: f64,
    warning_radius_m: f64,
}

impl ProximityScanner {
    /// Scanner with explicit radii.
    #[must_use]
    pub const fn new(trigger_radius_m: f64, warning_radius_m: f64) -> Self {
        Self {
            trigger_radius_m,
            warning_radius_m,
        }
    }

    /// Scanner using the radii from a config.
    #[must_use]
    pub const fn from_config(config: &EncounterConfig) -> Self {
        Self::new(config.trigger_radius_m, config.warning_radius_m)
    }

    /// Run one scan.
    ///
    /// When `allow_trigger` is false (an encounter is already open) nothing is
    /// latched, so entities in range stay live for a later tick; warnings are
    /// still reported.
    pub fn scan(
        &self,
        position: Option<GeoPoint>,
        world: &mut impl EntityProvider,
        allow_trigger: bool,
    ) -> ScanReport {
        let Some(position) = position else {
            log::debug!("no player position; scan skipped");
            return ScanReport::skipped();
        };
        if !position.is_valid() {
            log::warn!("unusable player position {position:?}; scan skipped");
            return ScanReport::skipped();
        }

        let mut report = ScanReport::default();
        let mut candidate: Option<Trigger> = None;

        for category in EntityCategory::SCAN_ORDER {
            let Some(entities) = world.entities(category) else {
                log::debug!("{category} collection not loaded; skipped");
                continue;
            };

            for entity in entities.iter().filter(|e| !e.encountered()) {
                let distance_m = position.distance_to(&entity.position);
                report.measured += 1;

                if distance_m < self.trigger_radius_m {
                    if candidate.is_none() {
                        candidate = Some(Trigger {
                            entity: entity.id,
                            distance_m,
                        });
                    }
                } else if distance_m < self.warning_radius_m {
                    // Strict comparison keeps the earlier entity on ties.
                    let nearer = report
                        .warning
                        .is_none_or(|w| distance_m < w.distance_m);
                    if nearer {
                        report.warning = Some(ProximityWarning {
                            entity: entity.id,
                            distance_m,
                        });
                    }
                }
            }
        }

        if !allow_trigger {
            report.suppressed = candidate;
            return report;
        }
        if let Some(trigger) = candidate {
            // Latch before anything else sees the entity.
            if world.mark_encountered(trigger.entity) {
                log::info!(
                    "entity {} triggered at {:.1} m",
                    trigger.entity,
                    trigger.distance_m
                );
                report.triggered = Some(trigger);
            }
        }

        report
    }
}

/// Fixed-interval gate for scan ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanClock {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl ScanClock {
    /// Clock that fires at most once per `interval_ms`.
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Whether a scan should run at `now_ms`. Records the tick when it does.
    ///
    /// The first call always fires. A clock that moves backwards never fires
    /// until it passes the last recorded tick plus the interval.
    pub fn due(&mut self, now_ms: u64) -> bool {
        let fire = match self.last_ms {
            None => true,
            Some(last) => now_ms >= last.saturating_add(self.interval_ms),
        };
        if fire {
            self.last_ms = Some(now_ms);
        }
        fire
    }

    /// The configured interval.
    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

/// Converts walked distance into earned steps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOdometer {
    last: Option<GeoPoint>,
    carried_m: f64,
}

impl StepOdometer {
    /// Feed a new position fix and return the steps it earns.
    ///
    /// Moves shorter than `jitter_m` are ignored entirely (the anchor does not
    /// move). Longer moves accumulate; every full `meters_per_step` earns one
    /// step and the remainder carries over.
    pub fn advance(&mut self, point: GeoPoint, jitter_m: f64, meters_per_step: f64) -> u32 {
        if !point.is_valid() || meters_per_step <= 0.0 {
            return 0;
        }
        let Some(last) = self.last else {
            self.last = Some(point);
            return 0;
        };

        let moved = last.distance_to(&point);
        if moved < jitter_m {
            return 0;
        }
        self.last = Some(point);
        self.carried_m += moved;

        let whole = (self.carried_m / meters_per_step).floor();
        self.carried_m -= whole * meters_per_step;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            whole.min(f64::from(u32::MAX)) as u32
        }
    }

    /// Meters walked toward the next step.
    #[must_use]
    pub const fn carried_m(&self) -> f64 {
        self.carried_m
    }
}
