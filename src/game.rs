//! Game facade.
//!
//! Wires the pieces together for one player session:
//! - position fixes feed the step odometer
//! - scan ticks run the proximity scanner and open sessions
//! - choices go through the dispatcher, which charges the ledger
//! - everything the presentation layer should see goes to an [`EventSink`]
//!
//! `Game` is the single writer of player, world and ledger state.

use crate::config::EncounterConfig;
use crate::dice::Dice;
use crate::encounter::{
    Choice, ChoiceResult, Dispatcher, EncounterContext, EncounterError, EncounterSession,
    Resolution,
};
use crate::events::{EncounterEvent, EventSink};
use crate::geo::{GeoPoint, PositionSource};
use crate::invariants::{self, InvariantViolation};
use crate::ledger::{Credit, RewardLedger};
use crate::player::PlayerState;
use crate::scanner::{ProximityScanner, ScanClock, ScanReport, StepOdometer};
use crate::world::{EntityId, EntityProvider, World};

/// One player's session: world, wallet, open encounter and dice.
#[derive(Debug, Clone)]
pub struct Game<D> {
    config: EncounterConfig,
    player: PlayerState,
    world: World,
    ledger: RewardLedger,
    dispatcher: Dispatcher,
    scanner: ProximityScanner,
    clock: ScanClock,
    odometer: StepOdometer,
    dice: D,
}

impl<D: Dice> Game<D> {
    /// Start a session with a default player and `config.starting_steps` in the wallet.
    #[must_use]
    pub fn new(config: EncounterConfig, world: World, dice: D) -> Self {
        log::debug!(
            "new game: {} entities, {} starting steps",
            world.len(),
            config.starting_steps
        );
        Self {
            player: PlayerState::default(),
            world,
            ledger: RewardLedger::with_balance(config.starting_steps),
            dispatcher: Dispatcher::new(),
            scanner: ProximityScanner::from_config(&config),
            clock: ScanClock::new(config.scan_interval_ms),
            odometer: StepOdometer::default(),
            dice,
            config,
        }
    }

    /// Replace the starting player.
    #[must_use]
    pub fn with_player(mut self, player: PlayerState) -> Self {
        self.player = player;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EncounterConfig {
        &self.config
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &PlayerState {
        &self.player
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Reward totals and wallet.
    #[must_use]
    pub const fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    /// Current step balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.ledger.balance()
    }

    /// The dice source.
    #[must_use]
    pub const fn dice(&self) -> &D {
        &self.dice
    }

    /// Session bookkeeping.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The open encounter, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&EncounterSession> {
        self.dispatcher.session()
    }

    /// Choices the open encounter offers right now.
    #[must_use]
    pub fn offered_choices(&self) -> Vec<Choice> {
        self.session()
            .map(EncounterSession::offered_choices)
            .unwrap_or_default()
    }

    /// Feed a position fix to the step odometer. Returns steps earned.
    pub fn update_position(&mut self, point: GeoPoint, sink: &mut impl EventSink) -> u32 {
        let steps = self.odometer.advance(
            point,
            self.config.jitter_threshold_m,
            self.config.meters_per_step,
        );
        if steps > 0 {
            self.ledger.credit(Credit::Steps(steps));
            log::debug!("walked: +{steps} steps");
            sink.emit(EncounterEvent::StepsChanged {
                balance: self.ledger.balance(),
            });
        }
        steps
    }

    /// Run a scan if the scan interval has elapsed at `now_ms`.
    ///
    /// Returns `None` when the tick was not due.
    pub fn tick(
        &mut self,
        now_ms: u64,
        source: &impl PositionSource,
        sink: &mut impl EventSink,
    ) -> Option<ScanReport> {
        if !self.clock.due(now_ms) {
            return None;
        }
        Some(self.scan_now(source, sink))
    }

    /// Run a scan immediately, ignoring the scan clock.
    pub fn scan_now(
        &mut self,
        source: &impl PositionSource,
        sink: &mut impl EventSink,
    ) -> ScanReport {
        let allow_trigger = !self.dispatcher.is_active();
        let report = self
            .scanner
            .scan(source.current_position(), &mut self.world, allow_trigger);

        if let Some(warning) = report.warning {
            let name = self
                .world
                .entity(warning.entity)
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            sink.emit(EncounterEvent::ProximityWarning {
                entity: warning.entity,
                name,
                distance_m: warning.distance_m,
            });
        }
        if let Some(held) = report.suppressed {
            log::debug!("trigger for {} dropped: encounter in progress", held.entity);
        }
        if let Some(trigger) = report.triggered {
            if let Err(e) = self.open_session(trigger.entity, sink) {
                log::warn!("could not open encounter for {}: {e}", trigger.entity);
            }
        }

        self.assert_invariants();
        report
    }

    /// Open an encounter with a specific entity without a proximity check.
    ///
    /// Latches the entity the same way a scan would.
    ///
    /// # Errors
    ///
    /// - [`EncounterError::SessionActive`] when an encounter is already open.
    /// - [`EncounterError::UnknownEntity`] when `id` is not in the world.
    /// - [`EncounterError::AlreadyEncountered`] when the entity is latched.
    pub fn trigger(
        &mut self,
        id: EntityId,
        sink: &mut impl EventSink,
    ) -> Result<(), EncounterError> {
        if let Some(active) = self.dispatcher.session() {
            log::debug!("trigger for {id} dropped: encounter in progress");
            return Err(EncounterError::SessionActive {
                active: active.entity(),
            });
        }
        let entity = self
            .world
            .entity(id)
            .ok_or(EncounterError::UnknownEntity(id))?;
        if entity.encountered() {
            return Err(EncounterError::AlreadyEncountered(id));
        }
        self.world.mark_encountered(id);
        self.open_session(id, sink)?;
        self.assert_invariants();
        Ok(())
    }

    fn open_session(
        &mut self,
        id: EntityId,
        sink: &mut impl EventSink,
    ) -> Result<(), EncounterError> {
        let entity = self
            .world
            .entity(id)
            .ok_or(EncounterError::UnknownEntity(id))?;
        let session = self.dispatcher.open(entity)?;
        sink.emit(EncounterEvent::Triggered {
            entity: id,
            category: session.kind().category(),
            title: session.title(),
            choices: session.offered_choices(),
        });
        Ok(())
    }

    /// Make a choice in the open encounter.
    ///
    /// A refused choice is reported to `sink` as
    /// [`EncounterEvent::ActionRejected`] and leaves every piece of state as
    /// it was.
    ///
    /// # Errors
    ///
    /// Returns the [`EncounterError`] that caused the refusal.
    pub fn choose(
        &mut self,
        choice: Choice,
        sink: &mut impl EventSink,
    ) -> Result<ChoiceResult, EncounterError> {
        let before = self.ledger.balance();
        let mut ctx = EncounterContext {
            config: &self.config,
            player: &mut self.player,
            ledger: &mut self.ledger,
            dice: &mut self.dice,
        };
        let result = match self.dispatcher.choose(choice, &mut ctx) {
            Ok(result) => result,
            Err(e) => {
                log::info!("{choice} rejected: {e}");
                sink.emit(EncounterEvent::ActionRejected {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        for line in &result.lines {
            sink.emit(EncounterEvent::TurnResolved { line: line.clone() });
        }
        if result.spent > 0 || result.balance != before {
            sink.emit(EncounterEvent::StepsChanged {
                balance: result.balance,
            });
        }
        if let Some(resolution) = &result.resolution {
            Self::emit_resolution(resolution, sink);
        }

        self.assert_invariants();
        Ok(result)
    }

    /// Walk away from the open encounter. Pays nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EncounterError::NoActiveSession`] when nothing is open.
    pub fn close(&mut self, sink: &mut impl EventSink) -> Result<Resolution, EncounterError> {
        let resolution = self.dispatcher.close()?;
        Self::emit_resolution(&resolution, sink);
        self.assert_invariants();
        Ok(resolution)
    }

    fn emit_resolution(resolution: &Resolution, sink: &mut impl EventSink) {
        for level_up in &resolution.level_ups {
            sink.emit(EncounterEvent::LevelUp(*level_up));
        }
        sink.emit(EncounterEvent::Resolved {
            entity: resolution.entity,
            outcome: resolution.outcome,
            rewards: resolution.rewards.clone(),
        });
    }

    /// Clear every encounter latch so entities can trigger again.
    ///
    /// # Errors
    ///
    /// Refused with [`EncounterError::SessionActive`] while an encounter is
    /// open, since its entity must stay latched until it resolves.
    pub fn reset_encounters(&mut self) -> Result<(), EncounterError> {
        if let Some(session) = self.dispatcher.session() {
            let active = session.entity();
            log::warn!("latch reset refused: encounter with {active} in progress");
            return Err(EncounterError::SessionActive { active });
        }
        self.world.reset_encounters();
        self.assert_invariants();
        Ok(())
    }

    /// Invariant violations in the current state.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        invariants::check_invariants(self)
    }

    fn assert_invariants(&self) {
        invariants::assert_invariants(self);
    }
}
