//! Cars and their charging state machine
//!
//! A car accepts one energy package at a time. Claiming a package blocks the
//! car and spawns a driver task that advances a [`ChargeCycle`] once per tick
//! until the cycle reaches a terminal condition, then unblocks the car.
//!
//! Battery level, blocked flag and the cancel handle live behind a single
//! mutex so readers never see a charge level from one transition paired with
//! the blocked flag of another.

use crate::config::{CarConfig, ChargingConfig};
use crate::cycle::{ChargeCycle, CycleOutcome, CycleState, TickDecision};
use crate::energy::EnergyPackage;
use crate::error::{ChargeError, Result};
use crate::feedback::{self, ChargeReport, leds_to_light};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::player::Player;
use crate::ticker::{IntervalTicks, TickSource};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{oneshot, watch};

/// Progress notification invoked after every applied increment
pub type ProgressCallback = Box<dyn FnMut(&ChargeProgress) + Send>;

/// Snapshot handed to the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChargeProgress {
    /// Battery level after the increment
    pub charged_wh: u32,
    /// Energy delivered by the running cycle so far
    pub energy_delivered_wh: u32,
    /// Seconds of the cycle that had passed before this increment, so the
    /// first report of a cycle carries 0
    pub seconds_passed: u32,
    /// LEDs lit for the new level
    pub leds_to_light: u8,
    /// Range for the new level
    pub range_km: u32,
}

/// Read-only view of a car for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarSnapshot {
    pub name: String,
    pub chip_ids: Vec<String>,
    pub battery_capacity_wh: u32,
    pub charged_capacity_wh: u32,
    pub range_km: u32,
    pub blocked: bool,
    pub state: CycleState,
    pub owner: Option<String>,
}

#[derive(Debug)]
struct BatteryState {
    charged_wh: u32,
    blocked: bool,
    cancel: Option<oneshot::Sender<()>>,
    last_outcome: Option<CycleOutcome>,
}

/// A car in the renewable charge game
pub struct Car {
    /// RFID chip serials joined by `:`
    registration: String,
    name: String,
    battery_capacity_wh: u32,
    energy_efficiency_km_wh: f32,
    charging: ChargingConfig,
    state: Mutex<BatteryState>,
    blocked_tx: watch::Sender<bool>,
    owner: Mutex<Weak<Player>>,
    logger: StructuredLogger,
}

impl Car {
    /// Create an uncharged, unowned car
    ///
    /// `max_range_km` is the range on a full battery and determines the
    /// car's efficiency.
    pub fn new(
        registration: &str,
        name: &str,
        battery_capacity_wh: u32,
        max_range_km: u32,
        charging: ChargingConfig,
    ) -> Self {
        let energy_efficiency_km_wh = if battery_capacity_wh == 0 {
            0.0
        } else {
            max_range_km as f32 / battery_capacity_wh as f32
        };
        let (blocked_tx, _) = watch::channel(false);

        Self {
            registration: registration.to_string(),
            name: name.to_string(),
            battery_capacity_wh,
            energy_efficiency_km_wh,
            charging,
            state: Mutex::new(BatteryState {
                charged_wh: 0,
                blocked: false,
                cancel: None,
                last_outcome: None,
            }),
            blocked_tx,
            owner: Mutex::new(Weak::new()),
            logger: get_logger_with_context(LogContext::new("car").with_car(name)),
        }
    }

    pub fn from_config(config: &CarConfig, charging: ChargingConfig) -> Self {
        Self::new(
            &config.chip_ids,
            &config.name,
            config.battery_capacity_wh,
            config.max_range_km,
            charging,
        )
    }

    /// Start with a partially charged battery, capped at capacity
    #[must_use]
    pub fn with_charged_capacity(self, charged_wh: u32) -> Self {
        self.lock_state().charged_wh = charged_wh.min(self.battery_capacity_wh);
        self
    }

    /// Chip serials this car is registered under
    pub fn chip_ids(&self) -> Vec<String> {
        self.registration.split(':').map(str::to_string).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn battery_capacity_wh(&self) -> u32 {
        self.battery_capacity_wh
    }

    pub fn charged_capacity_wh(&self) -> u32 {
        self.lock_state().charged_wh
    }

    /// Kilometers per watt-hour
    pub const fn energy_efficiency_km_wh(&self) -> f32 {
        self.energy_efficiency_km_wh
    }

    pub const fn charging_config(&self) -> &ChargingConfig {
        &self.charging
    }

    /// Whether a charge cycle is running
    pub fn is_blocked(&self) -> bool {
        self.lock_state().blocked
    }

    /// Range in kilometers for the current charge
    pub fn range_in_km(&self) -> u32 {
        self.range_for(self.charged_capacity_wh())
    }

    fn range_for(&self, charged_wh: u32) -> u32 {
        (f64::from(charged_wh) * f64::from(self.energy_efficiency_km_wh)).floor() as u32
    }

    /// Current player, if one is assigned and still in the game
    pub fn owner(&self) -> Option<Arc<Player>> {
        self.owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    /// Assign the car to a player without taking ownership of the player
    pub fn set_owner(&self, owner: &Arc<Player>) {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(owner);
        self.logger
            .debug(&format!("Owner set to {}", owner.name()));
    }

    pub fn clear_owner(&self) {
        *self.owner.lock().unwrap_or_else(PoisonError::into_inner) = Weak::new();
    }

    /// Idle, charging, or how the last cycle ended
    pub fn cycle_state(&self) -> CycleState {
        let state = self.lock_state();
        if state.blocked {
            CycleState::Charging
        } else {
            state
                .last_outcome
                .map_or(CycleState::Idle, CycleState::Finished)
        }
    }

    /// Consistent view of the car for display
    pub fn snapshot(&self) -> CarSnapshot {
        let (charged_wh, blocked, last_outcome) = {
            let state = self.lock_state();
            (state.charged_wh, state.blocked, state.last_outcome)
        };
        let state = if blocked {
            CycleState::Charging
        } else {
            last_outcome.map_or(CycleState::Idle, CycleState::Finished)
        };

        CarSnapshot {
            name: self.name.clone(),
            chip_ids: self.chip_ids(),
            battery_capacity_wh: self.battery_capacity_wh,
            charged_capacity_wh: charged_wh,
            range_km: self.range_for(charged_wh),
            blocked,
            state,
            owner: self.owner().map(|p| p.name().to_string()),
        }
    }

    /// Watch the blocked flag
    pub fn subscribe_blocked(&self) -> watch::Receiver<bool> {
        self.blocked_tx.subscribe()
    }

    /// Wait until no charge cycle is running
    pub async fn wait_until_idle(&self) {
        let mut rx = self.subscribe_blocked();
        // The sender lives as long as the car, so this only ends on idle
        let _ = rx.wait_for(|blocked| !*blocked).await;
    }

    /// Claim an energy package, charging once per configured tick interval
    ///
    /// Returns false without side effects when the car is already charging.
    /// Otherwise the car is blocked, a cycle is scheduled and true is returned
    /// right away; charging continues in the background.
    pub fn claim_package(
        self: &Arc<Self>,
        package: EnergyPackage,
        on_every_charge: Option<ProgressCallback>,
    ) -> bool {
        if tokio::runtime::Handle::try_current().is_err() {
            self.logger
                .error("Cannot schedule a charge cycle outside of a Tokio runtime");
            return false;
        }
        let ticks = IntervalTicks::new(self.charging.tick_interval());
        self.claim_package_with(package, on_every_charge, ticks)
    }

    /// Claim an energy package with an explicit tick source
    pub fn claim_package_with<T: TickSource + 'static>(
        self: &Arc<Self>,
        package: EnergyPackage,
        on_every_charge: Option<ProgressCallback>,
        ticks: T,
    ) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.logger
                .error("Cannot schedule a charge cycle outside of a Tokio runtime");
            return false;
        };

        let cancel_rx = {
            let mut state = self.lock_state();
            if state.blocked {
                self.logger
                    .info(&format!("Attempt to charge blocked car: {}", self.name));
                return false;
            }
            let (cancel_tx, cancel_rx) = oneshot::channel();
            state.blocked = true;
            state.cancel = Some(cancel_tx);
            self.blocked_tx.send_replace(true);
            cancel_rx
        };

        let cycle = ChargeCycle::start(&package, &self.charging);
        let logger = self.cycle_logger(&cycle);
        if cycle.is_degenerate() {
            logger.warn(&format!(
                "Package of {package} yields no charge time; cycle ends on its first tick"
            ));
        } else {
            logger.info(&format!(
                "Accepted {package}: {} Wh per tick over {} s",
                cycle.increment_wh(),
                cycle.total_duration_s()
            ));
        }

        // Owned by the driver future so the car is released even if the task
        // panics or is dropped unpolled
        let release = ReleaseOnDrop {
            car: Arc::clone(self),
            outcome: None,
        };
        runtime.spawn(Arc::clone(self).drive(cycle, ticks, on_every_charge, cancel_rx, release));
        true
    }

    /// Abort the running cycle at the next tick boundary
    ///
    /// Returns false when no cycle was running. When true is returned the
    /// cycle ends as [`CycleOutcome::Cancelled`], even if its last tick was
    /// already under way.
    pub fn cancel_charge(&self) -> bool {
        let cancel = self.lock_state().cancel.take();
        match cancel {
            Some(tx) => {
                let sent = tx.send(()).is_ok();
                if sent {
                    self.logger.info("Charge cancellation requested");
                }
                sent
            }
            None => false,
        }
    }

    /// Add energy to the battery
    ///
    /// The level is not clamped; the charge cycle checks capacity before
    /// calling this. A car without an owner has nowhere to show its charge,
    /// so the attempt is rejected and the battery left untouched.
    pub fn charge(&self, energy_wh: u32) -> Result<ChargeReport> {
        let owner = self
            .owner()
            .ok_or_else(|| ChargeError::missing_owner(self.name.as_str()))?;

        let charged_wh = {
            let mut state = self.lock_state();
            state.charged_wh = state.charged_wh.saturating_add(energy_wh);
            state.charged_wh
        };

        Ok(ChargeReport {
            car: self.name.clone(),
            charged_wh,
            battery_capacity_wh: self.battery_capacity_wh,
            leds_to_light: leds_to_light(charged_wh, self.battery_capacity_wh),
            owner,
        })
    }

    async fn drive<T: TickSource>(
        self: Arc<Self>,
        mut cycle: ChargeCycle,
        mut ticks: T,
        mut on_every_charge: Option<ProgressCallback>,
        mut cancel_rx: oneshot::Receiver<()>,
        mut release: ReleaseOnDrop,
    ) -> CycleOutcome {
        let logger = self.cycle_logger(&cycle);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = &mut cancel_rx => break CycleOutcome::Cancelled,
                more = ticks.next_tick() => {
                    if !more {
                        logger.warn("Tick source closed");
                        break CycleOutcome::Cancelled;
                    }
                }
            }

            logger.trace("Running charging tick");
            if let Some(outcome) = self.step(&mut cycle, on_every_charge.as_mut(), &logger) {
                break outcome;
            }
        };

        let outcome = self.settle(outcome);
        self.finish_cycle(&mut cycle, outcome, &logger);
        release.outcome = Some(outcome);
        outcome
    }

    /// Retire the cancel handle; a cancel that was already taken wins
    fn settle(&self, outcome: CycleOutcome) -> CycleOutcome {
        let pending = self.lock_state().cancel.take();
        if pending.is_none() {
            CycleOutcome::Cancelled
        } else {
            outcome
        }
    }

    /// One tick of the cycle; returns the outcome once the cycle is over
    fn step(
        &self,
        cycle: &mut ChargeCycle,
        on_every_charge: Option<&mut ProgressCallback>,
        logger: &StructuredLogger,
    ) -> Option<CycleOutcome> {
        let increment_wh = match cycle.tick(self.charged_capacity_wh(), self.battery_capacity_wh) {
            TickDecision::Finish(outcome) => return Some(outcome),
            TickDecision::Apply { increment_wh } => increment_wh,
        };

        let report = match self.charge(increment_wh) {
            Ok(report) => report,
            Err(e) => {
                logger.error(&format!("Charge rejected: {e}"));
                return Some(CycleOutcome::Failed);
            }
        };
        let seconds_passed = cycle.seconds_passed();
        cycle.record_delivery(increment_wh);
        logger.debug(&format!(
            "Added {increment_wh} Wh, total charged: {} Wh",
            report.charged_wh
        ));

        feedback::render(&report);

        if let Some(callback) = on_every_charge {
            callback(&ChargeProgress {
                charged_wh: report.charged_wh,
                energy_delivered_wh: cycle.energy_delivered_wh(),
                seconds_passed,
                leds_to_light: report.leds_to_light,
                range_km: self.range_for(report.charged_wh),
            });
        }
        None
    }

    fn finish_cycle(&self, cycle: &mut ChargeCycle, outcome: CycleOutcome, logger: &StructuredLogger) {
        cycle.finish(outcome);
        let elapsed = Utc::now().signed_duration_since(cycle.started_at());
        logger.info(&format!(
            "Charging {outcome} after {} ticks ({} ms), delivered {} of {} Wh",
            cycle.seconds_passed(),
            elapsed.num_milliseconds(),
            cycle.energy_delivered_wh(),
            cycle.package_wh()
        ));
    }

    /// Unblock the car and record how its cycle ended
    fn release(&self, outcome: CycleOutcome) {
        let mut state = self.lock_state();
        state.blocked = false;
        state.cancel = None;
        state.last_outcome = Some(outcome);
        self.blocked_tx.send_replace(false);
    }

    fn cycle_logger(&self, cycle: &ChargeCycle) -> StructuredLogger {
        get_logger_with_context(
            LogContext::new("car")
                .with_car(&self.name)
                .with_cycle_id(cycle.id().to_string()),
        )
    }

    fn lock_state(&self) -> MutexGuard<'_, BatteryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the car when its cycle driver goes away
///
/// A driver that returns normally sets `outcome`. One that unwinds from a
/// panicking callback or strip ends as `Failed`; one dropped by a shutting
/// down runtime ends as `Cancelled`.
struct ReleaseOnDrop {
    car: Arc<Car>,
    outcome: Option<CycleOutcome>,
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        let outcome = self.outcome.unwrap_or_else(|| {
            let outcome = if std::thread::panicking() {
                CycleOutcome::Failed
            } else {
                CycleOutcome::Cancelled
            };
            self.car
                .logger
                .error(&format!("Charge driver stopped early, cycle {outcome}"));
            outcome
        });
        self.car.release(outcome);
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Car{{chipId={}, name='{}', batteryCapacityWh={}, chargedCapacityWh={}, energyEfficiencyKmWh={}}}",
            self.registration,
            self.name,
            self.battery_capacity_wh,
            self.charged_capacity_wh(),
            self.energy_efficiency_km_wh
        )
    }
}

impl fmt::Debug for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Car")
            .field("registration", &self.registration)
            .field("name", &self.name)
            .field("battery_capacity_wh", &self.battery_capacity_wh)
            .field("charged_capacity_wh", &self.charged_capacity_wh())
            .field("blocked", &self.is_blocked())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::RecordingStrip;
    use rgb::RGB8;

    fn car(capacity_wh: u32, max_range_km: u32) -> Car {
        Car::new("AB12:CD34", "renault_zoe", capacity_wh, max_range_km, ChargingConfig::default())
    }

    fn player(strip: Arc<RecordingStrip>) -> Arc<Player> {
        Arc::new(Player::new("winter", RGB8::new(0, 0, 255), strip))
    }

    #[test]
    fn test_chip_ids_split_on_colon() {
        assert_eq!(car(1000, 10).chip_ids(), vec!["AB12", "CD34"]);

        let single = Car::new("AB12", "zoe", 1000, 10, ChargingConfig::default());
        assert_eq!(single.chip_ids(), vec!["AB12"]);
    }

    #[test]
    fn test_efficiency_and_range() {
        let car = car(50_000, 400).with_charged_capacity(6000);
        assert!((car.energy_efficiency_km_wh() - 0.008).abs() < 1e-6);
        assert_eq!(car.range_in_km(), 48);
        assert_eq!(car.charged_capacity_wh(), 6000);
    }

    #[test]
    fn test_with_charged_capacity_is_capped() {
        let car = car(1000, 10).with_charged_capacity(5000);
        assert_eq!(car.charged_capacity_wh(), 1000);
    }

    #[test]
    fn test_zero_capacity_has_no_range() {
        let car = car(0, 100);
        assert_eq!(car.energy_efficiency_km_wh(), 0.0);
        assert_eq!(car.range_in_km(), 0);
    }

    #[test]
    fn test_charge_without_owner_is_rejected() {
        let car = car(1000, 10);
        let err = car.charge(100).unwrap_err();
        assert!(matches!(err, ChargeError::MissingOwner { .. }));
        assert_eq!(car.charged_capacity_wh(), 0);
    }

    #[test]
    fn test_charge_reports_leds_without_touching_hardware() {
        let strip = Arc::new(RecordingStrip::new());
        let owner = player(strip.clone());
        let car = car(1000, 10);
        car.set_owner(&owner);

        let report = car.charge(500).unwrap();
        assert_eq!(report.charged_wh, 500);
        assert_eq!(report.leds_to_light, 3);
        assert_eq!(car.charged_capacity_wh(), 500);
        assert!(strip.frames().is_empty());
    }

    #[test]
    fn test_owner_is_weak() {
        let car = car(1000, 10);
        let owner = player(Arc::new(RecordingStrip::new()));
        car.set_owner(&owner);
        assert_eq!(car.owner().map(|p| p.name().to_string()), Some("winter".to_string()));

        drop(owner);
        assert!(car.owner().is_none());
    }

    #[test]
    fn test_claim_outside_runtime_is_refused() {
        let car = Arc::new(car(1000, 10));
        assert!(!car.claim_package(EnergyPackage::new(100), None));
        assert!(!car.is_blocked());
    }

    #[test]
    fn test_snapshot_and_display() {
        let car = car(50_000, 400).with_charged_capacity(1000);
        let snapshot = car.snapshot();
        assert_eq!(snapshot.name, "renault_zoe");
        assert_eq!(snapshot.chip_ids, vec!["AB12", "CD34"]);
        assert_eq!(snapshot.charged_capacity_wh, 1000);
        assert_eq!(snapshot.range_km, 8);
        assert!(!snapshot.blocked);
        assert_eq!(snapshot.state, CycleState::Idle);
        assert!(snapshot.owner.is_none());

        let text = car.to_string();
        assert!(text.contains("chipId=AB12:CD34"));
        assert!(text.contains("chargedCapacityWh=1000"));
    }

    #[test]
    fn test_cancel_without_cycle() {
        assert!(!car(1000, 10).cancel_charge());
    }
}
