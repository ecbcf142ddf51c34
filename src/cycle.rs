//! The charge cycle state machine
//!
//! A [`ChargeCycle`] is created when a car accepts an energy package and lives
//! until one of its terminal conditions is reached. It holds no timer and no
//! reference to the car: every tick the driver passes in the current battery
//! level and gets back a [`TickDecision`]. This keeps the bookkeeping fully
//! deterministic and testable without wall-clock delays.

use crate::config::ChargingConfig;
use crate::energy::EnergyPackage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Why a charge cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleOutcome {
    /// The whole package was delivered
    Completed,
    /// The time budget ran out before the package was delivered
    Exhausted,
    /// The next increment would overflow the battery or the package allotment
    Overflowed,
    /// Aborted from outside, or the tick source went away
    Cancelled,
    /// Charging hit an invalid state, such as a car without an owner
    Failed,
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Completed => "completed",
            Self::Exhausted => "exhausted",
            Self::Overflowed => "overflowed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Charging state of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleState {
    /// Never charged
    Idle,
    /// A cycle is running; the car is blocked
    Charging,
    /// The last cycle ended
    Finished(CycleOutcome),
}

/// What the driver has to do for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Add `increment_wh` to the battery, then call [`ChargeCycle::record_delivery`]
    Apply { increment_wh: u32 },
    /// Stop the cycle
    Finish(CycleOutcome),
}

/// Counters and budgets of one accepted package
#[derive(Debug, Clone)]
pub struct ChargeCycle {
    id: Uuid,
    started_at: DateTime<Utc>,
    package_wh: u32,
    total_duration_s: u32,
    increment_wh: u32,
    seconds_passed: u32,
    energy_delivered_wh: u32,
    state: CycleState,
}

impl ChargeCycle {
    /// Derive duration and increment for a freshly accepted package
    ///
    /// Duration is `floor(time_blocked_per_charged_kwh * package_kwh)`. When it
    /// is not positive the cycle is degenerate: increment is zero and the first
    /// tick ends the cycle without delivering anything.
    pub fn start(package: &EnergyPackage, config: &ChargingConfig) -> Self {
        let duration =
            (f64::from(config.time_blocked_per_charged_kwh) * package.size_kwh()).floor();
        let total_duration_s = if duration.is_finite() && duration >= 1.0 {
            // Saturates for absurdly large configurations
            duration.min(f64::from(u32::MAX)) as u32
        } else {
            0
        };
        let increment_wh = package
            .size_wh()
            .checked_div(total_duration_s)
            .unwrap_or(0);

        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            package_wh: package.size_wh(),
            total_duration_s,
            increment_wh,
            seconds_passed: 0,
            energy_delivered_wh: 0,
            state: CycleState::Charging,
        }
    }

    /// Decide the next step given the car's current charge
    pub fn tick(&mut self, charged_wh: u32, battery_capacity_wh: u32) -> TickDecision {
        if let CycleState::Finished(outcome) = self.state {
            return TickDecision::Finish(outcome);
        }

        let delivered = u64::from(self.energy_delivered_wh);
        let increment = u64::from(self.increment_wh);
        let package = u64::from(self.package_wh);

        if delivered < package && self.seconds_passed < self.total_duration_s {
            let fits_battery = u64::from(charged_wh) + increment <= u64::from(battery_capacity_wh);
            let fits_package = delivered + increment <= package;
            if fits_battery && fits_package {
                return TickDecision::Apply {
                    increment_wh: self.increment_wh,
                };
            }
            return TickDecision::Finish(self.finish_with(CycleOutcome::Overflowed));
        }

        let outcome = if delivered >= package {
            CycleOutcome::Completed
        } else {
            CycleOutcome::Exhausted
        };
        TickDecision::Finish(self.finish_with(outcome))
    }

    /// Account for an increment that was applied to the battery
    pub fn record_delivery(&mut self, increment_wh: u32) {
        self.energy_delivered_wh = self.energy_delivered_wh.saturating_add(increment_wh);
        self.seconds_passed = self.seconds_passed.saturating_add(1);
    }

    /// End the cycle from outside the tick logic
    ///
    /// Returns false when the cycle had already finished; the first outcome
    /// is kept.
    pub fn finish(&mut self, outcome: CycleOutcome) -> bool {
        if self.is_finished() {
            return false;
        }
        self.state = CycleState::Finished(outcome);
        true
    }

    fn finish_with(&mut self, outcome: CycleOutcome) -> CycleOutcome {
        self.finish(outcome);
        match self.state {
            CycleState::Finished(kept) => kept,
            _ => outcome,
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub const fn package_wh(&self) -> u32 {
        self.package_wh
    }

    pub const fn total_duration_s(&self) -> u32 {
        self.total_duration_s
    }

    pub const fn increment_wh(&self) -> u32 {
        self.increment_wh
    }

    pub const fn seconds_passed(&self) -> u32 {
        self.seconds_passed
    }

    pub const fn energy_delivered_wh(&self) -> u32 {
        self.energy_delivered_wh
    }

    pub const fn state(&self) -> CycleState {
        self.state
    }

    /// Whether the duration computed at start was not positive
    pub const fn is_degenerate(&self) -> bool {
        self.total_duration_s == 0
    }

    pub const fn is_finished(&self) -> bool {
        matches!(self.state, CycleState::Finished(_))
    }
}
