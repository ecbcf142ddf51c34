//! # Renewable Charge - charging core of the RFID toy-car energy game
//!
//! Players put an RFID-tagged toy car on a reader, receive energy packages
//! and charge a simulated battery over real time while an LED strip shows
//! the progress. This crate holds the part with actual invariants: the
//! per-car charging state machine.
//!
//! ## Guarantees
//!
//! - At most one charge cycle runs per car; a blocked car refuses new claims
//! - Increments never push a battery above its capacity
//! - A cycle never delivers more than its package
//! - Degenerate timing and missing owners end a cycle instead of crashing it
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `energy`: Energy packages
//! - `cycle`: Pure charge cycle state machine
//! - `ticker`: Tick sources driving cycles
//! - `car`: Cars, their battery state and cycle driver
//! - `feedback`: LED mapping and the strip adapter
//! - `player`: Players and their hardware
//! - `garage`: Chip-to-car resolution and seat assignment

pub mod car;
pub mod config;
pub mod cycle;
pub mod energy;
pub mod error;
pub mod feedback;
pub mod garage;
pub mod logging;
pub mod player;
pub mod ticker;

// Re-export commonly used types
pub use car::{Car, ChargeProgress, ProgressCallback};
pub use config::{ChargingConfig, Config};
pub use cycle::{ChargeCycle, CycleOutcome, CycleState};
pub use energy::EnergyPackage;
pub use error::{ChargeError, Result};
pub use garage::Garage;
pub use player::Player;
