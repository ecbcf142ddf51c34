//! Configuration management for Renewable Charge
//!
//! This module handles loading, validation, and management of the game
//! configuration from YAML files. The charging core never looks values up by
//! key; it receives a typed [`ChargingConfig`] at construction.

use crate::error::{ChargeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Charge cycle timing
    pub charging: ChargingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Cars known to the game, keyed by their RFID chips
    pub cars: Vec<CarConfig>,

    /// Players taking part in the game
    pub players: Vec<PlayerConfig>,
}

/// Charge cycle timing shared by every car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingConfig {
    /// Seconds a car stays blocked for every kWh in a claimed package
    pub time_blocked_per_charged_kwh: f32,

    /// Period between two charge ticks in milliseconds
    pub tick_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level; falls back to `level`
    pub console_level: Option<String>,

    /// Optional file-specific level; falls back to `level`
    pub file_level: Option<String>,

    /// Path to log file (its parent directory receives the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// A single car registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarConfig {
    /// One or more RFID chip serials joined by `:`
    pub chip_ids: String,

    /// Display name, also used as translation key by the screen
    pub name: String,

    /// Battery capacity in watt-hours
    pub battery_capacity_wh: u32,

    /// Range in kilometers on a full battery
    pub max_range_km: u32,
}

/// A single player seat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Display name of the seat
    pub name: String,

    /// Color of the player's button and charge strip
    pub color: [u8; 3],
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let default_paths = [
            "renewable_charge.yaml",
            "/data/renewable_charge.yaml",
            "/etc/renewable-charge/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.charging.validate()?;

        let mut seen_chips = HashSet::new();
        for (index, car) in self.cars.iter().enumerate() {
            if car.name.trim().is_empty() {
                return Err(ChargeError::validation(
                    format!("cars[{index}].name"),
                    "Name cannot be empty",
                ));
            }

            if car.battery_capacity_wh == 0 {
                return Err(ChargeError::validation(
                    format!("cars[{index}].battery_capacity_wh"),
                    "Must be greater than 0",
                ));
            }

            if car.chip_ids.split(':').any(str::is_empty) {
                return Err(ChargeError::validation(
                    format!("cars[{index}].chip_ids"),
                    "Chip registration contains an empty chip id",
                ));
            }

            for chip in car.chip_ids.split(':') {
                if !seen_chips.insert(chip) {
                    return Err(ChargeError::validation(
                        format!("cars[{index}].chip_ids"),
                        format!("Chip {chip} is registered more than once"),
                    ));
                }
            }
        }

        for (index, player) in self.players.iter().enumerate() {
            if player.name.trim().is_empty() {
                return Err(ChargeError::validation(
                    format!("players[{index}].name"),
                    "Name cannot be empty",
                ));
            }
        }

        Ok(())
    }
}

impl ChargingConfig {
    /// Validate the timing values
    ///
    /// A zero block time is accepted: it produces cycles that complete on
    /// their first tick without delivering energy.
    pub fn validate(&self) -> Result<()> {
        if !self.time_blocked_per_charged_kwh.is_finite() || self.time_blocked_per_charged_kwh < 0.0
        {
            return Err(ChargeError::validation(
                "charging.time_blocked_per_charged_kwh",
                "Must be a finite, non-negative number",
            ));
        }

        if self.tick_interval_ms == 0 {
            return Err(ChargeError::validation(
                "charging.tick_interval_ms",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Tick period as a [`std::time::Duration`]
    pub const fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!((config.charging.time_blocked_per_charged_kwh - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.charging.tick_interval_ms, 1000);
        assert_eq!(config.cars.len(), 4);
        assert_eq!(config.players.len(), 4);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.charging.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.charging.time_blocked_per_charged_kwh = f32::NAN;
        assert!(config.validate().is_err());

        config = Config::default();
        config.charging.time_blocked_per_charged_kwh = 0.0;
        assert!(config.validate().is_ok());

        config = Config::default();
        config.cars[0].battery_capacity_wh = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_chip_rejected() {
        let mut config = Config::default();
        config.cars[1].chip_ids = config.cars[0].chip_ids.clone();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ChargeError::Validation { .. }));
    }

    #[test]
    fn test_empty_chip_segment_rejected() {
        let mut config = Config::default();
        config.cars[0].chip_ids = "AA11::BB22".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.cars.len(), deserialized.cars.len());
        assert_eq!(config.charging, deserialized.charging);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "charging:\n  time_blocked_per_charged_kwh: 2.5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!((config.charging.time_blocked_per_charged_kwh - 2.5).abs() < f32::EPSILON);
        assert_eq!(config.charging.tick_interval_ms, 1000);
        assert_eq!(config.logging.level, "INFO");
    }
}
