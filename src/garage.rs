//! The set of cars and players in a game
//!
//! Resolves scanned RFID chips to cars and hands cars to players, the way the
//! car selection screen does when a player puts a car on their reader.

use crate::car::Car;
use crate::config::{Config, PlayerConfig};
use crate::error::{ChargeError, Result};
use crate::feedback::ChargeFeedback;
use crate::logging::{StructuredLogger, get_logger};
use crate::player::Player;
use rgb::RGB8;
use std::sync::Arc;

/// Cars and players built from the configuration
#[derive(Debug)]
pub struct Garage {
    cars: Vec<Arc<Car>>,
    players: Vec<Arc<Player>>,
    logger: StructuredLogger,
}

impl Garage {
    /// Build the garage, asking `strip_for` for each player's charge strip
    pub fn from_config<F>(config: &Config, mut strip_for: F) -> Result<Self>
    where
        F: FnMut(&PlayerConfig) -> Arc<dyn ChargeFeedback>,
    {
        config.validate()?;

        let cars = config
            .cars
            .iter()
            .map(|car| Arc::new(Car::from_config(car, config.charging)))
            .collect();
        let players = config
            .players
            .iter()
            .map(|p| {
                let [r, g, b] = p.color;
                Arc::new(Player::new(&p.name, RGB8::new(r, g, b), strip_for(p)))
            })
            .collect();

        let garage = Self {
            cars,
            players,
            logger: get_logger("garage"),
        };
        garage.logger.info(&format!(
            "Garage ready with {} cars and {} players",
            garage.cars.len(),
            garage.players.len()
        ));
        Ok(garage)
    }

    pub fn cars(&self) -> &[Arc<Car>] {
        &self.cars
    }

    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Arc<Player>> {
        self.players.iter().find(|p| p.name() == name)
    }

    /// Car registered under the scanned chip
    pub fn find_by_chip(&self, chip_id: &str) -> Option<&Arc<Car>> {
        self.cars
            .iter()
            .find(|car| car.chip_ids().iter().any(|id| id == chip_id))
    }

    /// Give the car behind `chip_id` to `player`
    pub fn assign(&self, player: &Arc<Player>, chip_id: &str) -> Result<Arc<Car>> {
        let car = self.find_by_chip(chip_id).ok_or_else(|| {
            ChargeError::validation("chip_id", format!("No car registered for chip {chip_id}"))
        })?;
        car.set_owner(player);
        self.logger
            .info(&format!("{} selected {}", player.name(), car.name()));
        Ok(Arc::clone(car))
    }

    /// Abort every running charge cycle; returns how many were running
    pub fn cancel_all(&self) -> usize {
        self.cars.iter().filter(|car| car.cancel_charge()).count()
    }
}
