//! Energy packages handed out to players

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete quantity of energy a player can allocate to a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnergyPackage {
    size_wh: u32,
}

impl EnergyPackage {
    /// Create a package offering `size_wh` watt-hours
    pub const fn new(size_wh: u32) -> Self {
        Self { size_wh }
    }

    /// Total energy offered, in watt-hours
    pub const fn size_wh(&self) -> u32 {
        self.size_wh
    }

    /// Total energy offered, in kilowatt-hours
    pub fn size_kwh(&self) -> f64 {
        f64::from(self.size_wh) / 1000.0
    }

    pub const fn is_empty(&self) -> bool {
        self.size_wh == 0
    }
}

impl fmt::Display for EnergyPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Wh", self.size_wh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_units() {
        let package = EnergyPackage::new(6000);
        assert_eq!(package.size_wh(), 6000);
        assert!((package.size_kwh() - 6.0).abs() < f64::EPSILON);
        assert!(!package.is_empty());
        assert_eq!(package.to_string(), "6000 Wh");
        assert!(EnergyPackage::new(0).is_empty());
    }
}
