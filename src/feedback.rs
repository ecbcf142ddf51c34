//! Charge feedback for the LED strips
//!
//! [`Car::charge`](crate::car::Car::charge) only updates the battery and
//! returns a [`ChargeReport`]. Pushing that report to the owner's strip is
//! done here by [`render`], so the charge cycle can run without hardware.

use crate::error::{ChargeError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::player::Player;
use rgb::RGB8;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Number of LEDs on every player's charge strip
pub const LED_COUNT: u8 = 6;

/// Number of LEDs to light for a battery charged to `charged_wh`
///
/// Any charge above zero lights at least one LED; a full battery lights all
/// of them.
pub fn leds_to_light(charged_wh: u32, battery_capacity_wh: u32) -> u8 {
    if battery_capacity_wh == 0 {
        return 0;
    }
    let ratio = f64::from(charged_wh) / f64::from(battery_capacity_wh);
    let leds = (ratio * f64::from(LED_COUNT)).ceil();
    if leds <= 0.0 {
        0
    } else if leds >= f64::from(LED_COUNT) {
        LED_COUNT
    } else {
        // Within 1..LED_COUNT here
        leds as u8
    }
}

/// Hardware that shows a car's charge level in its owner's color
///
/// # Implementations
/// - [`LoggingStrip`] traces every frame instead of driving hardware
/// - [`RecordingStrip`] keeps frames in memory and can simulate failures
pub trait ChargeFeedback: Send + Sync {
    /// Light `leds` LEDs of the strip in `color`, turning the rest off
    fn show_charge(&self, leds: u8, color: RGB8) -> Result<()>;
}

/// Outcome of applying energy to a car, ready to be rendered
#[derive(Debug, Clone)]
pub struct ChargeReport {
    /// Car that was charged
    pub car: String,
    /// Charge level after the increment
    pub charged_wh: u32,
    /// Battery capacity of the car
    pub battery_capacity_wh: u32,
    /// LEDs to light for the new level
    pub leds_to_light: u8,
    /// Owner whose strip shows the level
    pub owner: Arc<Player>,
}

/// Send a charge report to the owner's strip
///
/// Hardware failures are logged and swallowed: the battery level has already
/// been updated and the cycle keeps running. Returns whether the strip
/// accepted the frame.
pub fn render(report: &ChargeReport) -> bool {
    let logger = get_logger_with_context(LogContext::new("feedback").with_car(&report.car));
    match report
        .owner
        .strip()
        .show_charge(report.leds_to_light, report.owner.color())
    {
        Ok(()) => {
            logger.trace(&format!(
                "Charge LED: {}/{} lit for {} Wh",
                report.leds_to_light, LED_COUNT, report.charged_wh
            ));
            true
        }
        Err(e) => {
            logger.warn(&format!("Failed to update charge strip: {e}"));
            false
        }
    }
}

/// Strip stand-in that only writes each frame to the log
#[derive(Debug, Clone)]
pub struct LoggingStrip {
    logger: StructuredLogger,
}

impl LoggingStrip {
    pub fn new(player: &str) -> Self {
        Self {
            logger: get_logger_with_context(
                LogContext::new("strip").with_field("player", player.to_string()),
            ),
        }
    }
}

impl ChargeFeedback for LoggingStrip {
    fn show_charge(&self, leds: u8, color: RGB8) -> Result<()> {
        self.logger.info(&format!(
            "Sending {leds} LEDs in rgb({}, {}, {})",
            color.r, color.g, color.b
        ));
        Ok(())
    }
}

/// A single frame sent to a strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedFrame {
    pub leds: u8,
    pub color: RGB8,
}

/// In-memory strip used for dry runs and tests
#[derive(Debug, Default)]
pub struct RecordingStrip {
    frames: Mutex<Vec<LedFrame>>,
    failing: AtomicBool,
}

impl RecordingStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// A strip whose every write fails until told otherwise
    pub fn failing() -> Self {
        let strip = Self::default();
        strip.set_failing(true);
        strip
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Frames accepted so far, oldest first
    pub fn frames(&self) -> Vec<LedFrame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_frame(&self) -> Option<LedFrame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }
}

impl ChargeFeedback for RecordingStrip {
    fn show_charge(&self, leds: u8, color: RGB8) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChargeError::feedback("strip did not acknowledge frame"));
        }
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LedFrame { leds, color });
        Ok(())
    }
}
