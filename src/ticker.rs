//! Tick sources driving charge cycles
//!
//! The driver awaits one tick before every step of a cycle. In the game the
//! ticks come from a Tokio interval; tests can inject their own source and
//! step the cycle by hand.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Source of charge ticks
#[async_trait::async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick. Returns false once the source is closed.
    async fn next_tick(&mut self) -> bool;
}

/// Periodic ticks, the first one firing immediately
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    /// Must be called from within a Tokio runtime
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period.max(Duration::from_millis(1)));
        // A late tick shifts the schedule instead of bursting to catch up
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait::async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Ticks pushed by hand through a channel
#[derive(Debug)]
pub struct ChannelTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ChannelTicks {
    /// Create the source and the sender that triggers its ticks
    ///
    /// Dropping the sender closes the source once queued ticks are consumed.
    pub fn new() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait::async_trait]
impl TickSource for ChannelTicks {
    async fn next_tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}
