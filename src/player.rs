//! Players and the hardware they own

use crate::feedback::ChargeFeedback;
use rgb::RGB8;
use std::fmt;
use std::sync::Arc;

/// A player seat with its button color and charge strip
pub struct Player {
    name: String,
    color: RGB8,
    strip: Arc<dyn ChargeFeedback>,
}

impl Player {
    pub fn new(name: &str, color: RGB8, strip: Arc<dyn ChargeFeedback>) -> Self {
        Self {
            name: name.to_string(),
            color,
            strip,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color channels of the player's button, reused for the strip
    pub const fn color(&self) -> RGB8 {
        self.color
    }

    pub fn strip(&self) -> &Arc<dyn ChargeFeedback> {
        &self.strip
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
