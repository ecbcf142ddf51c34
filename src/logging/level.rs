use crate::error::{ChargeError, Result};
use tracing::Level;

/// Parse a case-insensitive level name into a tracing [`Level`]
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" => Ok(Level::ERROR),
        _ => Err(ChargeError::config(format!("Invalid log level: {level_str}"))),
    }
}

/// The more verbose of two levels
///
/// tracing orders levels by verbosity, `TRACE` being the greatest.
pub fn min_level(a: Level, b: Level) -> Level {
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("Warning").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("ERROR").unwrap(), Level::ERROR);
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_min_level_picks_more_verbose() {
        assert_eq!(min_level(Level::INFO, Level::DEBUG), Level::DEBUG);
        assert_eq!(min_level(Level::TRACE, Level::ERROR), Level::TRACE);
        assert_eq!(min_level(Level::WARN, Level::WARN), Level::WARN);
    }
}
