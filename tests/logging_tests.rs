use renewable_charge::config::LoggingConfig;
use renewable_charge::logging::{LogContext, get_logger_with_context, init_logging, parse_log_level};
use tracing::Level;

#[test]
fn parse_levels_case_insensitive() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("Warn").unwrap(), Level::WARN);
    assert!(parse_log_level("loud").is_err());
}

#[test]
fn file_logging_initializes_in_log_dir() {
    let log_dir = tempfile::tempdir().unwrap();
    let config = LoggingConfig {
        level: "DEBUG".to_string(),
        file: log_dir
            .path()
            .join("renewable-charge.log")
            .to_string_lossy()
            .to_string(),
        console_output: false,
        ..LoggingConfig::default()
    };
    assert!(init_logging(&config).is_ok());
    // Later calls report the first outcome
    assert!(init_logging(&config).is_ok());

    let logger = get_logger_with_context(LogContext::new("test").with_car("kart"));
    logger.info("logging from an integration test");
}
