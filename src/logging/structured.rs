use std::collections::BTreeMap;
use tracing::{debug, error, info, trace, warn};

/// Context information for log messages
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Component name (e.g., "car", "garage", "feedback")
    pub component: String,
    /// Car the event concerns
    pub car: Option<String>,
    /// Charge cycle the event belongs to
    pub cycle_id: Option<String>,
    /// Additional context fields
    pub extra_fields: BTreeMap<String, String>,
}

impl LogContext {
    /// Create a new log context
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            car: None,
            cycle_id: None,
            extra_fields: BTreeMap::new(),
        }
    }

    /// Set the car name
    pub fn with_car(mut self, car: &str) -> Self {
        self.car = Some(car.to_string());
        self
    }

    /// Set the charge cycle id
    pub fn with_cycle_id(mut self, cycle_id: String) -> Self {
        self.cycle_id = Some(cycle_id);
        self
    }

    /// Add extra field
    pub fn with_field(mut self, key: &str, value: String) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }
}

/// Structured logger with context
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    pub(crate) context: LogContext,
}

impl StructuredLogger {
    /// Create a new structured logger with context
    pub const fn new(context: LogContext) -> Self {
        Self { context }
    }

    /// Log an info message with context
    pub fn info(&self, message: &str) {
        let fields = self.format_fields();
        info!(%fields, "{}", message);
    }
    /// Log a warning message with context
    pub fn warn(&self, message: &str) {
        let fields = self.format_fields();
        warn!(%fields, "{}", message);
    }
    /// Log an error message with context
    pub fn error(&self, message: &str) {
        let fields = self.format_fields();
        error!(%fields, "{}", message);
    }
    /// Log a debug message with context
    pub fn debug(&self, message: &str) {
        let fields = self.format_fields();
        debug!(%fields, "{}", message);
    }
    /// Log a trace message with context
    pub fn trace(&self, message: &str) {
        let fields = self.format_fields();
        trace!(%fields, "{}", message);
    }

    /// Format context fields for logging
    fn format_fields(&self) -> String {
        let mut fields = vec![format!("component={}", self.context.component)];
        if let Some(ref car) = self.context.car {
            fields.push(format!("car={car}"));
        }
        if let Some(ref cycle_id) = self.context.cycle_id {
            fields.push(format!("cycle_id={cycle_id}"));
        }
        for (key, value) in &self.context.extra_fields {
            fields.push(format!("{key}={value}"));
        }
        fields.join(",")
    }
}

/// Create a logger for a specific component
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

/// Create a logger with full context
pub const fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context() {
        let context = LogContext::new("car")
            .with_car("renault_zoe")
            .with_cycle_id("cycle_123".to_string())
            .with_field("package_wh", "6000".to_string());

        assert_eq!(context.component, "car");
        assert_eq!(context.car.as_deref(), Some("renault_zoe"));
        assert_eq!(context.cycle_id.as_deref(), Some("cycle_123"));
        assert_eq!(
            context.extra_fields.get("package_wh"),
            Some(&"6000".to_string())
        );
    }

    #[test]
    fn test_format_fields_order() {
        let logger = get_logger_with_context(
            LogContext::new("car")
                .with_car("vw_id3")
                .with_field("b", "2".to_string())
                .with_field("a", "1".to_string()),
        );
        assert_eq!(logger.format_fields(), "component=car,car=vw_id3,a=1,b=2");
    }

    #[test]
    fn test_get_logger() {
        let logger = get_logger("garage");
        assert_eq!(logger.context.component, "garage");
        assert!(logger.context.car.is_none());
    }
}
