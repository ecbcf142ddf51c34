//! Error types and handling for Renewable Charge
//!
//! Only genuinely invalid states are errors here. A busy car, an exhausted
//! package or a full battery are ordinary transitions of the charge cycle and
//! are reported through return values instead.

use thiserror::Error;

/// Result type alias for Renewable Charge operations
pub type Result<T> = std::result::Result<T, ChargeError>;

/// Main error type for Renewable Charge
#[derive(Debug, Error)]
pub enum ChargeError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// A car was charged while nobody owns it, so there is no strip to drive
    #[error("Missing owner: car '{car}' has no owner to route charge feedback to")]
    MissingOwner { car: String },

    /// LED strip or other hardware feedback failed
    #[error("Feedback error: {message}")]
    Feedback { message: String },
}

impl ChargeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new missing-owner error for the named car
    pub fn missing_owner<S: Into<String>>(car: S) -> Self {
        Self::MissingOwner { car: car.into() }
    }

    /// Create a new hardware feedback error
    pub fn feedback<S: Into<String>>(message: S) -> Self {
        Self::Feedback {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ChargeError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ChargeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChargeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
