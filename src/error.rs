//! Error types and handling for the kitewatch pipeline

use thiserror::Error;

use crate::models::Granularity;

/// Main error type for kitewatch
#[derive(Error, Debug)]
pub enum KitewatchError {
    /// A forecast record lacks a field one of the gating rules needs
    #[error("Incomplete {granularity} record: {field}")]
    IncompleteData {
        field: String,
        granularity: Granularity,
    },

    /// Forecast or geocoding service could not be used
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Failure while building or sending the report
    #[error("Notification error: {message}")]
    Notification { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl KitewatchError {
    /// Create a new incomplete-data error for one record
    pub fn incomplete<S: Into<String>>(field: S, granularity: Granularity) -> Self {
        Self::IncompleteData {
            field: field.into(),
            granularity,
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new notification error
    pub fn notification<S: Into<String>>(message: S) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            KitewatchError::IncompleteData { field, .. } => {
                format!("Forecast record skipped, missing {field}")
            }
            KitewatchError::UpstreamUnavailable { .. } => {
                "Unable to reach the weather service. Please check your internet connection and API key."
                    .to_string()
            }
            KitewatchError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and environment.")
            }
            KitewatchError::Notification { .. } => {
                "Sending the report failed. Please check the SMTP settings.".to_string()
            }
            KitewatchError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = KitewatchError::incomplete("pop", Granularity::Hourly);
        assert!(matches!(err, KitewatchError::IncompleteData { .. }));
        assert_eq!(err.to_string(), "Incomplete hourly record: pop");

        let err = KitewatchError::upstream("connection refused");
        assert!(matches!(err, KitewatchError::UpstreamUnavailable { .. }));

        let err = KitewatchError::config("missing API key");
        assert!(matches!(err, KitewatchError::Config { .. }));
    }

    #[test]
    fn test_user_messages() {
        let err = KitewatchError::upstream("test");
        assert!(err.user_message().contains("Unable to reach"));

        let err = KitewatchError::config("smtp_port out of range");
        assert!(err.user_message().contains("smtp_port out of range"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KitewatchError = io_err.into();
        assert!(matches!(err, KitewatchError::Io { .. }));
    }
}
