//! Error types for the Reshaper core library
//!
//! This module defines the error handling system for Reshaper, using
//! thiserror for ergonomic error definitions and anyhow for flexible error
//! contexts raised by user supplied filters.

use thiserror::Error;

/// Main error type for Reshaper operations
#[derive(Error, Debug)]
pub enum Error {
    /// A rule references a filter name that is not registered
    #[error("Filter not found: {name}")]
    FilterNotFound {
        name: String,
    },

    /// A filter could not process its input
    #[error("Filter '{filter}' failed: {message}")]
    FilterExecution {
        filter: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed rule detected while the rule was being built
    #[error("Invalid rule: {message}")]
    InvalidRule {
        message: String,
        rule: Option<String>,
    },

    /// Rule set documents that cannot be turned into rules
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Errors raised by user supplied filters and callbacks
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a [`Error::FilterExecution`] without an underlying cause
    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Error::FilterExecution {
            filter: filter.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Build a [`Error::FilterExecution`] wrapping the error that caused it
    pub fn filter_caused_by<E>(filter: impl Into<String>, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::FilterExecution {
            filter: filter.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Name of the filter involved in this error, if any
    pub fn filter_name(&self) -> Option<&str> {
        match self {
            Error::FilterNotFound { name } => Some(name),
            Error::FilterExecution { filter, .. } => Some(filter),
            _ => None,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
