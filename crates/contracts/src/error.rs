//! Layered error definitions
//!
//! Categorized by source: config / stream / detection / output

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// User override names a parameter the estimator does not know
    #[error("unknown parameter '{name}' (cannot set to {value})")]
    UnknownParameter { name: String, value: f32 },

    // ===== Stream Errors =====
    /// Log stream cannot be opened
    #[error("cannot open log '{path}': {source}")]
    LogOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Record decode error mid-stream
    #[error("record decode error at record {index}: {message}")]
    RecordDecode { index: u64, message: String },

    // ===== Detection Failures =====
    /// Update-rate detection failed
    #[error("rate detection failed: {message}")]
    RateDetection { message: String },

    // ===== Output Errors =====
    /// Table sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create rate-detection error
    pub fn rate_detection(message: impl Into<String>) -> Self {
        Self::RateDetection {
            message: message.into(),
        }
    }

    /// Create record decode error
    pub fn record_decode(index: u64, message: impl Into<String>) -> Self {
        Self::RecordDecode {
            index,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
