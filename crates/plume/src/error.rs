//! Error types for the plume crate.
//!
//! Malformed templates and resource-limit hits never produce errors; they
//! degrade and report through [`selflog`](crate::selflog). The errors here
//! cover caller mistakes and opt-in capture failures.

use thiserror::Error;

/// Invalid configuration, detected when a component is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric limit is below its minimum.
    #[error("{field} must be at least {min}, got {actual}")]
    OutOfRange {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    /// A theme entry names a style string that could not be interpreted.
    #[error("invalid style for '{style}': {reason}")]
    InvalidStyle { style: String, reason: String },

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// A property accessor failed while destructuring and the converter was
/// configured to propagate such failures.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("property accessor for '{property}' on {type_name} failed: {message}")]
    Accessor {
        type_name: String,
        property: String,
        message: String,
    },

    #[error("property '{property}' on {type_name} cannot be read")]
    Unsupported { type_name: String, property: String },
}

/// Invalid use of the log event API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("property name must not be empty or whitespace")]
    InvalidPropertyName,
}

/// Any error raised by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("formatting failed")]
    Fmt(#[from] std::fmt::Error),
}

/// Result type for plume operations.
pub type Result<T> = std::result::Result<T, Error>;
