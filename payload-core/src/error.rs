//! Error types for payload construction

use thiserror::Error;

/// Structural errors: malformed inputs or configuration.
///
/// These are fatal for the record at hand and are returned to the caller.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Input record was not a JSON object
    #[error(
        "Record is not an object: found {found_type}.\n\
         \n\
         Payload builders only accept flat key/value records, e.g. {{\"status\": \"temp\", \"value\": \"72.5\"}}"
    )]
    NotAnObject {
        /// Actual type found (e.g., "array", "string")
        found_type: String,
    },

    /// Configuration document was not a JSON/TOML table
    #[error("Configuration is not an object: found {found_type}")]
    ConfigNotAnObject {
        /// Actual type found
        found_type: String,
    },

    /// Configuration is well formed but semantically unusable
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Explanation of why the configuration was rejected
        reason: String,
    },

    /// Value transform name is not one of the built-in kinds
    #[error(
        "Unknown value transform '{name}'.\n\
         \n\
         Available transforms: float, integer, boolean, string, identity"
    )]
    UnknownTransform {
        /// Name that failed to resolve
        name: String,
    },

    /// TOML configuration could not be parsed
    #[error("TOML configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing or (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation failed while reading a record or config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reshape failures.
///
/// Recovered locally by the builder: the payload falls back to the
/// pre-filtered snapshot and the error is kept in [`crate::ReshapeOutcome`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReshapeError {
    /// Field required by the strategy is absent from the record
    #[error("Field '{field}' not found in record")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// Metric name field holds a value that cannot become an object key
    #[error("Field '{field}' cannot name a metric: found {found_type}")]
    InvalidMetricName {
        /// Name of the metric field
        field: String,
        /// Actual type found
        found_type: String,
    },

    /// Value transform rejected the reading
    #[error("Transform '{transform}' failed on field '{field}': {source}")]
    Transform {
        /// Field holding the reading
        field: String,
        /// Name of the transform that failed
        transform: String,
        /// Underlying transform failure
        source: TransformError,
    },
}

/// Failures raised by a [`crate::ValueTransform`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// String could not be parsed as a number
    #[error("'{value}' is not numeric")]
    NotNumeric {
        /// Offending input text
        value: String,
    },

    /// Parsed number is NaN or infinite and has no JSON representation
    #[error("{value} is not a finite number")]
    NonFinite {
        /// Offending input text
        value: String,
    },

    /// String could not be interpreted as a boolean
    #[error("'{value}' is not a boolean")]
    NotBoolean {
        /// Offending input text
        value: String,
    },

    /// Value type is not accepted by the transform
    #[error("cannot convert {found_type}")]
    UnsupportedType {
        /// Actual type found
        found_type: String,
    },

    /// Failure reported by a caller-supplied transform
    #[error("{0}")]
    Custom(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PayloadError>;

/// Human-readable JSON type name used in error messages
pub(crate) fn type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
