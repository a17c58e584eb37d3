//! Error types for the homework status poller.
//!
//! Every failure the poller can hit is a variant of [`PollerError`]. The
//! orchestrator decides what to do with an error by its class:
//! fatal errors stop the process, transport errors are logged and retried on
//! the next cycle, payload errors are reported to the chat, and notify errors
//! are logged and swallowed.

use std::path::PathBuf;

/// A specialized `Result` type for poller operations.
pub type Result<T> = std::result::Result<T, PollerError>;

/// Errors that can occur while polling, validating and notifying.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    // ========================================================================
    // Startup Errors (fatal)
    // ========================================================================
    /// One or more required credentials are absent or empty.
    #[error("Missing required environment variables: {}\n\nSuggestion: Set them in the environment or in a .env file", .missing.join(", "))]
    MissingCredentials {
        /// Names of the variables that are missing.
        missing: Vec<&'static str>,
    },

    /// Invalid JSON syntax in the settings file.
    #[error("Invalid JSON in settings file '{path}': {message}\n\nSuggestion: Validate your hwbot.json with a JSON linter")]
    ConfigParse {
        /// Path to the settings file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Settings validation failed.
    #[error("Invalid settings: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Transport Errors (retried next cycle)
    // ========================================================================
    /// The HTTP request failed or its body could not be decoded.
    #[error("Request to the homework API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The homework API answered with a status other than 200 OK.
    #[error("Unexpected response status {status} from {endpoint}")]
    UnexpectedStatus {
        /// HTTP status code returned.
        status: u16,
        /// Endpoint that was queried.
        endpoint: String,
    },

    // ========================================================================
    // Payload Errors (reported to the chat)
    // ========================================================================
    /// A field of the API response has the wrong JSON type.
    #[error("Field '{field}' has invalid type: expected {expected}, got {found}")]
    InvalidShape {
        /// Name of the offending field.
        field: String,
        /// Expected JSON type.
        expected: &'static str,
        /// JSON type actually received.
        found: &'static str,
    },

    /// A required key is absent from the API response.
    #[error("Key '{key}' not found in API response")]
    MissingField {
        /// Name of the missing key.
        key: String,
    },

    /// The homework carries a status that has no verdict.
    #[error("Unknown homework status: '{status}'")]
    UnknownStatus {
        /// The status value received.
        status: String,
    },

    // ========================================================================
    // Notification Errors (logged and swallowed)
    // ========================================================================
    /// Sending a chat message failed.
    #[error("Message not sent: {message}")]
    Notify {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PollerError {
    /// Creates a new `MissingCredentials` error.
    #[must_use]
    pub fn missing_credentials(missing: Vec<&'static str>) -> Self {
        Self::MissingCredentials { missing }
    }

    /// Creates a new `ConfigParse` error with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidation` error with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `UnexpectedStatus` error.
    #[must_use]
    pub fn unexpected_status(status: u16, endpoint: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            endpoint: endpoint.into(),
        }
    }

    /// Creates a new `InvalidShape` error.
    #[must_use]
    pub fn invalid_shape(
        field: impl Into<String>,
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::InvalidShape {
            field: field.into(),
            expected,
            found: json_type_name(found),
        }
    }

    /// Creates a new `MissingField` error.
    #[must_use]
    pub fn missing_field(key: impl Into<String>) -> Self {
        Self::MissingField { key: key.into() }
    }

    /// Creates a new `UnknownStatus` error.
    #[must_use]
    pub fn unknown_status(status: impl Into<String>) -> Self {
        Self::UnknownStatus {
            status: status.into(),
        }
    }

    /// Creates a new `Notify` error.
    #[must_use]
    pub fn notify(message: impl Into<String>) -> Self {
        Self::Notify {
            message: message.into(),
        }
    }

    /// Returns `true` if this error must terminate the process.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials { .. }
                | Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
        )
    }

    /// Returns `true` if this error came from the network layer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::UnexpectedStatus { .. })
    }

    /// Returns `true` if the API answered with data the poller cannot use.
    #[must_use]
    pub const fn is_payload(&self) -> bool {
        matches!(
            self,
            Self::InvalidShape { .. } | Self::MissingField { .. } | Self::UnknownStatus { .. }
        )
    }
}

/// Human-readable name of a JSON value's type.
const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
