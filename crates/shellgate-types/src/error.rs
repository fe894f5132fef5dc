//! Error types for shellgate.

use thiserror::Error;

/// Top-level error type for configuration and startup.
///
/// Policy denials are not represented here; they live in
/// `shellgate_security::GatewayError` and are surfaced per request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ShellgateError {
    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout shellgate-types.
pub type Result<T> = std::result::Result<T, ShellgateError>;
