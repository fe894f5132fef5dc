//! Gateway error type.

use thiserror::Error;

/// Errors returned when a requested operation fails gateway policy.
///
/// Every variant is a final verdict: none of them are transient and none
/// should be retried or downgraded to a warning by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// A remote path argument is not absolute.
    #[error("invalid remote path (must be absolute): {path}")]
    InvalidPath { path: String },

    /// One or more declared write paths lie outside every allowed root.
    #[error(
        "write path(s) outside allowed roots: blocked [{}]; allowed roots [{}]",
        blocked.join(", "),
        roots.join(", ")
    )]
    WritePathBlocked {
        roots: Vec<String>,
        blocked: Vec<String>,
    },

    /// A local artifact path lies outside every allowed local root.
    #[error(
        "local path outside allowed roots: {path}; allowed roots [{}]",
        roots.join(", ")
    )]
    LocalPathBlocked { roots: Vec<String>, path: String },

    /// The command matched a denial rule.
    #[error("command denied by policy: {reason}")]
    Denied { reason: String, pattern: String },

    /// A read-only request carried a command classified as mutating.
    #[error(
        "command appears to modify files or packages; resubmit it through the \
         write-capable tool with the paths it will touch: {command}"
    )]
    WriteIntentOnReadPath { command: String },
}
