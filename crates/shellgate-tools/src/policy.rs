//! Gateway policy sequencing for device tools.
//!
//! [`GatewayPolicy`] bundles the configured root sets and applies the
//! gateway checks in the order every tool relies on:
//!
//! 1. Denial rules. A match is fatal; no path allowlist overrides it.
//! 2. For the read-only entry point, write-intent commands are refused and
//!    the caller is pointed at the write-capable tool.
//! 3. For the write-capable entry point, the declared paths must all lie
//!    within the allowed write roots.
//!
//! Declared paths are a declared-intent contract: the gateway checks what
//! the caller says the command touches, not what it actually does.

use std::path::{Path, PathBuf};

use shellgate_core::tools::registry::ToolError;
use shellgate_security::{
    GatewayError, LocalRoots, RemoteRoots, ensure_allowed_local_path, ensure_allowed_write_paths,
    match_denied_pattern, match_write_signature, normalize_remote_path,
};
use shellgate_types::config::PolicyConfig;
use tracing::warn;

/// Configured allowed-root sets plus the gateway check sequence.
#[derive(Debug, Clone, Default)]
pub struct GatewayPolicy {
    write_roots: RemoteRoots,
    local_roots: LocalRoots,
}

impl GatewayPolicy {
    pub fn new(write_roots: RemoteRoots, local_roots: LocalRoots) -> Self {
        Self {
            write_roots,
            local_roots,
        }
    }

    /// Build the root sets from configuration.
    ///
    /// Fails if a remote write root is not absolute.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            write_roots: RemoteRoots::new(&config.allowed_write_roots)?,
            local_roots: LocalRoots::new(config.local_root_paths()),
        })
    }

    pub fn write_roots(&self) -> &RemoteRoots {
        &self.write_roots
    }

    pub fn local_roots(&self) -> &LocalRoots {
        &self.local_roots
    }

    /// Refuse `command` if any denial rule matches.
    pub fn check_denylist(&self, command: &str) -> Result<(), GatewayError> {
        match match_denied_pattern(command) {
            Some(rule) => {
                warn!(command, reason = rule.reason(), "command denied by policy");
                Err(GatewayError::Denied {
                    reason: rule.reason().to_string(),
                    pattern: rule.pattern().to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// Checks for the read-only exec entry point.
    pub fn check_read_command(&self, command: &str) -> Result<(), GatewayError> {
        self.check_denylist(command)?;
        if let Some(sig) = match_write_signature(command) {
            warn!(command, signature = sig.label(), "write intent on read-only path");
            return Err(GatewayError::WriteIntentOnReadPath {
                command: command.to_string(),
            });
        }
        Ok(())
    }

    /// Checks for the write-capable exec entry point.
    ///
    /// Returns the normalized declared paths on success.
    pub fn check_write_command<S: AsRef<str>>(
        &self,
        command: &str,
        declared_paths: &[S],
    ) -> Result<Vec<String>, GatewayError> {
        self.check_denylist(command)?;
        self.check_write_paths(declared_paths)
    }

    /// All-or-nothing write path check against the remote roots.
    pub fn check_write_paths<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<String>, GatewayError> {
        ensure_allowed_write_paths(paths, &self.write_roots)
    }

    /// Normalize a remote path that will only be read.
    pub fn check_read_path(&self, path: &str) -> Result<String, GatewayError> {
        normalize_remote_path(path)
    }

    /// Local artifact destination check.
    pub fn check_local_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, GatewayError> {
        ensure_allowed_local_path(path, &self.local_roots)
    }
}

/// Convert a gateway verdict into the tool-boundary error.
///
/// Malformed remote paths become [`ToolError::InvalidPath`]; every other
/// gateway error is a policy denial carrying the full message.
pub(crate) fn policy_error(tool: &str, err: GatewayError) -> ToolError {
    match err {
        GatewayError::InvalidPath { .. } => ToolError::InvalidPath(err.to_string()),
        other => ToolError::PermissionDenied {
            tool: tool.to_string(),
            reason: other.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
