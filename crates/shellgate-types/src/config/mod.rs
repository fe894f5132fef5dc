//! Configuration schema types.
//!
//! All structs accept both `snake_case` and `camelCase` field names in JSON
//! via `#[serde(alias)]`. Unknown fields are silently ignored.
//!
//! # Module Structure
//!
//! - [`policies`] -- Allowed remote write roots and local artifact roots
//! - [`loader`] -- Config file discovery and environment overrides

pub mod loader;
pub mod policies;

pub use loader::{Environment, ProcessEnvironment, discover_config_path, load_config};
pub use policies::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellgateError};

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for shellgate.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// How to reach the managed device.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Allowed-root sets for write and artifact paths.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Command execution limits.
    #[serde(default)]
    pub exec: ExecConfig,
}

impl Config {
    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.device.host.trim().is_empty() {
            return Err(invalid("device.host is empty"));
        }
        if self.device.port == 0 {
            return Err(invalid("device.port must be non-zero"));
        }
        if self.device.user.trim().is_empty() {
            return Err(invalid("device.user is empty"));
        }
        if let Some(root) = self
            .policy
            .allowed_write_roots
            .iter()
            .find(|r| !r.starts_with('/'))
        {
            return Err(invalid(&format!(
                "policy.allowedWriteRoots entry is not absolute: {root}"
            )));
        }
        if self.exec.timeout == 0 {
            return Err(invalid("exec.timeout must be non-zero"));
        }
        if self.exec.timeout > self.exec.max_timeout {
            return Err(invalid(&format!(
                "exec.timeout ({}) exceeds exec.maxTimeout ({})",
                self.exec.timeout, self.exec.max_timeout
            )));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ShellgateError {
    ShellgateError::ConfigInvalid {
        reason: reason.to_string(),
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

// ── Device ───────────────────────────────────────────────────────────────

/// SSH connection settings for the managed device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// Hostname or IP address.
    #[serde(default = "default_host")]
    pub host: String,

    /// SSH port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Remote login user.
    #[serde(default = "default_user")]
    pub user: String,

    /// Private key passed to `ssh -i` / `scp -i`. `~/` is expanded.
    #[serde(default, alias = "identityFile")]
    pub identity_file: Option<String>,

    /// Seconds allowed for the TCP/SSH handshake.
    #[serde(default = "default_connect_timeout", alias = "connectTimeout")]
    pub connect_timeout: u32,

    /// `ssh` executable.
    #[serde(default = "default_ssh_binary", alias = "sshBinary")]
    pub ssh_binary: String,

    /// `scp` executable.
    #[serde(default = "default_scp_binary", alias = "scpBinary")]
    pub scp_binary: String,
}

fn default_host() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    22
}

fn default_user() -> String {
    "mobile".into()
}

fn default_connect_timeout() -> u32 {
    10
}

fn default_ssh_binary() -> String {
    "ssh".into()
}

fn default_scp_binary() -> String {
    "scp".into()
}

impl DeviceConfig {
    /// `user@host` as passed to ssh and scp.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// `user@host` for an scp remote spec, with an IPv6 literal bracketed so
    /// its colons are not read as the path separator.
    pub fn scp_destination(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}@[{}]", self.user, self.host)
        } else {
            self.destination()
        }
    }

    /// Identity file with `~/` expanded.
    pub fn identity_path(&self) -> Option<PathBuf> {
        self.identity_file.as_deref().map(expand_home)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            identity_file: None,
            connect_timeout: default_connect_timeout(),
            ssh_binary: default_ssh_binary(),
            scp_binary: default_scp_binary(),
        }
    }
}

// ── Exec ─────────────────────────────────────────────────────────────────

/// Remote command execution limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecConfig {
    /// Default command timeout in seconds.
    #[serde(default = "default_exec_timeout")]
    pub timeout: u64,

    /// Upper bound for a caller-requested timeout.
    #[serde(default = "default_max_timeout", alias = "maxTimeout")]
    pub max_timeout: u64,

    /// stdout/stderr are truncated beyond this many bytes each.
    #[serde(default = "default_max_output_bytes", alias = "maxOutputBytes")]
    pub max_output_bytes: usize,
}

fn default_exec_timeout() -> u64 {
    30
}

fn default_max_timeout() -> u64 {
    300
}

fn default_max_output_bytes() -> usize {
    1024 * 1024
}

impl ExecConfig {
    /// Clamp a requested timeout into `1..=max_timeout`, using the default
    /// when none is given.
    pub fn effective_timeout(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.timeout)
            .clamp(1, self.max_timeout.max(1))
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout: default_exec_timeout(),
            max_timeout: default_max_timeout(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}
