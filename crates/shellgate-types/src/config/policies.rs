//! Path policy configuration types.
//!
//! Defines [`PolicyConfig`]: the two independent allowed-root sets. These
//! are plain strings here; the gateway normalizes them into typed root sets
//! once at startup.

use serde::{Deserialize, Serialize};

use super::expand_home;

/// Allowed-root configuration.
///
/// A root and everything beneath it are permitted destinations. Remote
/// roots are absolute POSIX paths on the device; local roots are host paths
/// where pulled files may be saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    /// Directories on the device that write operations may touch.
    #[serde(default = "default_write_roots", alias = "allowedWriteRoots")]
    pub allowed_write_roots: Vec<String>,

    /// Host directories that pulled artifacts may be written to.
    /// Relative entries resolve against the working directory.
    #[serde(default = "default_local_roots", alias = "allowedLocalRoots")]
    pub allowed_local_roots: Vec<String>,
}

fn default_write_roots() -> Vec<String> {
    vec!["/var/mobile".into(), "/var/tmp".into(), "/tmp".into()]
}

fn default_local_roots() -> Vec<String> {
    vec!["./artifacts".into()]
}

impl PolicyConfig {
    /// Local roots with `~/` expanded.
    pub fn local_root_paths(&self) -> Vec<std::path::PathBuf> {
        self.allowed_local_roots
            .iter()
            .map(|r| expand_home(r))
            .collect()
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_write_roots: default_write_roots(),
            allowed_local_roots: default_local_roots(),
        }
    }
}
