//! Configuration file discovery, loading and environment overrides.
//!
//! The discovery order is:
//! 1. An explicit path (the CLI `--config` flag).
//! 2. `SHELLGATE_CONFIG` environment variable.
//! 3. `~/.shellgate/config.json`
//! 4. If none found, built-in defaults.
//!
//! Environment overrides are applied on top of whatever was loaded:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SHELLGATE_HOST` | `device.host` |
//! | `SHELLGATE_PORT` | `device.port` |
//! | `SHELLGATE_USER` | `device.user` |
//! | `SHELLGATE_IDENTITY_FILE` | `device.identity_file` |
//! | `SHELLGATE_WRITE_ROOTS` | `policy.allowed_write_roots` (comma-separated) |
//! | `SHELLGATE_LOCAL_ROOTS` | `policy.allowed_local_roots` (comma-separated) |
//! | `SHELLGATE_TIMEOUT` | `exec.timeout` |

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::Config;
use crate::error::{Result, ShellgateError};

/// Read-only access to environment-style key/value configuration.
///
/// The process implementation reads OS environment variables; tests use an
/// in-memory map.
pub trait Environment: Send + Sync {
    /// Get the value of a variable, or `None` if it is not set.
    fn get_var(&self, name: &str) -> Option<String>;
}

/// [`Environment`] backed by [`std::env`].
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Locate the config file without reading it.
///
/// Returns `None` when neither `SHELLGATE_CONFIG` is set nor
/// `~/.shellgate/config.json` exists.
pub fn discover_config_path(env: &dyn Environment, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(env_path) = env.get_var("SHELLGATE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    let candidate = home_dir?.join(".shellgate").join("config.json");
    candidate.exists().then_some(candidate)
}

/// Load, override and validate the configuration.
///
/// An explicit path or `SHELLGATE_CONFIG` that does not exist is an error;
/// a missing default file falls back to built-in defaults.
pub fn load_config(env: &dyn Environment, explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config_path(env, dirs::home_dir()),
    };

    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ShellgateError::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!(path = %path.display(), "loading config file");
            let contents = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&contents)?;
            info!(path = %path.display(), "config loaded");
            config
        }
        None => {
            info!("no config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

/// Apply `SHELLGATE_*` variables to `config`.
pub fn apply_env_overrides(config: &mut Config, env: &dyn Environment) -> Result<()> {
    if let Some(host) = env.get_var("SHELLGATE_HOST") {
        config.device.host = host;
    }
    if let Some(port) = env.get_var("SHELLGATE_PORT") {
        config.device.port = parse_var("SHELLGATE_PORT", &port)?;
    }
    if let Some(user) = env.get_var("SHELLGATE_USER") {
        config.device.user = user;
    }
    if let Some(key) = env.get_var("SHELLGATE_IDENTITY_FILE") {
        config.device.identity_file = (!key.trim().is_empty()).then_some(key);
    }
    if let Some(roots) = env.get_var("SHELLGATE_WRITE_ROOTS") {
        config.policy.allowed_write_roots = split_list(&roots);
    }
    if let Some(roots) = env.get_var("SHELLGATE_LOCAL_ROOTS") {
        config.policy.allowed_local_roots = split_list(&roots);
    }
    if let Some(timeout) = env.get_var("SHELLGATE_TIMEOUT") {
        config.exec.timeout = parse_var("SHELLGATE_TIMEOUT", &timeout)?;
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ShellgateError::ConfigInvalid {
            reason: format!("{name} is not a valid number: {raw}"),
        })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
