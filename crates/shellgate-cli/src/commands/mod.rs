//! CLI command implementations for `sgate`.
//!
//! Each subcommand is implemented in its own module:
//!
//! - [`tools_cmd`] -- Tool listing and schema display.
//! - [`call`] -- Single tool execution against the device.
//! - [`check`] -- Gateway dry run.
//! - [`config_cmd`] -- Resolved configuration display.

pub mod call;
pub mod check;
pub mod config_cmd;
pub mod tools_cmd;

use std::path::Path;
use std::sync::Arc;

use shellgate_core::tools::registry::ToolRegistry;
use shellgate_tools::{GatewayPolicy, SshTransport, register_all};
use shellgate_types::config::{Config, ProcessEnvironment};

/// Load configuration from the given path override or via auto-discovery.
///
/// Discovery order: `--config`, `SHELLGATE_CONFIG`,
/// `~/.shellgate/config.json`, then built-in defaults. `SHELLGATE_*`
/// overrides are applied and the result is validated.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<Config> {
    let config = shellgate_types::config::load_config(
        &ProcessEnvironment,
        config_override.map(Path::new),
    )?;
    Ok(config)
}

/// Materialize the policy root sets from config.
pub fn build_policy(config: &Config) -> anyhow::Result<GatewayPolicy> {
    GatewayPolicy::from_config(&config.policy)
        .map_err(|e| anyhow::anyhow!("invalid policy configuration: {e}"))
}

/// Build the registry of device tools over an ssh transport.
pub fn build_registry(config: &Config, read_only: bool) -> anyhow::Result<ToolRegistry> {
    let policy = Arc::new(build_policy(config)?);
    let transport = Arc::new(SshTransport::new(config.device.clone(), &config.exec));

    let mut registry = if read_only {
        ToolRegistry::read_only()
    } else {
        ToolRegistry::new()
    };
    register_all(&mut registry, transport, policy, config.exec.clone());
    Ok(registry)
}
