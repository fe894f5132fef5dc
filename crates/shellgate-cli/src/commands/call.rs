//! `sgate call` -- run one device tool.
//!
//! Arguments are passed as a JSON object and the tool's JSON result is
//! printed to stdout. Any tool error, including a gateway denial, becomes
//! a non-zero exit.

use clap::Args;
use tracing::info;

use shellgate_types::config::Config;

/// Arguments for the `sgate call` subcommand.
#[derive(Args)]
pub struct CallArgs {
    /// Tool name (see `sgate tools list`).
    pub tool: String,

    /// Tool arguments as a JSON object.
    #[arg(short, long, default_value = "{}")]
    pub args: String,

    /// Refuse tools that modify the device.
    #[arg(long)]
    pub read_only: bool,
}

/// Run the call subcommand.
pub async fn run(args: CallArgs, config: &Config) -> anyhow::Result<()> {
    let tool_args = parse_args(&args.args)?;
    let registry = super::build_registry(config, args.read_only)?;

    info!(tool = %args.tool, device = %config.device.destination(), "calling tool");
    let result = registry
        .execute(&args.tool, tool_args)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {e}", args.tool))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn parse_args(raw: &str) -> anyhow::Result<serde_json::Value> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("--args is not valid JSON: {e}"))?;
    if !value.is_object() {
        anyhow::bail!("--args must be a JSON object");
    }
    Ok(value)
}
