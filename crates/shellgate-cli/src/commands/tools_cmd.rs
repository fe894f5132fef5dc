//! `sgate tools` -- tool discovery.
//!
//! - `sgate tools list` -- table of registered tools.
//! - `sgate tools show <name>` -- description and parameter schema.
//! - `sgate tools schemas` -- every schema as one JSON array.

use clap::{Args, Subcommand};
use comfy_table::{Table, presets};

use shellgate_core::tools::registry::ToolRegistry;
use shellgate_types::config::Config;

/// Arguments for the `sgate tools` subcommand.
#[derive(Args)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub action: ToolsAction,
}

/// Subcommands for `sgate tools`.
#[derive(Subcommand)]
pub enum ToolsAction {
    /// List all registered tools.
    List,

    /// Show details and parameter schema for a specific tool.
    Show {
        /// Tool name to inspect.
        name: String,
    },

    /// Print all tool schemas as JSON.
    Schemas,
}

/// Run the tools subcommand.
pub fn run(args: ToolsArgs, config: &Config) -> anyhow::Result<()> {
    let registry = super::build_registry(config, false)?;
    match args.action {
        ToolsAction::List => tools_list(&registry),
        ToolsAction::Show { name } => tools_show(&name, &registry),
        ToolsAction::Schemas => {
            println!("{}", serde_json::to_string_pretty(&registry.schemas())?);
            Ok(())
        }
    }
}

fn access(registry: &ToolRegistry, name: &str) -> &'static str {
    if registry.get_metadata(name).is_some_and(|m| m.mutates_device) {
        "write"
    } else {
        "read"
    }
}

/// Truncate a string to `max_len` characters, appending "..." if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn tools_list(registry: &ToolRegistry) -> anyhow::Result<()> {
    let names = registry.list();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(["NAME", "ACCESS", "DESCRIPTION"]);

    for name in &names {
        let desc = registry
            .get(name)
            .map(|t| truncate(t.description(), 60))
            .unwrap_or_default();
        table.add_row([name.as_str(), access(registry, name), &desc]);
    }

    println!("{table}");
    println!();
    println!("Total: {} tool(s)", names.len());
    Ok(())
}

fn tools_show(name: &str, registry: &ToolRegistry) -> anyhow::Result<()> {
    let tool = registry.get(name).ok_or_else(|| {
        anyhow::anyhow!("tool not found: {name}\nUse 'sgate tools list' to see available tools.")
    })?;

    println!("Tool: {}", tool.name());
    println!("Access: {}", access(registry, name));
    println!("Description: {}", tool.description());
    println!();
    println!("Parameters:");
    println!("{}", serde_json::to_string_pretty(&tool.parameters())?);
    Ok(())
}
