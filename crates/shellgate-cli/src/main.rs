//! `sgate` -- CLI binary for the shellgate device gateway.
//!
//! Provides the following subcommands:
//!
//! - `sgate tools` -- List device tools or show one tool's schema.
//! - `sgate call` -- Run one tool against the configured device.
//! - `sgate check` -- Dry-run a command through the gateway.
//! - `sgate config` -- Show the effective configuration.
//!
//! Logs go to stderr so stdout carries only JSON results.

use clap::{Parser, Subcommand};

mod commands;

/// shellgate device gateway CLI.
#[derive(Parser)]
#[command(name = "sgate", about = "shellgate device gateway CLI", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Inspect the registered device tools.
    Tools(commands::tools_cmd::ToolsArgs),

    /// Execute a single tool and print its JSON result.
    Call(commands::call::CallArgs),

    /// Check a command against the gateway without contacting the device.
    Check(commands::check::CheckArgs),

    /// Show resolved configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

/// Subcommands for `sgate config`.
#[derive(Subcommand)]
enum ConfigCmd {
    /// Show the full resolved configuration.
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Tools(args) => commands::tools_cmd::run(args, &config)?,
        Commands::Call(args) => commands::call::run(args, &config).await?,
        Commands::Check(args) => {
            let allowed = commands::check::run(args, &config)?;
            if !allowed {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => match action {
            ConfigCmd::Show => commands::config_cmd::config_show(&config)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check_with_paths() {
        let cli = Cli::try_parse_from([
            "sgate", "check", "touch /tmp/a", "--write", "--path", "/tmp/a", "--path", "/tmp/b",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert!(args.write);
                assert_eq!(args.paths, vec!["/tmp/a", "/tmp/b"]);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["sgate", "config", "show", "--config", "/x.json"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/x.json"));
    }
}
