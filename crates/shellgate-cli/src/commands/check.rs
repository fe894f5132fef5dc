//! `sgate check` -- dry-run a command through the gateway.
//!
//! Applies exactly the checks `device_exec` (or, with `--write`,
//! `device_exec_write`) would apply and prints the verdict as JSON. The
//! device is never contacted.

use clap::Args;
use serde::Serialize;

use shellgate_security::{GatewayError, match_write_signature};
use shellgate_tools::GatewayPolicy;
use shellgate_types::config::Config;

/// Arguments for the `sgate check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Command line to check.
    pub command: String,

    /// Check as a write-capable request.
    #[arg(long)]
    pub write: bool,

    /// Remote path the command writes (repeatable; requires --write).
    #[arg(long = "path", requires = "write")]
    pub paths: Vec<String>,
}

/// Outcome of a gateway dry run.
#[derive(Debug, Serialize)]
pub struct Verdict {
    pub command: String,
    pub mode: &'static str,
    pub allowed: bool,
    /// Which check refused the command, if any.
    pub denied_by: Option<&'static str>,
    pub reason: Option<String>,
    /// First write-intent signature the command matches.
    pub write_signature: Option<&'static str>,
    /// Normalized declared paths (write mode only).
    pub paths: Vec<String>,
}

/// Run the check subcommand. Returns whether the command is allowed.
pub fn run(args: CheckArgs, config: &Config) -> anyhow::Result<bool> {
    let policy = super::build_policy(config)?;
    let verdict = evaluate(&policy, &args.command, args.write, &args.paths);
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(verdict.allowed)
}

/// Evaluate `command` the way the matching exec tool would.
pub fn evaluate(policy: &GatewayPolicy, command: &str, write: bool, paths: &[String]) -> Verdict {
    let write_signature = match_write_signature(command).map(|s| s.label());

    let outcome = if write {
        if paths.is_empty() {
            Err(("arguments", "write requests must declare at least one --path".to_string()))
        } else {
            policy
                .check_write_command(command, paths)
                .map_err(|e| (denied_by(&e), e.to_string()))
        }
    } else {
        policy
            .check_read_command(command)
            .map(|()| Vec::new())
            .map_err(|e| (denied_by(&e), e.to_string()))
    };

    let (allowed, denied_by, reason, paths) = match outcome {
        Ok(paths) => (true, None, None, paths),
        Err((by, reason)) => (false, Some(by), Some(reason), Vec::new()),
    };

    Verdict {
        command: command.to_string(),
        mode: if write { "write" } else { "read" },
        allowed,
        denied_by,
        reason,
        write_signature,
        paths,
    }
}

fn denied_by(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::Denied { .. } => "denylist",
        GatewayError::WriteIntentOnReadPath { .. } => "write-intent",
        GatewayError::InvalidPath { .. } => "invalid-path",
        GatewayError::WritePathBlocked { .. } | GatewayError::LocalPathBlocked { .. } => {
            "path-allowlist"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> GatewayPolicy {
        super::super::build_policy(&Config::default()).unwrap()
    }

    #[test]
    fn plain_read_is_allowed() {
        let v = evaluate(&policy(), "cat /var/log/syslog", false, &[]);
        assert!(v.allowed);
        assert_eq!(v.mode, "read");
        assert!(v.denied_by.is_none());
    }

    #[test]
    fn destructive_command_hits_denylist() {
        let v = evaluate(&policy(), "rm -rf /", false, &[]);
        assert!(!v.allowed);
        assert_eq!(v.denied_by, Some("denylist"));
        assert_eq!(v.write_signature, Some("file-mutation"));
    }

    #[test]
    fn write_on_read_path() {
        let v = evaluate(&policy(), "touch /tmp/a", false, &[]);
        assert_eq!(v.denied_by, Some("write-intent"));
    }

    #[test]
    fn write_with_allowed_paths() {
        let v = evaluate(&policy(), "touch /tmp/a", true, &["/tmp/./a".to_string()]);
        assert!(v.allowed);
        assert_eq!(v.paths, vec!["/tmp/a"]);
    }

    #[test]
    fn write_outside_roots() {
        let v = evaluate(&policy(), "touch /etc/a", true, &["/etc/a".to_string()]);
        assert_eq!(v.denied_by, Some("path-allowlist"));
        assert!(v.reason.unwrap().contains("/etc/a"));
    }

    #[test]
    fn write_relative_path() {
        let v = evaluate(&policy(), "touch a", true, &["a".to_string()]);
        assert_eq!(v.denied_by, Some("invalid-path"));
    }

    #[test]
    fn write_without_paths() {
        let v = evaluate(&policy(), "touch /tmp/a", true, &[]);
        assert_eq!(v.denied_by, Some("arguments"));
    }
}
