//! Case-insensitive fixed-string search over a device log.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shellgate_core::tools::registry::{Tool, ToolError};
use shellgate_security::shell_quote;
use shellgate_types::config::ExecConfig;
use tracing::debug;

use crate::args::{optional_u64, required_nonempty};
use crate::policy::{GatewayPolicy, policy_error};
use crate::transport::RemoteTransport;

pub const DEFAULT_SYSLOG_PATH: &str = "/var/log/syslog";
pub const DEFAULT_LINES: u64 = 200;
pub const MAX_LINES: u64 = 5000;

/// Search the device syslog (or another log file) for a literal string.
pub struct SearchSyslogTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl SearchSyslogTool {
    pub fn new(
        transport: Arc<dyn RemoteTransport>,
        policy: Arc<GatewayPolicy>,
        exec: ExecConfig,
    ) -> Self {
        Self {
            transport,
            policy,
            exec,
        }
    }
}

#[async_trait]
impl Tool for SearchSyslogTool {
    fn name(&self) -> &str {
        "search_syslog"
    }

    fn description(&self) -> &str {
        "Search a device log for lines containing a literal string (case-insensitive) \
         and return the most recent matches."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "filter": {
                    "type": "string",
                    "description": "Literal text to search for"
                },
                "lines": {
                    "type": "integer",
                    "description": format!(
                        "Maximum matching lines to return (default {DEFAULT_LINES}, max {MAX_LINES})"
                    )
                },
                "path": {
                    "type": "string",
                    "description": format!("Log file to search (default {DEFAULT_SYSLOG_PATH})")
                }
            },
            "required": ["filter"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let filter = required_nonempty(&args, "filter")?;
        let lines = optional_u64(&args, "lines")
            .unwrap_or(DEFAULT_LINES)
            .clamp(1, MAX_LINES);
        let raw_path = args
            .get("path")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_SYSLOG_PATH);
        let path = self
            .policy
            .check_read_path(raw_path)
            .map_err(|e| policy_error(self.name(), e))?;

        let command = format!(
            "grep -i -F -- {} {} | tail -n {lines}",
            shell_quote(filter),
            shell_quote(&path)
        );

        debug!(path = %path, lines, "searching device log");
        let output = self.transport.exec(&command, self.exec.timeout).await?;

        // grep exits 1 when nothing matched; only >1 is a real failure.
        if output.exit_code > 1 {
            return Err(ToolError::ExecutionFailed(format!(
                "searching {path} failed (exit {}): {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }

        let matches: Vec<&str> = output.stdout.lines().collect();
        Ok(json!({
            "path": path,
            "match_count": matches.len(),
            "matches": matches,
            "truncated": output.truncated,
            "duration_ms": output.duration_ms,
        }))
    }
}
