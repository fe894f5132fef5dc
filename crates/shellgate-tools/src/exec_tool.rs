//! Device command execution tools.
//!
//! Two entry points share one transport:
//!
//! - `device_exec` runs read-only commands. Destructive commands and
//!   anything classified as write intent are refused.
//! - `device_exec_write` runs mutating commands, but only after the caller
//!   declares every remote path the command will touch and all of them lie
//!   within the allowed write roots.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shellgate_core::tools::registry::{Tool, ToolError, ToolMetadata};
use shellgate_types::config::ExecConfig;
use tracing::debug;

use crate::args::{optional_u64, required_nonempty, required_str_array};
use crate::policy::{GatewayPolicy, policy_error};
use crate::transport::{ExecOutput, RemoteTransport};

fn output_json(output: &ExecOutput) -> serde_json::Value {
    json!({
        "exit_code": output.exit_code,
        "stdout": output.stdout,
        "stderr": output.stderr,
        "duration_ms": output.duration_ms,
        "truncated": output.truncated,
    })
}

// ---------------------------------------------------------------------------
// DeviceExecTool
// ---------------------------------------------------------------------------

/// Run a read-only shell command on the device.
pub struct DeviceExecTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl DeviceExecTool {
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
impl Tool for DeviceExecTool {
    fn name(&self) -> &str {
        "device_exec"
    }

    fn description(&self) -> &str {
        "Run a read-only shell command on the device. Commands that modify files or \
         packages are rejected; use device_exec_write for those."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to run on the device"
                },
                "timeout": {
                    "type": "number",
                    "description": format!(
                        "Timeout in seconds (default {}, max {})",
                        self.exec.timeout, self.exec.max_timeout
                    )
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let command = required_nonempty(&args, "command")?;
        let timeout = self.exec.effective_timeout(optional_u64(&args, "timeout"));

        self.policy
            .check_read_command(command)
            .map_err(|e| policy_error(self.name(), e))?;

        debug!(command, timeout, "executing read-only device command");
        let output = self.transport.exec(command, timeout).await?;
        Ok(output_json(&output))
    }
}

// ---------------------------------------------------------------------------
// DeviceExecWriteTool
// ---------------------------------------------------------------------------

/// Run a mutating shell command on the device against declared paths.
pub struct DeviceExecWriteTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl DeviceExecWriteTool {
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
impl Tool for DeviceExecWriteTool {
    fn name(&self) -> &str {
        "device_exec_write"
    }

    fn description(&self) -> &str {
        "Run a shell command that modifies the device. Every remote path the command \
         writes must be listed in `paths` and lie within the allowed write roots. The \
         declaration is checked, not enforced: it is not a sandbox."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to run on the device"
                },
                "paths": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Absolute remote paths the command will create, modify or delete"
                },
                "timeout": {
                    "type": "number",
                    "description": "Timeout in seconds"
                }
            },
            "required": ["command", "paths"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let command = required_nonempty(&args, "command")?;
        let paths = required_str_array(&args, "paths")?;
        let timeout = self.exec.effective_timeout(optional_u64(&args, "timeout"));

        let declared = self
            .policy
            .check_write_command(command, &paths)
            .map_err(|e| policy_error(self.name(), e))?;

        debug!(command, ?declared, timeout, "executing device write command");
        let output = self.transport.exec(command, timeout).await?;

        let mut result = output_json(&output);
        result["declared_paths"] = json!(declared);
        Ok(result)
    }

    fn metadata(&self) -> Option<ToolMetadata> {
        Some(ToolMetadata {
            mutates_device: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
