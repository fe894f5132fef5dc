//! File transfer tools: push to and pull from the device over scp.
//!
//! Upload targets are checked against the remote write roots. Download
//! destinations are checked against the local artifact roots, so a pull can
//! never overwrite files outside the directories the operator set aside.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shellgate_core::tools::registry::{Tool, ToolError, ToolMetadata};
use shellgate_security::normalize_local_path;
use shellgate_types::config::ExecConfig;
use tracing::{debug, info};

use crate::args::{optional_u64, required_nonempty};
use crate::policy::{GatewayPolicy, policy_error};
use crate::transport::{ExecOutput, RemoteTransport};

fn copy_failed(direction: &str, output: &ExecOutput) -> ToolError {
    ToolError::ExecutionFailed(format!(
        "{direction} failed (exit {}): {}",
        output.exit_code,
        output.stderr.trim()
    ))
}

/// Refuse remote paths that scp's escaping cannot represent.
fn reject_line_breaks(remote: &str) -> Result<(), ToolError> {
    if remote.contains(['\n', '\r']) {
        return Err(ToolError::InvalidPath(format!(
            "remote path contains a line break: {remote:?}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PushFileTool
// ---------------------------------------------------------------------------

/// Copy a local file onto the device.
pub struct PushFileTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl PushFileTool {
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
impl Tool for PushFileTool {
    fn name(&self) -> &str {
        "push_file"
    }

    fn description(&self) -> &str {
        "Upload a local file to the device. The remote path must lie within the \
         allowed write roots."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "localPath": {
                    "type": "string",
                    "description": "Path of the local file to upload"
                },
                "remotePath": {
                    "type": "string",
                    "description": "Absolute destination path on the device"
                },
                "timeout": {
                    "type": "number",
                    "description": "Timeout in seconds"
                }
            },
            "required": ["localPath", "remotePath"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let local_raw = required_nonempty(&args, "localPath")?;
        let remote_raw = required_nonempty(&args, "remotePath")?;
        let timeout = self.exec.effective_timeout(optional_u64(&args, "timeout"));
        reject_line_breaks(remote_raw)?;

        let remote = self
            .policy
            .check_write_paths(&[remote_raw])
            .map_err(|e| policy_error(self.name(), e))?
            .remove(0);

        let local = normalize_local_path(local_raw);
        let meta = tokio::fs::metadata(&local)
            .await
            .map_err(|_| ToolError::FileNotFound(local.display().to_string()))?;
        if !meta.is_file() {
            return Err(ToolError::InvalidArgs(format!(
                "not a regular file: {}",
                local.display()
            )));
        }

        debug!(local = %local.display(), remote = %remote, "uploading file");
        let output = self.transport.upload(&local, &remote, timeout).await?;
        if !output.success() {
            return Err(copy_failed("upload", &output));
        }

        info!(remote = %remote, bytes = meta.len(), "file pushed to device");
        Ok(json!({
            "local_path": local.display().to_string(),
            "remote_path": remote,
            "bytes": meta.len(),
            "duration_ms": output.duration_ms,
        }))
    }

    fn metadata(&self) -> Option<ToolMetadata> {
        Some(ToolMetadata {
            mutates_device: true,
        })
    }
}

// ---------------------------------------------------------------------------
// PullFileTool
// ---------------------------------------------------------------------------

/// Copy a file from the device into a local artifact root.
pub struct PullFileTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl PullFileTool {
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
impl Tool for PullFileTool {
    fn name(&self) -> &str {
        "pull_file"
    }

    fn description(&self) -> &str {
        "Download a file from the device. The local destination must lie within \
         the allowed local artifact roots."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "remotePath": {
                    "type": "string",
                    "description": "Absolute path of the file on the device"
                },
                "localPath": {
                    "type": "string",
                    "description": "Local destination path"
                },
                "timeout": {
                    "type": "number",
                    "description": "Timeout in seconds"
                }
            },
            "required": ["remotePath", "localPath"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let remote_raw = required_nonempty(&args, "remotePath")?;
        let local_raw = required_nonempty(&args, "localPath")?;
        let timeout = self.exec.effective_timeout(optional_u64(&args, "timeout"));
        reject_line_breaks(remote_raw)?;

        let remote = self
            .policy
            .check_read_path(remote_raw)
            .map_err(|e| policy_error(self.name(), e))?;
        let local: PathBuf = self
            .policy
            .check_local_path(local_raw)
            .map_err(|e| policy_error(self.name(), e))?;

        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ToolError::ExecutionFailed(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        debug!(remote = %remote, local = %local.display(), "downloading file");
        let output = self.transport.download(&remote, &local, timeout).await?;
        if !output.success() {
            return Err(copy_failed("download", &output));
        }

        Ok(json!({
            "remote_path": remote,
            "local_path": local.display().to_string(),
            "duration_ms": output.duration_ms,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
