//! Remote file tools: read, write, and list.
//!
//! These tools build their shell commands themselves. Every caller-supplied
//! string lands on the command line through [`shell_quote`], so the
//! denylist is not consulted: the only thing the caller controls is data.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shellgate_core::tools::registry::{Tool, ToolError, ToolMetadata};
use shellgate_security::shell_quote;
use shellgate_types::config::ExecConfig;
use tracing::debug;

use crate::args::{optional_bool, optional_u64, required_str};
use crate::policy::{GatewayPolicy, policy_error};
use crate::transport::RemoteTransport;

/// Parent directory of a normalized absolute remote path.
fn remote_parent(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((dir, _)) => dir,
    }
}

// ---------------------------------------------------------------------------
// ReadRemoteFileTool
// ---------------------------------------------------------------------------

/// Read a file on the device, optionally only its last lines.
pub struct ReadRemoteFileTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl ReadRemoteFileTool {
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
impl Tool for ReadRemoteFileTool {
    fn name(&self) -> &str {
        "read_remote_file"
    }

    fn description(&self) -> &str {
        "Read a text file from the device. Set tailLines to read only the end of the file."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the file on the device"
                },
                "tailLines": {
                    "type": "integer",
                    "description": "Return only the last N lines"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let raw = required_str(&args, "path")?;
        let path = self
            .policy
            .check_read_path(raw)
            .map_err(|e| policy_error(self.name(), e))?;

        let tail = optional_u64(&args, "tailLines").or_else(|| optional_u64(&args, "tail_lines"));
        let command = match tail {
            Some(n) if n > 0 => format!("tail -n {n} -- {}", shell_quote(&path)),
            _ => format!("cat -- {}", shell_quote(&path)),
        };

        debug!(path = %path, "reading remote file");
        let output = self.transport.exec(&command, self.exec.timeout).await?;

        if !output.success() {
            return Err(ToolError::ExecutionFailed(format!(
                "reading {path} failed (exit {}): {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }

        Ok(json!({
            "path": path,
            "content": output.stdout,
            "truncated": output.truncated,
            "duration_ms": output.duration_ms,
        }))
    }
}

// ---------------------------------------------------------------------------
// WriteRemoteFileTool
// ---------------------------------------------------------------------------

/// Write text content to a file on the device, within the write roots.
pub struct WriteRemoteFileTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl WriteRemoteFileTool {
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
impl Tool for WriteRemoteFileTool {
    fn name(&self) -> &str {
        "write_remote_file"
    }

    fn description(&self) -> &str {
        "Write text content to a file on the device, replacing it if it exists. \
         The path must lie within the allowed write roots."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the file on the device"
                },
                "content": {
                    "type": "string",
                    "description": "Text to write"
                },
                "createDirs": {
                    "type": "boolean",
                    "description": "Create missing parent directories (default true)"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let raw = required_str(&args, "path")?;
        let content = required_str(&args, "content")?;
        let create_dirs = optional_bool(&args, "createDirs", true);

        // A NUL byte cannot travel inside a shell argument.
        if content.contains('\0') {
            return Err(ToolError::InvalidArgs(
                "content must not contain NUL bytes".into(),
            ));
        }

        let written = self
            .policy
            .check_write_paths(&[raw])
            .map_err(|e| policy_error(self.name(), e))?;
        let path = &written[0];

        let write = format!(
            "printf '%s' {} > {}",
            shell_quote(content),
            shell_quote(path)
        );
        let command = if create_dirs {
            format!("mkdir -p -- {} && {write}", shell_quote(remote_parent(path)))
        } else {
            write
        };

        debug!(path = %path, bytes = content.len(), "writing remote file");
        let output = self.transport.exec(&command, self.exec.timeout).await?;

        if !output.success() {
            return Err(ToolError::ExecutionFailed(format!(
                "writing {path} failed (exit {}): {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }

        Ok(json!({
            "written_paths": written,
            "bytes_written": content.len(),
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
// ListRemoteDirTool
// ---------------------------------------------------------------------------

/// Long-format listing of a directory on the device.
pub struct ListRemoteDirTool {
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
}

impl ListRemoteDirTool {
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
impl Tool for ListRemoteDirTool {
    fn name(&self) -> &str {
        "list_remote_dir"
    }

    fn description(&self) -> &str {
        "List the contents of a directory on the device (ls -la)."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute path of the directory on the device"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let raw = required_str(&args, "path")?;
        let path = self
            .policy
            .check_read_path(raw)
            .map_err(|e| policy_error(self.name(), e))?;

        let command = format!("ls -la -- {}", shell_quote(&path));
        let output = self.transport.exec(&command, self.exec.timeout).await?;

        Ok(json!({
            "path": path,
            "exit_code": output.exit_code,
            "stdout": output.stdout,
            "stderr": output.stderr,
            "duration_ms": output.duration_ms,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockTransport, test_exec, test_policy};
    use std::path::Path;

    fn policy() -> Arc<GatewayPolicy> {
        test_policy(Path::new("/out"))
    }

    #[test]
    fn parent_of_remote_paths() {
        assert_eq!(remote_parent("/var/mobile/a.txt"), "/var/mobile");
        assert_eq!(remote_parent("/a.txt"), "/");
        assert_eq!(remote_parent("/"), "/");
    }

    // -- read_remote_file ------------------------------------------------------

    #[tokio::test]
    async fn read_uses_cat_with_quoted_path() {
        let transport = MockTransport::ok("hello");
        let tool = ReadRemoteFileTool::new(transport.clone(), policy(), test_exec());

        let result = tool
            .execute(json!({"path": "/var/mobile/my notes.txt"}))
            .await
            .unwrap();

        assert_eq!(result["content"], "hello");
        assert_eq!(
            transport.last_command().as_deref(),
            Some("cat -- '/var/mobile/my notes.txt'")
        );
    }

    #[tokio::test]
    async fn read_tail_lines() {
        let transport = MockTransport::ok("");
        let tool = ReadRemoteFileTool::new(transport.clone(), policy(), test_exec());
        tool.execute(json!({"path": "/var/log/../log/syslog", "tailLines": 50}))
            .await
            .unwrap();
        assert_eq!(
            transport.last_command().as_deref(),
            Some("tail -n 50 -- '/var/log/syslog'")
        );
    }

    #[tokio::test]
    async fn read_path_with_quote_is_escaped() {
        let transport = MockTransport::ok("");
        let tool = ReadRemoteFileTool::new(transport.clone(), policy(), test_exec());
        tool.execute(json!({"path": "/tmp/it's; rm -rf ~"}))
            .await
            .unwrap();
        assert_eq!(
            transport.last_command().as_deref(),
            Some(r"cat -- '/tmp/it'\''s; rm -rf ~'")
        );
    }

    #[tokio::test]
    async fn read_relative_path_rejected() {
        let transport = MockTransport::ok("");
        let tool = ReadRemoteFileTool::new(transport.clone(), policy(), test_exec());
        let err = tool
            .execute(json!({"path": "etc/passwd"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidPath(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn read_failure_reports_stderr() {
        let transport = MockTransport::failing(1, "cat: /tmp/x: No such file or directory\n");
        let tool = ReadRemoteFileTool::new(transport, policy(), test_exec());
        let err = tool.execute(json!({"path": "/tmp/x"})).await.unwrap_err();
        match err {
            ToolError::ExecutionFailed(msg) => assert!(msg.contains("No such file")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    // -- write_remote_file -----------------------------------------------------

    #[tokio::test]
    async fn write_builds_mkdir_and_printf() {
        let transport = MockTransport::ok("");
        let tool = WriteRemoteFileTool::new(transport.clone(), policy(), test_exec());

        let result = tool
            .execute(json!({"path": "/var/mobile/cfg/app.conf", "content": "a='1'\n"}))
            .await
            .unwrap();

        assert_eq!(result["written_paths"], json!(["/var/mobile/cfg/app.conf"]));
        assert_eq!(result["bytes_written"], 6);
        assert_eq!(
            transport.last_command().as_deref(),
            Some(
                "mkdir -p -- '/var/mobile/cfg' && printf '%s' 'a='\\''1'\\''\n' > '/var/mobile/cfg/app.conf'"
            )
        );
    }

    #[tokio::test]
    async fn write_without_create_dirs() {
        let transport = MockTransport::ok("");
        let tool = WriteRemoteFileTool::new(transport.clone(), policy(), test_exec());
        tool.execute(json!({"path": "/tmp/a", "content": "x", "createDirs": false}))
            .await
            .unwrap();
        assert_eq!(
            transport.last_command().as_deref(),
            Some("printf '%s' 'x' > '/tmp/a'")
        );
    }

    #[tokio::test]
    async fn write_outside_roots_denied() {
        let transport = MockTransport::ok("");
        let tool = WriteRemoteFileTool::new(transport.clone(), policy(), test_exec());
        let err = tool
            .execute(json!({"path": "/var/mobile/../../etc/hosts", "content": "x"}))
            .await
            .unwrap_err();
        match err {
            ToolError::PermissionDenied { reason, .. } => assert!(reason.contains("/etc/hosts")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn write_rejects_nul() {
        let tool = WriteRemoteFileTool::new(MockTransport::ok(""), policy(), test_exec());
        let err = tool
            .execute(json!({"path": "/tmp/a", "content": "a\u{0}b"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(_)));
    }

    #[tokio::test]
    async fn write_nonzero_exit_is_failure() {
        let transport = MockTransport::failing(1, "Permission denied");
        let tool = WriteRemoteFileTool::new(transport, policy(), test_exec());
        let err = tool
            .execute(json!({"path": "/tmp/a", "content": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }

    #[test]
    fn write_tool_mutates() {
        let tool = WriteRemoteFileTool::new(MockTransport::ok(""), policy(), test_exec());
        assert!(tool.metadata().unwrap().mutates_device);
    }

    // -- list_remote_dir -------------------------------------------------------

    #[tokio::test]
    async fn list_quotes_path() {
        let transport = MockTransport::ok("total 0\n");
        let tool = ListRemoteDirTool::new(transport.clone(), policy(), test_exec());
        let result = tool
            .execute(json!({"path": "/var/mobile/Media/"}))
            .await
            .unwrap();
        assert_eq!(result["path"], "/var/mobile/Media");
        assert_eq!(
            transport.last_command().as_deref(),
            Some("ls -la -- '/var/mobile/Media'")
        );
    }
}
