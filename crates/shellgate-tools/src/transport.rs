//! Remote execution transport.
//!
//! [`RemoteTransport`] is the seam between device tools and the channel to
//! the device. [`SshTransport`] spawns the external `ssh` and `scp`
//! binaries; tests substitute a recording mock.
//!
//! The transport never retries and never negotiates authentication: ssh
//! runs in `BatchMode`, so a missing key fails fast instead of prompting.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use shellgate_core::tools::registry::ToolError;
use shellgate_security::escape_scp_remote_path;
use shellgate_types::config::{DeviceConfig, ExecConfig};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Result of one remote command or copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecOutput {
    /// Process exit code, or -1 if terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    /// Whether stdout or stderr was cut at the output limit.
    pub truncated: bool,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors raised by a transport before a result is available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport binary could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The operation did not finish within its timeout; the child was killed.
    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TransportError> for ToolError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(secs) => ToolError::Timeout(secs),
            other => ToolError::ExecutionFailed(other.to_string()),
        }
    }
}

/// A channel that can run commands on, and copy files to and from, the
/// managed device.
///
/// `command` is handed to the remote shell verbatim: callers must already
/// have passed it through the gateway and quoted every untrusted word.
/// Remote paths are normalized absolute paths; escaping them for the copy
/// protocol is the transport's job.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn exec(&self, command: &str, timeout_secs: u64) -> Result<ExecOutput, TransportError>;

    async fn upload(
        &self,
        local: &Path,
        remote: &str,
        timeout_secs: u64,
    ) -> Result<ExecOutput, TransportError>;

    async fn download(
        &self,
        remote: &str,
        local: &Path,
        timeout_secs: u64,
    ) -> Result<ExecOutput, TransportError>;
}

// ---------------------------------------------------------------------------
// SshTransport
// ---------------------------------------------------------------------------

/// Transport that shells out to OpenSSH `ssh` and `scp`.
#[derive(Debug, Clone)]
pub struct SshTransport {
    device: DeviceConfig,
    max_output_bytes: usize,
}

impl SshTransport {
    pub fn new(device: DeviceConfig, exec: &ExecConfig) -> Self {
        Self {
            device,
            max_output_bytes: exec.max_output_bytes,
        }
    }

    fn common_options(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.device.connect_timeout),
        ];
        if let Some(key) = self.device.identity_path() {
            args.push("-i".to_string());
            args.push(key.to_string_lossy().into_owned());
        }
        args
    }

    /// Argument vector for `ssh`.
    ///
    /// ssh joins everything after the destination and the remote shell
    /// parses it, so the command goes over as a single argument.
    pub fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec!["-p".to_string(), self.device.port.to_string()];
        args.extend(self.common_options());
        args.push("--".to_string());
        args.push(self.device.destination());
        args.push(command.to_string());
        args
    }

    /// `user@host:path` with the path escaped for the remote shell.
    pub fn scp_remote_spec(&self, remote: &str) -> String {
        format!(
            "{}:{}",
            self.device.scp_destination(),
            escape_scp_remote_path(remote)
        )
    }

    /// Argument vector for `scp`.
    ///
    /// `-O` selects the legacy protocol, whose remote side is shell-parsed
    /// and which the escaping in [`scp_remote_spec`](Self::scp_remote_spec)
    /// targets. Local paths are absolute, so scp never mistakes a `:` in
    /// them for a host separator.
    pub fn scp_args(&self, source: String, target: String) -> Vec<String> {
        let mut args = vec![
            "-O".to_string(),
            "-P".to_string(),
            self.device.port.to_string(),
        ];
        args.extend(self.common_options());
        args.push("--".to_string());
        args.push(source);
        args.push(target);
        args
    }

    async fn run(
        &self,
        program: &str,
        args: Vec<String>,
        timeout_secs: u64,
    ) -> Result<ExecOutput, TransportError> {
        debug!(program, timeout_secs, "spawning transport process");
        let start = Instant::now();

        let mut child = tokio::process::Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let limit = self.max_output_bytes;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // On timeout the child is dropped on return, which kills it.
        let ((stdout, cut_out), (stderr, cut_err), status) =
            tokio::time::timeout(Duration::from_secs(timeout_secs), async {
                tokio::try_join!(
                    read_capped(stdout, limit),
                    read_capped(stderr, limit),
                    child.wait()
                )
            })
            .await
            .map_err(|_| TransportError::Timeout(timeout_secs))??;

        Ok(ExecOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
            truncated: cut_out || cut_err,
        })
    }
}

#[async_trait]
impl RemoteTransport for SshTransport {
    async fn exec(&self, command: &str, timeout_secs: u64) -> Result<ExecOutput, TransportError> {
        let args = self.ssh_args(command);
        self.run(&self.device.ssh_binary, args, timeout_secs).await
    }

    async fn upload(
        &self,
        local: &Path,
        remote: &str,
        timeout_secs: u64,
    ) -> Result<ExecOutput, TransportError> {
        let args = self.scp_args(
            local.to_string_lossy().into_owned(),
            self.scp_remote_spec(remote),
        );
        self.run(&self.device.scp_binary, args, timeout_secs).await
    }

    async fn download(
        &self,
        remote: &str,
        local: &Path,
        timeout_secs: u64,
    ) -> Result<ExecOutput, TransportError> {
        let args = self.scp_args(
            self.scp_remote_spec(remote),
            local.to_string_lossy().into_owned(),
        );
        self.run(&self.device.scp_binary, args, timeout_secs).await
    }
}

/// Read at most `limit` bytes from `pipe`, then discard the rest.
///
/// The remainder is still drained so a chatty child never blocks on a full
/// pipe, but nothing past the limit is held in memory.
async fn read_capped<R: AsyncRead + Unpin>(
    pipe: Option<R>,
    limit: usize,
) -> std::io::Result<(Vec<u8>, bool)> {
    let Some(mut pipe) = pipe else {
        return Ok((Vec::new(), false));
    };
    let mut buf = Vec::new();
    (&mut pipe)
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)
        .await?;
    if buf.len() <= limit {
        return Ok((buf, false));
    }
    buf.truncate(limit);
    tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    Ok((buf, true))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
