//! Recording transport for unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shellgate_security::{LocalRoots, RemoteRoots};
use shellgate_types::config::ExecConfig;

use crate::policy::GatewayPolicy;
use crate::transport::{ExecOutput, RemoteTransport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Exec { command: String, timeout: u64 },
    Upload { local: PathBuf, remote: String },
    Download { remote: String, local: PathBuf },
}

/// Records every call and answers with a fixed output.
pub(crate) struct MockTransport {
    pub calls: Mutex<Vec<Call>>,
    pub reply: ExecOutput,
}

impl MockTransport {
    pub fn ok(stdout: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: ExecOutput {
                stdout: stdout.to_string(),
                ..ExecOutput::default()
            },
        })
    }

    pub fn failing(exit_code: i32, stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: ExecOutput {
                exit_code,
                stderr: stderr.to_string(),
                ..ExecOutput::default()
            },
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_command(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::Exec { command, .. } => Some(command),
            _ => None,
        })
    }
}

#[async_trait]
impl RemoteTransport for MockTransport {
    async fn exec(&self, command: &str, timeout_secs: u64) -> Result<ExecOutput, TransportError> {
        self.calls.lock().unwrap().push(Call::Exec {
            command: command.to_string(),
            timeout: timeout_secs,
        });
        Ok(self.reply.clone())
    }

    async fn upload(
        &self,
        local: &Path,
        remote: &str,
        _timeout_secs: u64,
    ) -> Result<ExecOutput, TransportError> {
        self.calls.lock().unwrap().push(Call::Upload {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });
        Ok(self.reply.clone())
    }

    async fn download(
        &self,
        remote: &str,
        local: &Path,
        _timeout_secs: u64,
    ) -> Result<ExecOutput, TransportError> {
        self.calls.lock().unwrap().push(Call::Download {
            remote: remote.to_string(),
            local: local.to_path_buf(),
        });
        Ok(self.reply.clone())
    }
}

pub(crate) fn test_policy(local_root: &Path) -> Arc<GatewayPolicy> {
    Arc::new(GatewayPolicy::new(
        RemoteRoots::new(["/var/mobile", "/tmp"]).unwrap(),
        LocalRoots::new([local_root]),
    ))
}

pub(crate) fn test_exec() -> ExecConfig {
    ExecConfig::default()
}
