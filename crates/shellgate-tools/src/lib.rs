//! Device tools for shellgate.
//!
//! Provides the tools that reach a managed device, each implementing the
//! `Tool` trait from shellgate-core and routing every request through the
//! command-safety gateway before anything is sent.
//!
//! # Tools
//!
//! - **Exec tools** ([`exec_tool`]): `device_exec`, `device_exec_write`
//! - **File tools** ([`file_tools`]): `read_remote_file`, `write_remote_file`, `list_remote_dir`
//! - **Log tool** ([`log_tool`]): `search_syslog`
//! - **Transfer tools** ([`transfer_tools`]): `push_file`, `pull_file`
//!
//! Commands arrive at the device through a [`RemoteTransport`]; the
//! production implementation is [`SshTransport`].

mod args;
pub mod exec_tool;
pub mod file_tools;
pub mod log_tool;
pub mod policy;
pub mod transfer_tools;
pub mod transport;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use shellgate_core::tools::registry::ToolRegistry;
use shellgate_types::config::ExecConfig;

pub use policy::GatewayPolicy;
pub use transport::{ExecOutput, RemoteTransport, SshTransport, TransportError};

/// Register every device tool with the given registry.
///
/// All tools share `transport` and `policy`. `exec` supplies the default
/// and maximum timeouts.
pub fn register_all(
    registry: &mut ToolRegistry,
    transport: Arc<dyn RemoteTransport>,
    policy: Arc<GatewayPolicy>,
    exec: ExecConfig,
) {
    registry.register(Arc::new(exec_tool::DeviceExecTool::new(
        transport.clone(),
        policy.clone(),
        exec.clone(),
    )));
    registry.register(Arc::new(exec_tool::DeviceExecWriteTool::new(
        transport.clone(),
        policy.clone(),
        exec.clone(),
    )));
    registry.register(Arc::new(file_tools::ReadRemoteFileTool::new(
        transport.clone(),
        policy.clone(),
        exec.clone(),
    )));
    registry.register(Arc::new(file_tools::WriteRemoteFileTool::new(
        transport.clone(),
        policy.clone(),
        exec.clone(),
    )));
    registry.register(Arc::new(file_tools::ListRemoteDirTool::new(
        transport.clone(),
        policy.clone(),
        exec.clone(),
    )));
    registry.register(Arc::new(log_tool::SearchSyslogTool::new(
        transport.clone(),
        policy.clone(),
        exec.clone(),
    )));
    registry.register(Arc::new(transfer_tools::PushFileTool::new(
        transport.clone(),
        policy.clone(),
        exec.clone(),
    )));
    registry.register(Arc::new(transfer_tools::PullFileTool::new(
        transport, policy, exec,
    )));
}
