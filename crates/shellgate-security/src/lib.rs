//! Command-safety gateway for shellgate.
//!
//! Decides whether a requested device operation may proceed and encodes its
//! arguments so they cannot be subverted by shell metacharacters or path
//! traversal. Three independent, pure components:
//!
//! | Component | Module | Entry points |
//! |-----------|--------|--------------|
//! | Path normalizer & allowlist | [`paths`] | [`normalize_remote_path`], [`ensure_allowed_write_paths`], [`ensure_allowed_local_path`] |
//! | Denylist & write-intent classifier | [`classify`] | [`match_denied_pattern`], [`is_likely_write_command`] |
//! | Shell-safe encoders | [`quoting`] | [`shell_quote`], [`escape_scp_remote_path`] |
//!
//! Allowed roots are always passed in explicitly. The policy tables in
//! [`patterns`] are fixed and built once per process.
//!
//! Write-path checks are a declared-intent contract: the caller states which
//! paths a command touches and only those declarations are checked. Nothing
//! here sandboxes what the command actually does.

pub mod classify;
pub mod error;
pub mod paths;
pub mod patterns;
pub mod quoting;

pub use classify::{is_likely_write_command, match_denied_pattern, match_write_signature};
pub use error::GatewayError;
pub use paths::{
    LocalRoots, RemoteRoots, ensure_allowed_local_path, ensure_allowed_write_paths,
    normalize_local_path, normalize_remote_path,
};
pub use patterns::{DenialRule, WriteSignature};
pub use quoting::{escape_scp_remote_path, shell_quote};
