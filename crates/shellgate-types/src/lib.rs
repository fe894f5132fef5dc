//! # shellgate-types
//!
//! Shared type definitions for shellgate. Every other shellgate crate
//! depends on this one.
//!
//! - **[`error`]** -- [`ShellgateError`], the top-level error type
//! - **[`config`]** -- Configuration schema, discovery and environment overrides

pub mod config;
pub mod error;

pub use error::{Result, ShellgateError};
