//! Core tool infrastructure for shellgate.
//!
//! Defines the [`tools::registry::Tool`] contract that every device tool
//! implements and the [`tools::registry::ToolRegistry`] that dispatches
//! requests to them by name.

pub mod tools;
