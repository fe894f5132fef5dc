//! Tool contract and registry.

pub mod registry;
