//! Subcommand implementations.

pub mod classifications;
pub mod upload;
