//! CLI commands.

pub mod build;
