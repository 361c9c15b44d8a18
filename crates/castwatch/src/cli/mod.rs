//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the
//! castwatch binary.

pub mod commands;
pub mod maintenance;
pub mod serve;
pub mod worker;

pub use commands::{Cli, Commands, MaintenanceCommands};
