//! CLI module for spoolr - command-line interface and subcommands.
//!
//! Each subcommand maps onto one inventory or storage operation.

pub mod commands;

pub use commands::Cli;
