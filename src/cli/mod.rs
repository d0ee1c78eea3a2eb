//! CLI module for promptgate - command-line interface and subcommands.
//!
//! Runs the gateway server or fetches a prompt from a running gateway.

pub mod commands;

pub use commands::Cli;
