//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - serve: run the gateway HTTP server
//! - get-prompt: fetch a prompt from a running gateway

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// promptgate - prompt compilation gateway
#[derive(Parser, Debug)]
#[command(name = "promptgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the gateway server
    Serve {
        /// Override server.bind_addr
        #[arg(short, long)]
        bind: Option<String>,

        /// Override compiler.catalog_path
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Fetch a prompt from a running gateway
    GetPrompt {
        /// Gateway URL (falls back to OPENLIT_URL)
        #[arg(short, long)]
        url: Option<String>,

        /// API key (falls back to OPENLIT_API_KEY)
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Prompt name
        #[arg(short, long, conflicts_with = "id")]
        name: Option<String>,

        /// Prompt id
        #[arg(long)]
        id: Option<String>,

        /// Prompt version (latest when omitted)
        #[arg(long)]
        prompt_version: Option<String>,

        /// Substitute variables into the prompt
        #[arg(long)]
        compile: bool,

        /// Variable as key=value; value is parsed as JSON when possible
        #[arg(long = "var", value_parser = parse_key_value)]
        vars: Vec<(String, String)>,

        /// Meta properties as a JSON object
        #[arg(long)]
        meta: Option<String>,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
