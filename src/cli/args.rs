//! Command-line argument parsing for llmsay
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::config::Credentials;
use crate::errors::Result;
use crate::providers::DEFAULT_MAX_TOKENS;
use crate::routing::DEFAULT_MODEL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// llmsay - ask a hosted LLM and watch the answer stream in
#[derive(Parser, Debug)]
#[command(name = "llmsay")]
#[command(version)]
#[command(about = "Send a prompt to GPT or Claude and stream the answer", long_about = None)]
pub struct Args {
    /// Prompt text; piped stdin is appended after it
    #[arg(value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Model name
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Config file path
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Token cap for providers that require one
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only the answer and errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure the API key for a provider
    Configure {
        /// Provider name (openai, anthropic)
        #[arg(short, long)]
        provider: String,

        /// Provider API key
        #[arg(short, long)]
        key: String,

        /// Config file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List known models and their providers
    Models,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Config file to read, falling back to the default location
    pub fn config_path(&self) -> Result<PathBuf> {
        resolve_config_path(self.file.as_ref())
    }

    /// Prompt is not allowed with subcommands
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.command.is_some() && self.prompt.is_some() {
            return Err("Cannot specify a prompt with a subcommand.".to_string());
        }

        if self.max_tokens == 0 {
            return Err("--max-tokens must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Explicit path if given, otherwise the default config location
pub fn resolve_config_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.clone()),
        None => Credentials::default_path(),
    }
}

impl Verbosity {
    /// Default log level when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show the waiting spinner
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
