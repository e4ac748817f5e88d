//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the crit CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// crit - Parse, rewrite, and evaluate filter expressions
#[derive(Parser, Debug)]
#[command(name = "crit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a filter and print its canonical form
    Fmt {
        /// Filter expression (e.g., '[Age] > 30 AND [Name] == "Alice"')
        expr: String,
    },

    /// Print a filter with its clauses in canonical order
    Sort {
        /// Filter expression
        expr: String,
    },

    /// Split a flat OR-chain into smaller filters, one per line
    Split {
        /// Filter expression
        expr: String,

        /// Maximum conditions per chunk (default: from config)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        chunk_size: Option<u64>,
    },

    /// Evaluate a filter against JSON documents
    #[command(name = "match", alias = "m")]
    Match {
        /// Filter expression
        expr: String,

        /// JSON file holding a document or an array of documents (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,
}
