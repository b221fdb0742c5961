//! # ESG CLI Module
//!
//! This module implements the CLI interface for the ESG maturity engine.
//!
//! ## Available Commands
//!
//! - `init` - Create or empty the store
//! - `load-questions` - Load the reference question bank
//! - `submit` - Validate and store a survey submission
//! - `classify` - Classify a survey file without storing it
//! - `report` - Build the maturity report of a company's latest survey
//! - `history` - Show a company's maturity over time
//! - `status` - Show store status

mod commands;

use crate::config::{EsgConfig, Settings};
use clap::{Parser, Subcommand};
use esg_core::EsgError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// ESG maturity engine
///
/// Scores survey answers into maturity levels (1 to 5) per ESG axis and theme.
#[derive(Parser, Debug)]
#[command(name = "esg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the survey database [default: esg.redb]
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "file" (JSON file) [default: redb]
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Path to a TOML config file
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new empty store, or empty an existing one
    Init {
        /// Empty the store even if it already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Load reference questions from a JSON file
    LoadQuestions {
        /// Path to the question bank (JSON array)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Validate and store a survey submission
    Submit {
        /// Path to the survey submission (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Classify a survey submission without storing it
    Classify {
        /// Path to the survey submission (JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Also show levels per theme
        #[arg(short, long)]
        themes: bool,

        /// Also show how each level of each axis fared
        #[arg(short, long)]
        evidence: bool,
    },

    /// Build the report of a company's latest survey
    Report {
        /// Company name
        #[arg(short, long)]
        company: String,

        /// Write the report to this file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the history series
        #[arg(long)]
        with_history: bool,
    },

    /// Show a company's maturity over time
    History {
        /// Company name
        #[arg(short, long)]
        company: String,
    },

    /// Show store status
    Status,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Load the config file named by `--config`, if any.
pub fn load_config(cli: &Cli) -> Result<EsgConfig, EsgError> {
    match &cli.config {
        Some(path) => EsgConfig::load(path),
        None => Ok(EsgConfig::default()),
    }
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli, config: &EsgConfig) -> Result<(), EsgError> {
    let settings = Settings::resolve(
        cli.database.clone(),
        cli.backend.as_deref(),
        cli.json_mode,
        config,
    )?;

    tracing::debug!(
        database = %settings.database.display(),
        backend = %settings.backend,
        "settings resolved"
    );

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&settings, force),
        Some(Commands::LoadQuestions { file }) => cmd_load_questions(&settings, &file),
        Some(Commands::Submit { file }) => cmd_submit(&settings, &file),
        Some(Commands::Classify {
            file,
            themes,
            evidence,
        }) => cmd_classify(&settings, &file, themes, evidence),
        Some(Commands::Report {
            company,
            output,
            with_history,
        }) => cmd_report(&settings, &company, output.as_deref(), with_history),
        Some(Commands::History { company }) => cmd_history(&settings, &company),
        Some(Commands::Status) => cmd_status(&settings),
        None => {
            // No subcommand - show status by default
            cmd_status(&settings)
        }
    }
}
