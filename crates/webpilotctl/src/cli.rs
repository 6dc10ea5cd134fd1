//! CLI - command-line argument parsing
//!
//! Defines the clap structure only; execution lives in `commands`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "webpilotctl")]
#[command(about = "Turn free-text commands into browser action plans", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file path (overrides $WEBPILOT_CONFIG and the default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interpret a command and print the resulting action plan
    Plan {
        /// The free-text command, e.g. "search for flights from mumbai to delhi next monday"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Output JSON only
        #[arg(long)]
        json: bool,

        /// Reference date (YYYY-MM-DD) for relative dates; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the effective configuration
    Config {
        /// Output JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Self-check: handler coverage and configuration validity
    Check,
}
