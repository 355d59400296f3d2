//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// placesync - reconcile Firefox bookmarks with a JSON snapshot
#[derive(Parser, Debug)]
#[command(name = "placesync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Places database (default: newest ~/.mozilla/firefox/*.default*/places.sqlite)
    #[arg(long, global = true, env = "PLACESYNC_PLACES")]
    pub places_path: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the bookmarks in the places database as a JSON snapshot
    Dump {
        /// Output file (default: stdout)
        output: Option<PathBuf>,

        /// Replace the output file if it exists
        #[arg(short = 'f', long)]
        overwrite: bool,
    },

    /// Compare two JSON snapshots
    Diff {
        /// Snapshot A
        a: PathBuf,

        /// Snapshot B
        b: PathBuf,
    },

    /// Make the places database match a JSON snapshot
    Import {
        /// Snapshot to import
        path: PathBuf,

        /// Skip the database and JSON backups
        #[arg(short = 'n', long)]
        no_backup: bool,

        /// Apply without asking for confirmation
        #[arg(short = 'f', long)]
        no_confirm: bool,

        /// Do not print the changes
        #[arg(short, long)]
        silent: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
