//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate dynamic help text for the adapter argument
fn adapter_help() -> String {
    format!(
        "Adapter to use [available: {}]",
        crate::adapters::adapter_names_short()
    )
}

#[derive(Parser)]
#[command(name = "ch341-i2c")]
#[command(author, version, about = "CH341 I2C tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Transaction fields shared by `run` and `presets add`
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Device address (up to 7 binary digits)
    #[arg(short, long)]
    pub address: String,

    /// Register address (up to 8 binary digits)
    #[arg(short, long, default_value = "")]
    pub register: String,

    /// Write data (space-separated bytes, up to 8 binary digits each)
    #[arg(short, long, default_value = "")]
    pub data: String,

    /// Number of bytes to read (0-1023)
    #[arg(short = 'n', long, default_value_t = 0, allow_negative_numbers = true)]
    pub read_length: i64,

    /// Bus speed mode: 0 = 20 kHz, 1 = 100 kHz, 2 = 400 kHz, 3 = 750 kHz
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub speed: i64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single I2C transaction
    Run {
        /// Adapter to use
        #[arg(short = 'p', long, help = adapter_help())]
        adapter: String,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Run a command stored in a command file
    Exec {
        /// Adapter to use
        #[arg(short = 'p', long, help = adapter_help())]
        adapter: String,

        /// Command file (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Command name
        name: String,
    },

    /// Manage command files
    #[command(subcommand)]
    Presets(PresetCommands),

    /// Show adapter and driver information
    Info {
        /// Adapter to use
        #[arg(short = 'p', long, help = adapter_help())]
        adapter: String,
    },

    /// List supported adapters and attached devices
    ListAdapters,
}

/// Command file subcommands
#[derive(Subcommand)]
pub enum PresetCommands {
    /// List the commands in a file
    List {
        /// Command file (CSV)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show one command
    Show {
        /// Command file (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Command name
        name: String,
    },

    /// Add a command, creating the file if needed
    Add {
        /// Command file (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Command name
        name: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Overwrite an existing command with the same name
        #[arg(long)]
        force: bool,

        /// Rewrite the file even if some of its records failed to load,
        /// dropping them
        #[arg(long)]
        drop_invalid: bool,
    },

    /// Delete a command
    Remove {
        /// Command file (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Command name
        name: String,

        /// Rewrite the file even if some of its records failed to load,
        /// dropping them
        #[arg(long)]
        drop_invalid: bool,
    },

    /// Load a file and report commands that fail validation
    Check {
        /// Command file (CSV)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Write the valid commands of a file to a new file
    SaveAs {
        /// Command file (CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}
