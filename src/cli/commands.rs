//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - init: create the workbook
//! - list/show/add/edit/delete: spool management
//! - use: register filament consumed by a print
//! - history: list, correct or remove print-log entries
//! - backup/restore: copy the workbook out and back in

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Spoolr - filament spool inventory and print log
#[derive(Parser, Debug)]
#[command(name = "spoolr")]
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
    pub command: Option<Commands>,
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
    /// Create the data file if it does not exist
    Init,

    /// List spools, heaviest first
    List {
        /// Only this material (e.g. PLA)
        #[arg(short, long)]
        material: Option<String>,

        /// Only this supplier
        #[arg(short, long)]
        supplier: Option<String>,

        /// Only spools with at least this many grams left
        #[arg(short = 'w', long)]
        min_weight: Option<f64>,
    },

    /// Show one spool and its print history
    Show {
        /// Spool code (e.g. F007)
        code: String,
    },

    /// Add a new spool
    Add {
        #[arg(long)]
        material: String,

        #[arg(long)]
        variant: String,

        #[arg(long)]
        supplier: String,

        /// Grams of filament on the spool
        #[arg(long)]
        weight: f64,

        /// Grams of the empty spool
        #[arg(long)]
        empty_spool_weight: f64,

        /// Date opened (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Color as #RRGGBB
        #[arg(long)]
        color: Option<String>,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Change fields of an existing spool
    Edit {
        /// Spool code
        code: String,

        #[arg(long)]
        material: Option<String>,

        #[arg(long)]
        variant: Option<String>,

        #[arg(long)]
        supplier: Option<String>,

        /// Remaining grams
        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        empty_spool_weight: Option<f64>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a spool (its print history is kept)
    Delete {
        /// Spool code
        code: String,
    },

    /// Register filament used by a print
    Use {
        /// Spool code
        code: String,

        /// Grams consumed
        grams: f64,

        /// Name of the print
        #[arg(short, long)]
        name: String,
    },

    /// Print history
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },

    /// Show the code the next added spool will get
    NextCode,

    /// Copy the data file to a backup
    Backup {
        /// Destination file; defaults to a timestamped name in the current directory
        dest: Option<PathBuf>,
    },

    /// Replace the data file with a backup
    Restore {
        /// Backup file to restore from
        source: PathBuf,
    },
}

/// Print history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommands {
    /// List entries, newest first
    List {
        /// Only entries for this spool
        #[arg(long)]
        code: Option<String>,
    },

    /// Correct the grams used (and optionally the name) of an entry
    Edit {
        /// Entry timestamp, as shown by `history list`
        timestamp: String,

        /// Spool code of the entry
        code: String,

        /// Corrected grams used
        #[arg(short, long)]
        used: f64,

        /// New print name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Remove an entry and return its grams to the spool
    Remove {
        /// Entry timestamp
        timestamp: String,

        /// Spool code of the entry
        code: String,
    },
}
