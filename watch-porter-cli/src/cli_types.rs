//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "watch-porter")]
#[command(about = "Resolve watch model numbers into Wix product CSV files", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Catalog file to read and extend (default: <data_dir>/watch-porter/model_specs_catalog.json)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Category mapping file (default: <config_dir>/watch-porter/category_mapping.json)
    #[arg(long, global = true)]
    pub mapping: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Resolve model numbers and print the attributes found
    Resolve {
        /// Model numbers (e.g., SKX007 GA-2100-1A)
        #[arg(required = true)]
        models: Vec<String>,
    },

    /// Resolve model numbers and write a Wix product CSV
    Export {
        /// Model numbers, in addition to any read from --input
        models: Vec<String>,

        /// Text file with one model number per line
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV path (default: wix_watches_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a resolution log with per-source counts
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Turn a JSON array of (edited) row objects into a Wix CSV
    Generate {
        /// JSON file: an array of rows, or an object with a `results` array
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV path (default: wix_watches_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the CSV header with one example row
    Template {
        /// Output CSV path (default: wix_template_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect the model catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Manage search and classifier credentials
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum CatalogAction {
    /// List stored models and how many groups are still unknown
    List,

    /// Show the stored entry for one model
    Show {
        /// Model number (any spelling that normalizes to the stored key)
        model: String,
    },

    /// Print the catalog file path
    Path,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current credentials and their sources
    Show,

    /// Print the config file paths
    Path,
}
