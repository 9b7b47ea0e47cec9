use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pharmstock_inventory::KNOWN_CATEGORIES;
use pharmstock_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "pharmstock", version, about = "Pharmacy stock tracker")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        env = "PHARMSTOCK_DATA_FILE",
        help = "Inventory CSV file (defaults to the OS data directory)"
    )]
    pub data_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "PHARMSTOCK_LOW_STOCK_THRESHOLD",
        help = "Items with fewer units than this are low on stock"
    )]
    pub threshold: Option<u32>,
    #[arg(
        long,
        global = true,
        env = "PHARMSTOCK_AUTOSAVE_SECS",
        help = "Auto-save period for the interactive shell, 0 disables it"
    )]
    pub autosave_secs: Option<u64>,
    #[arg(
        long,
        global = true,
        env = "PHARMSTOCK_LOG_FORMAT",
        default_value_t = LogFormat::Pretty,
        help = "Log format on stderr (json or pretty)"
    )]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(flatten)]
    Store(StoreCommand),
    /// Interactive console; the store stays open and auto-saves.
    Shell,
}

/// Commands that operate on the inventory, shared by the one-shot CLI and the shell.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    /// Show every item.
    List,
    /// Items whose name or id contains the query (case-insensitive).
    Search { query: String },
    /// Add a new item.
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        quantity: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "Other", help = category_help())]
        category: String,
    },
    /// Set the quantity of an existing item.
    Update {
        id: String,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// List items below the low-stock threshold.
    LowStock {
        #[arg(long, help = "Use this threshold instead of the configured one")]
        below: Option<u32>,
    },
    /// Summary figures.
    Stats,
}

fn category_help() -> String {
    format!(
        "Item category, usually one of: {} (any other text is accepted)",
        KNOWN_CATEGORIES.join(", ")
    )
}

/// One line typed into the interactive shell.
#[derive(Parser, Debug)]
#[command(name = "pharmstock", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    #[command(flatten)]
    Store(StoreCommand),
    /// List the usual item categories.
    Categories,
    /// Show or change the low-stock threshold for this session.
    Threshold { value: Option<u32> },
    /// Write the inventory to disk now.
    Save,
    /// Save and leave the shell.
    #[command(alias = "exit")]
    Quit,
}
