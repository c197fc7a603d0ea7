//! CLI definition for the `fieldreg` command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Fieldreg - inspect entity configurations, pipelines and option categories.
///
/// Talks to a field registry server configured through `fieldreg.toml`,
/// `--config` or `FIELDREG_*` environment variables. `--offline` swaps in an
/// in-memory registry seeded with the built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "fieldreg")]
#[command(version)]
#[command(about = "Inspect field registry configurations, pipelines and option categories")]
#[command(
    long_about = "Fieldreg reads entity configurations from a field registry server and \
    derives forms, Kanban boards and option lists from them.\n\n\
    Environment variables:\n  \
    FIELDREG_BASE_URL      API root of the registry server\n  \
    FIELDREG_TIMEOUT_SECS  Per-request timeout\n  \
    FIELDREG_TOKEN         Bearer token sent with every request"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Use the in-memory registry instead of a server
    #[arg(long, global = true)]
    pub offline: bool,

    /// Backend configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Entity configurations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Form derivations
    Form {
        #[command(subcommand)]
        action: FormAction,
    },

    /// Kanban boards
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },

    /// Master-data option categories
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show fields by section and the pipeline stages
    Show {
        /// Module, e.g. crm
        module: String,
        /// Entity, e.g. leads
        entity: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum FormAction {
    /// Print the values a new record starts with
    Init { module: String, entity: String },

    /// Check required fields of a record
    ///
    /// Exits with status 1 when any required field is blank.
    Validate {
        module: String,
        entity: String,
        /// Record as a JSON object, or @path to read it from a file
        #[arg(long, value_name = "JSON|@FILE")]
        data: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardAction {
    /// Show items grouped by stage
    Show { module: String, entity: String },

    /// Move an item to another stage
    Move {
        module: String,
        entity: String,
        /// Item id
        item: String,
        /// Target stage value
        #[arg(long)]
        to: String,
        /// Position in the target column (end if omitted)
        #[arg(long)]
        index: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum OptionsAction {
    /// List the options of a category
    List { category: String },

    /// Add a value to a category
    Add { category: String, value: String },
}
