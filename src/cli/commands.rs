use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taarifa")]
#[command(version, about = "Product catalog with content-hash lookup")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to a config file (defaults to .taarifa/config.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Storage backend (memory, json, sqlite)
    #[arg(long, global = true, value_name = "KIND")]
    pub backend: Option<String>,

    /// Data file or database path
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a taarifa project in the current directory
    Init,

    /// Add a new product
    Add {
        /// Product name (at least 5 characters)
        name: String,

        /// Product description (at least 5 characters)
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List products
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single product by hash
    Get {
        /// Product hash (or id with --id)
        key: String,

        /// Look up by id instead of hash
        #[arg(long)]
        id: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a product's name or description
    Update {
        /// Product id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a product by id
    Delete {
        /// Product id
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Remove every product
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Print the number of stored products
    Count,

    /// Write all products as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Replace all products with the contents of a JSON file
    Import {
        /// JSON file containing an array of products
        file: PathBuf,
    },

    /// Start the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
}
