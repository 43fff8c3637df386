//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Links the transitive dependency closure of a JavaScript entry into a minimal deduplicated node_modules tree
#[derive(Parser, Debug)]
#[command(name = "nodelink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link required packages into an output tree
    Link {
        /// Input directory containing the entry file
        #[arg(value_hint = ValueHint::DirPath)]
        input: PathBuf,

        /// Output directory receiving the registry tree
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: PathBuf,

        /// Entry file name (default from config: index.js)
        #[arg(long)]
        main_file: Option<String>,

        /// Identifiers to exclude (repeatable, "!name" removes a configured entry)
        #[arg(short, long)]
        ignore: Vec<String>,

        /// Remove the output directory first
        #[arg(long)]
        clean: bool,
    },

    /// Show the dependency tree of the entry file
    Tree {
        /// Input directory containing the entry file
        #[arg(value_hint = ValueHint::DirPath)]
        input: PathBuf,

        /// Entry file name (default from config: index.js)
        #[arg(long)]
        main_file: Option<String>,

        /// Identifiers to exclude (repeatable)
        #[arg(short, long)]
        ignore: Vec<String>,
    },

    /// List the registry paths a link run would create
    List {
        /// Input directory containing the entry file
        #[arg(value_hint = ValueHint::DirPath)]
        input: PathBuf,

        /// Entry file name (default from config: index.js)
        #[arg(long)]
        main_file: Option<String>,

        /// Identifiers to exclude (repeatable)
        #[arg(short, long)]
        ignore: Vec<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and effective configuration
    Info,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
