//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Equipment troubleshooting assistant: walk machine-specific yes/no decision trees
#[derive(Parser, Debug)]
#[command(name = "diagtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Data directory containing machines.json and diagnostics/
    #[arg(short = 'D', long, global = true, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Preferred template locale (falls back to the configured default)
    #[arg(short, long, global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List known machines and their templates
    Machines,

    /// Show a machine's decision tree
    Show {
        /// Machine id (as encoded in the QR label)
        machine: String,
        /// Treat the argument as a template id instead of a machine id
        #[arg(long)]
        template: bool,
    },

    /// Walk a machine's decision tree
    Run {
        /// Machine id (as encoded in the QR label)
        machine: String,
        /// Scripted answers instead of interactive input (e.g. y,n,b,r,c)
        #[arg(long, value_delimiter = ',')]
        answers: Option<Vec<String>>,
    },

    /// Validate all templates and machine mappings
    Check,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create global config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
