use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "diffstats")]
#[command(about = "Query recorded difficulty and block creation statistics", long_about = None)]
pub struct Args {
    /// Path to configuration file (optional, uses defaults if not provided)
    #[arg(short, long = "config")]
    pub config_path: Option<PathBuf>,

    /// Statistics data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Recorded next-difficulty computations
    Difficulty {
        /// Single height
        #[arg(long, conflicts_with_all = ["from", "to"], required_unless_present_all = ["from", "to"])]
        height: Option<u64>,

        /// First height of the range (inclusive)
        #[arg(long, requires = "to")]
        from: Option<u64>,

        /// Last height of the range (inclusive)
        #[arg(long, requires = "from")]
        to: Option<u64>,
    },

    /// Block creation timings
    Blocks {
        /// First height of the range (inclusive)
        #[arg(long)]
        from: u64,

        /// Last height of the range (inclusive)
        #[arg(long)]
        to: u64,
    },
}

pub fn parse_args() -> Args {
    Args::parse()
}
