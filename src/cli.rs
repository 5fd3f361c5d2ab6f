use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "farmops", version, about = "Farm management recommendation engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run interactive setup
    Init,
    /// Generate ranked recommendations for a farm
    Generate {
        farm_id: i64,
        /// Restrict the evaluation to one field
        #[arg(long)]
        field: Option<i64>,
        /// Evaluate as of this date (YYYY-MM-DD) instead of now
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Persist the result as the farm's active recommendation set
        #[arg(long)]
        save: bool,
    },
    /// List the active recommendation set for a farm
    List {
        farm_id: i64,
        /// Only recommendations for one field
        #[arg(long)]
        field: Option<i64>,
    },
    /// Mark a stored recommendation completed, dismissed, or active
    SetStatus {
        rec_id: i64,
        /// One of: active, completed, dismissed
        status: String,
    },
    /// Show a crop profile from the knowledge base
    Crop { name: String },
    /// Show a livestock profile from the knowledge base
    Livestock { name: String },
    /// Populate a sample farm with deterministic fixture data
    SeedDemo,
}
