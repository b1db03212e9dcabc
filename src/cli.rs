use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Student registry client - add, search and remove students on chain")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: .registry/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint serving the wallet accounts
    #[arg(long, global = true, env = "REGISTRY_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Address of the deployed registry contract
    #[arg(long, global = true, env = "REGISTRY_CONTRACT_ADDRESS")]
    pub contract_address: Option<String>,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the connected account and whether it administers the registry
    Status,

    /// Request wallet access and report the connected account
    Connect,

    /// Register a new student (admin only)
    Add {
        /// Student name
        name: String,
    },

    /// Look up a student by id
    Search {
        /// Student id
        id: String,
    },

    /// Remove a student by id (admin only)
    Remove {
        /// Student id
        id: String,
    },

    /// Follow StudentAdded / StudentRemoved events
    Watch {
        /// Stop after this many milliseconds (0 runs until interrupted)
        #[arg(long, default_value = "0")]
        duration_ms: u64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
