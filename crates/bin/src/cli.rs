//! CLI argument definitions for the Listenink binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
}

/// Listenink library server
#[derive(Parser, Debug)]
#[command(name = "listenink")]
#[command(about = "Listenink: ordered libraries of documents and bookmarks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Listenink HTTP API
    Serve(ServeArgs),
    /// Manage registered users
    User(UserArgs),
    /// Check health of a running Listenink server
    Health(HealthArgs),
}

/// Where the library is stored.
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "LISTENINK_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores listenink.db
    #[arg(short = 'D', long, env = "LISTENINK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "LISTENINK_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "LISTENINK_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "LISTENINK_HOST")]
    pub host: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Upper bound on one transaction attempt, in milliseconds
    #[arg(long, default_value_t = 10_000, env = "LISTENINK_TX_TIMEOUT_MS")]
    pub tx_timeout_ms: u64,

    /// Attempts made for a transaction that keeps conflicting
    #[arg(long, default_value_t = 5, env = "LISTENINK_TX_MAX_ATTEMPTS")]
    pub tx_max_attempts: u32,
}

/// Arguments for the user command
#[derive(clap::Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user
    Add(UserAddArgs),
    /// List registered users
    List(UserListArgs),
}

#[derive(clap::Args, Debug)]
pub struct UserAddArgs {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct UserListArgs {
    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "LISTENINK_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
