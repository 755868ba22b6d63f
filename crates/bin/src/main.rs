mod backend;
mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ServeArgs, UserCommands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("listenink=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::User(args)) => match args.command {
            UserCommands::Add(add) => commands::user::add(&add).await,
            UserCommands::List(list) => commands::user::list(&list).await,
        },
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        // Default to serve with env/default args
        None => {
            let args = ServeArgs::parse_from(["listenink"]);
            commands::serve::run(&args).await
        }
    }
}
