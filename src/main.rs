#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod cli;
mod commands;
mod config;
mod output;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = cli.output;
    let command = commands::command_name(&cli.command);

    if let Err(err) = commands::run(cli).await {
        tracing::debug!(
            command,
            code = err.code(),
            retryable = err.is_retryable(),
            "command failed"
        );
        output::emit_error(output, command, &err);
        std::process::exit(err.exit_code());
    }
}
