mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let result = commands::run(cli).await?;
    output::render(&result, cli.format, cli.pretty)?;

    if !result.errors.is_empty() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
