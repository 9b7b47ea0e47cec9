//! `pharmstock` console entry point.

use std::process::ExitCode;

use clap::Parser;

use pharmstock_desktop::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    pharmstock_observability::init(cli.log_format);

    match pharmstock_desktop::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
