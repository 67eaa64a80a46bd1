use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::Cli;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "notekeeper=warn",
        1 => "notekeeper=info",
        _ => "notekeeper=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
