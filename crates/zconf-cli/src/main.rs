//! zconf - Zeroconf service search and registration from the terminal.
//!
//! Thin front end over zconf-core: browse advertised services on the
//! local network and hold advertisements up, with table or JSON output.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            let formatter = output::get_formatter(json);
            eprintln!("{}", formatter.format_error(&e.to_string()));
            std::process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so JSON output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Browse(args) => commands::run_browse(args, cli.json).await,
        Commands::Register(args) => commands::run_register(args, cli.json).await,
    }
}
