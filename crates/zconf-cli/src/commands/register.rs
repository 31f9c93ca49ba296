//! Register command implementation.
//!
//! Registration is only alive while the publisher process runs, so this
//! command holds the terminal until interrupted and withdraws the
//! advertisement on the way out.

use crate::cli::RegisterArgs;
use crate::error::{CliError, Result};
use crate::output::get_formatter;

use zconf_core::PublisherManager;

/// Run the register command
pub async fn run_register(args: RegisterArgs, json: bool) -> Result<()> {
    if args.name.is_empty() {
        return Err(CliError::InvalidArgument(
            "service name must not be empty".to_string(),
        ));
    }
    if !args.service_type.starts_with('_') {
        return Err(CliError::InvalidArgument(format!(
            "'{}' does not look like a service type (expected e.g. _http._tcp)",
            args.service_type
        )));
    }

    let formatter = get_formatter(json);

    let mut manager = PublisherManager::new()?;
    manager.register(&args.name, &args.service_type, args.port)?;

    println!(
        "{}",
        formatter.format_message(&format!(
            "Advertising '{}' ({}) on port {}; press Ctrl+C to stop",
            args.name, args.service_type, args.port
        ))
    );

    tokio::signal::ctrl_c().await?;
    tracing::debug!("interrupt received, withdrawing advertisement");

    manager.shutdown().await;
    println!("{}", formatter.format_message("Advertisement withdrawn"));

    Ok(())
}
