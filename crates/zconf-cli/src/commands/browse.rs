//! Browse command implementation.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::BrowseArgs;
use crate::error::{CliError, Result};
use crate::output::get_formatter;

use zconf_core::{AddressFamily, BackendOptions, SearchFilter, ServiceBrowser};

/// Run the browse command
pub async fn run_browse(args: BrowseArgs, json: bool) -> Result<()> {
    let formatter = get_formatter(json);

    let options = BackendOptions {
        browse_wait: args.wait.map(Duration::from_secs),
        address_family: args.ipv6.then_some(AddressFamily::V6),
        ..Default::default()
    };
    let browser = ServiceBrowser::new_with(&options)?;

    let filter = SearchFilter {
        name: args.name,
        service_type: args.service_type,
        domain: args.domain,
    };

    let spinner = (!json).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        let target = filter.service_type.as_deref().unwrap_or("all types");
        pb.set_message(format!("Browsing {} in {}...", target, filter.domain));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = browser.search(&filter).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let mut services: Vec<_> = result?.into_iter().collect();
    services.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::debug!(count = services.len(), "browse finished");

    println!("{}", formatter.format_services(&services));

    if services.is_empty() {
        return Err(CliError::NoServicesFound);
    }

    Ok(())
}
