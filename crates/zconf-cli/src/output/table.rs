//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, ContentArrangement, Table};

use super::OutputFormatter;
use zconf_core::{ServiceIdentity, ServiceRecord};

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_services(&self, services: &[(ServiceIdentity, ServiceRecord)]) -> String {
        if services.is_empty() {
            return "No services found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            "Name", "Type", "Domain", "Hostname", "Address", "Port", "TXT",
        ]);

        for (identity, record) in services {
            table.add_row(vec![
                Cell::new(&identity.name),
                Cell::new(&identity.service_type),
                Cell::new(&identity.domain),
                Cell::new(&record.hostname),
                Cell::new(&record.address),
                Cell::new(record.port.to_string()),
                Cell::new(&record.txt),
            ]);
        }

        format!("{}\n\nFound {} service(s)", table, services.len())
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("{} {}", "Error:".red().bold(), error)
    }
}
