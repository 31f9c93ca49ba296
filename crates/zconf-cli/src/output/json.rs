//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::json;

use super::OutputFormatter;
use zconf_core::{ServiceIdentity, ServiceRecord};

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_services(&self, services: &[(ServiceIdentity, ServiceRecord)]) -> String {
        let items: Vec<_> = services
            .iter()
            .map(|(identity, record)| {
                json!({
                    "name": identity.name,
                    "type": identity.service_type,
                    "domain": identity.domain,
                    "hostname": record.hostname,
                    "address": record.address,
                    "port": record.port,
                    "txt": record.txt,
                })
            })
            .collect();

        Self::to_json(&json!({
            "services": items,
            "count": services.len()
        }))
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }

    fn format_error(&self, error: &str) -> String {
        Self::to_json(&json!({ "error": error }))
    }
}
