//! Service data model shared by search and registration.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one discoverable service instance within a domain.
///
/// The (name, type, domain) triple is the key of search results and is
/// unique per instance on the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceIdentity {
    /// Instance name, e.g. "my web server"
    pub name: String,
    /// Service type, e.g. "_http._tcp"
    pub service_type: String,
    /// Lookup domain, almost always "local"
    pub domain: String,
}

impl ServiceIdentity {
    pub fn new(name: &str, service_type: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            service_type: service_type.to_string(),
            domain: domain.to_string(),
        }
    }
}

impl fmt::Display for ServiceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.name, self.service_type, self.domain)
    }
}

/// Resolved data for one service, produced fresh on every search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Host advertising the service
    pub hostname: String,
    /// Network address, empty when resolution did not produce one
    pub address: String,
    /// Advertised port
    pub port: u16,
    /// Raw TXT blob as printed by the tool, not key/value-parsed
    pub txt: String,
}

/// Search results keyed by service identity.
pub type ServiceMap = HashMap<ServiceIdentity, ServiceRecord>;
