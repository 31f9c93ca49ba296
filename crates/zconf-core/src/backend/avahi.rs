//! Backend for the avahi tool family (Linux).
//!
//! Browsing shells out to `avahi-browse` in parsable one-shot mode,
//! publishing holds an `avahi-publish -s` process alive, and hostname
//! resolution goes through `avahi-resolve` when it is installed.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;

use super::{
    capture_output, require_tool, spawn_publisher_process, AddressFamily, BackendOptions,
    DiscoveryBackend,
};
use crate::error::CoreError;
use crate::escape::unescape_str;
use crate::service::{ServiceIdentity, ServiceRecord};

/// Upper bound on one `avahi-browse --terminate` run. The tool exits on
/// its own once the browse settles; this only caps a wedged run.
const DEFAULT_BROWSE_WAIT: Duration = Duration::from_secs(5);

/// Upper bound on one `avahi-resolve` run.
const DEFAULT_RESOLVE_WAIT: Duration = Duration::from_secs(1);

/// Discovery through the avahi command-line tools.
pub struct AvahiBackend {
    browse_bin: PathBuf,
    publish_bin: PathBuf,
    resolve_bin: Option<PathBuf>,
    browse_wait: Duration,
    resolve_wait: Duration,
    family: AddressFamily,
}

impl AvahiBackend {
    /// Locate the avahi tools on PATH with default options.
    ///
    /// `avahi-browse` and `avahi-publish` are required; `avahi-resolve`
    /// is optional and its absence only disables address resolution.
    pub fn new() -> Result<Self, CoreError> {
        Self::new_with(&BackendOptions::default())
    }

    /// Locate the avahi tools on PATH, honoring caller overrides.
    pub fn new_with(options: &BackendOptions) -> Result<Self, CoreError> {
        let browse_bin = require_tool("avahi-browse")?;
        let publish_bin = require_tool("avahi-publish")?;
        let resolve_bin = which::which("avahi-resolve").ok();

        Ok(Self {
            browse_bin,
            publish_bin,
            resolve_bin,
            browse_wait: options.browse_wait.unwrap_or(DEFAULT_BROWSE_WAIT),
            resolve_wait: options.resolve_wait.unwrap_or(DEFAULT_RESOLVE_WAIT),
            family: options.address_family.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl DiscoveryBackend for AvahiBackend {
    fn name(&self) -> &'static str {
        "avahi"
    }

    async fn browse(
        &self,
        service_type: Option<&str>,
        domain: &str,
    ) -> Result<Vec<(ServiceIdentity, ServiceRecord)>, CoreError> {
        let mut args = vec![
            "--terminate",
            "--resolve",
            "--parsable",
            "--no-db-lookup",
            "--domain",
            domain,
        ];
        match service_type {
            Some(ty) => args.push(ty),
            None => args.push("--all"),
        }

        let text = capture_output(&self.browse_bin, &args, self.browse_wait).await?;
        Ok(parse_browse_output(&text, self.family))
    }

    fn spawn_publisher(
        &self,
        name: &str,
        service_type: &str,
        port: u16,
    ) -> Result<Child, CoreError> {
        let port = port.to_string();
        spawn_publisher_process(&self.publish_bin, &["-s", name, service_type, &port])
    }

    async fn resolve_address(&self, hostname: &str) -> String {
        let Some(bin) = &self.resolve_bin else {
            return String::new();
        };
        match capture_output(bin, &["--name", hostname], self.resolve_wait).await {
            Ok(text) => parse_resolve_output(&text),
            Err(_) => String::new(),
        }
    }
}

/// Parse `avahi-browse --parsable` output into resolved records.
///
/// A resolved line looks like:
///
/// ```text
/// =;eth0;IPv4;my\032server;_http._tcp;local;box.local;192.168.1.4;49152;"path=/"
/// ```
///
/// Only `=` (resolved) lines whose IP-version tag matches `family` are
/// kept. The TXT blob may itself contain `;`, so the split is capped at
/// ten fields and the tail lands in TXT whole. Lines that do not fit the
/// shape, ports that are not numeric, and names that fail to decode are
/// skipped rather than failing the browse.
fn parse_browse_output(text: &str, family: AddressFamily) -> Vec<(ServiceIdentity, ServiceRecord)> {
    let family_tag = match family {
        AddressFamily::V4 => "IPv4",
        AddressFamily::V6 => "IPv6",
    };

    let mut records = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.splitn(10, ';').collect();
        if fields.len() != 10 || fields[0] != "=" || fields[2] != family_tag {
            continue;
        }

        let name = match unescape_str(fields[3]) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(raw = fields[3], error = %e, "skipping undecodable service name");
                continue;
            }
        };
        let port: u16 = match fields[8].parse() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!(line, "skipping record with non-numeric port");
                continue;
            }
        };

        records.push((
            ServiceIdentity::new(&name, fields[4], fields[5]),
            ServiceRecord {
                hostname: fields[6].to_string(),
                address: fields[7].to_string(),
                port,
                txt: fields[9].to_string(),
            },
        ));
    }
    records
}

/// Pull the address out of `avahi-resolve` output, which is one line of
/// `hostname<TAB>address`. Empty output means the resolution failed.
fn parse_resolve_output(text: &str) -> String {
    text.lines()
        .next()
        .and_then(|line| line.split_whitespace().last())
        .unwrap_or_default()
        .to_string()
}
