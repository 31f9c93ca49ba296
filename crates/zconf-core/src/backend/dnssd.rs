//! Backend for the `dns-sd` tool (Windows, macOS).
//!
//! `dns-sd` has no terminate-on-complete mode; every invocation runs
//! until killed, so browsing and lookups capture output for a fixed
//! window and then stop the tool. Browse output is the zone-file shaped
//! `-Z` format, which only reports hostnames, so each record goes
//! through a second `-Q` lookup to pick up an address.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;

use super::{capture_output, require_tool, spawn_publisher_process, BackendOptions, DiscoveryBackend};
use crate::error::CoreError;
use crate::escape::unescape_str;
use crate::service::{ServiceIdentity, ServiceRecord};

/// Collection window for one `dns-sd -Z` browse. The tool never exits on
/// its own, so this window is the length of the snapshot.
const DEFAULT_BROWSE_WAIT: Duration = Duration::from_secs(1);

/// Collection window for one `dns-sd -Q` lookup.
const DEFAULT_RESOLVE_WAIT: Duration = Duration::from_millis(300);

/// Type browsed when the caller gives none. `dns-sd` has no single
/// all-types browse, so fall back to plain HTTP.
pub const DEFAULT_BROWSE_TYPE: &str = "_http._tcp";

/// Discovery through the `dns-sd` command-line tool.
pub struct DnsSdBackend {
    bin: PathBuf,
    browse_wait: Duration,
    resolve_wait: Duration,
}

/// One service pulled out of `-Z` output before address resolution.
struct ZoneEntry {
    name: String,
    service_type: String,
    port: u16,
    hostname: String,
    txt: String,
}

impl DnsSdBackend {
    /// Locate `dns-sd` on PATH with default options.
    pub fn new() -> Result<Self, CoreError> {
        Self::new_with(&BackendOptions::default())
    }

    /// Locate `dns-sd` on PATH, honoring caller overrides.
    ///
    /// The address-family option is ignored here; `-Q` lookups return
    /// IPv4 answers.
    pub fn new_with(options: &BackendOptions) -> Result<Self, CoreError> {
        let bin = require_tool("dns-sd")?;
        Ok(Self {
            bin,
            browse_wait: options.browse_wait.unwrap_or(DEFAULT_BROWSE_WAIT),
            resolve_wait: options.resolve_wait.unwrap_or(DEFAULT_RESOLVE_WAIT),
        })
    }
}

#[async_trait]
impl DiscoveryBackend for DnsSdBackend {
    fn name(&self) -> &'static str {
        "dns-sd"
    }

    async fn browse(
        &self,
        service_type: Option<&str>,
        domain: &str,
    ) -> Result<Vec<(ServiceIdentity, ServiceRecord)>, CoreError> {
        let service_type = service_type.unwrap_or(DEFAULT_BROWSE_TYPE);
        let text = capture_output(
            &self.bin,
            &["-Z", service_type, domain],
            self.browse_wait,
        )
        .await?;

        let mut records = Vec::new();
        for entry in parse_zone_output(&text) {
            let address = self.resolve_address(&entry.hostname).await;
            records.push((
                ServiceIdentity::new(&entry.name, &entry.service_type, domain),
                ServiceRecord {
                    hostname: entry.hostname,
                    address,
                    port: entry.port,
                    txt: entry.txt,
                },
            ));
        }
        Ok(records)
    }

    /// Registration always advertises into the `local` domain, which is
    /// the only domain `dns-sd -R` reliably serves.
    fn spawn_publisher(
        &self,
        name: &str,
        service_type: &str,
        port: u16,
    ) -> Result<Child, CoreError> {
        let port = port.to_string();
        spawn_publisher_process(&self.bin, &["-R", name, service_type, "local", &port])
    }

    async fn resolve_address(&self, hostname: &str) -> String {
        match capture_output(&self.bin, &["-Q", hostname], self.resolve_wait).await {
            Ok(text) => parse_query_output(&text),
            Err(_) => String::new(),
        }
    }
}

/// Parse `dns-sd -Z` output into zone entries.
///
/// The interesting lines come in SRV/TXT pairs per instance:
///
/// ```text
/// my\032server._http._tcp  SRV  0 0 49152 box.local. ; Replace with unicast FQDN of target host
/// my\032server._http._tcp  TXT  "path=/"
/// ```
///
/// An SRV line (fourteen whitespace tokens, trailing comment included)
/// carries name, port and hostname. Every TXT line that follows completes
/// an entry from the most recent usable SRV, quotes stripped; a repeated
/// TXT therefore yields a later entry for the same instance, which wins
/// once results are keyed by identity. The instance name is decoded and
/// split from the type at the first dot. Unrecognized lines are ignored.
/// An SRV with an undecodable name or a non-numeric port is skipped along
/// with the TXT lines trailing it, and an SRV never followed by a TXT
/// contributes nothing.
fn parse_zone_output(text: &str) -> Vec<ZoneEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<(String, String, u16, String)> = None;

    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.len() == 14 && tokens[1] == "SRV" {
            let decoded = match unescape_str(tokens[0]) {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::warn!(raw = tokens[0], error = %e, "skipping undecodable service name");
                    pending = None;
                    continue;
                }
            };
            let Some((name, service_type)) = decoded.split_once('.') else {
                tracing::warn!(line, "skipping SRV record without a type suffix");
                pending = None;
                continue;
            };
            let port: u16 = match tokens[4].parse() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(line, "skipping SRV record with non-numeric port");
                    pending = None;
                    continue;
                }
            };
            pending = Some((
                name.to_string(),
                service_type.to_string(),
                port,
                tokens[5].to_string(),
            ));
        }

        if tokens.len() == 3 && tokens[1] == "TXT" {
            if let Some((name, service_type, port, hostname)) = pending.clone() {
                entries.push(ZoneEntry {
                    name,
                    service_type,
                    port,
                    hostname,
                    txt: tokens[2].replace('"', ""),
                });
            }
        }
    }
    entries
}

/// Pull the answer out of `dns-sd -Q` output: the second line is the
/// first record and its last whitespace token is the address. Anything
/// shorter means the lookup produced nothing in time.
fn parse_query_output(text: &str) -> String {
    text.lines()
        .nth(1)
        .and_then(|line| line.split_whitespace().last())
        .unwrap_or_default()
        .to_string()
}
