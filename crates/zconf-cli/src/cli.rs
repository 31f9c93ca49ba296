//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};

/// zconf - Zeroconf service search and registration
#[derive(Parser, Debug)]
#[command(name = "zconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for services advertised on the local network
    Browse(BrowseArgs),

    /// Advertise a service until interrupted
    Register(RegisterArgs),
}

// ==================== Browse ====================

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Service type to browse (e.g. _http._tcp); all types when omitted
    pub service_type: Option<String>,

    /// Keep only services with this exact instance name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Browse domain
    #[arg(short, long, default_value = "local")]
    pub domain: String,

    /// Collection window in seconds (default depends on the backend)
    #[arg(long, env = "ZCONF_BROWSE_WAIT")]
    pub wait: Option<u64>,

    /// Keep IPv6 records instead of IPv4
    #[arg(long)]
    pub ipv6: bool,
}

// ==================== Register ====================

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Instance name (e.g. "my web server")
    pub name: String,

    /// Service type (e.g. _http._tcp)
    pub service_type: String,

    /// Port the service listens on
    pub port: u16,
}
