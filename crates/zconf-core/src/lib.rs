//! Zeroconf service search and registration over the platform's native
//! mDNS command-line tools.
//!
//! No protocol work happens here. Browsing, resolving and advertising
//! are delegated to the avahi tools on Linux and to `dns-sd` elsewhere;
//! this crate turns their text output into typed service records and
//! keeps track of the publisher processes it started.
//!
//! # Example
//!
//! ```no_run
//! use zconf_core::{PublisherManager, SearchFilter, ServiceBrowser};
//!
//! # async fn run() -> zconf_core::Result<()> {
//! let mut manager = PublisherManager::new()?;
//! manager.register("my web server", "_http._tcp", 49152)?;
//!
//! let browser = ServiceBrowser::new()?;
//! let services = browser
//!     .search(&SearchFilter {
//!         service_type: Some("_http._tcp".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! for (identity, record) in &services {
//!     println!("{identity} at {}:{}", record.address, record.port);
//! }
//!
//! manager.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod browser;
pub mod error;
pub mod escape;
pub mod publisher;
pub mod service;

pub use backend::{
    default_backend, default_backend_with, AddressFamily, BackendOptions, DiscoveryBackend,
};
pub use browser::{SearchFilter, ServiceBrowser};
pub use error::{CoreError, Result};
pub use publisher::{Publisher, PublisherKey, PublisherManager, PublisherSelector, PublisherState};
pub use service::{ServiceIdentity, ServiceMap, ServiceRecord};
