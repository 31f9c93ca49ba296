//! Long-lived service advertisement through publisher subprocesses.
//!
//! A service stays advertised exactly as long as its publish process
//! runs. The [`PublisherManager`] owns those processes: it refuses
//! duplicate registrations, terminates on unregister, and releases
//! everything it still holds on [`PublisherManager::shutdown`]. Children
//! are spawned kill-on-drop, so a manager dropped without shutdown still
//! takes its advertisements down with it, just less politely.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::process::Child;

use crate::backend::{self, DiscoveryBackend};
use crate::error::{RegistryError, Result};

/// Registry key for one advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublisherKey {
    pub name: String,
    pub service_type: String,
    pub port: u16,
}

impl PublisherKey {
    fn matches(&self, selector: &PublisherSelector) -> bool {
        selector
            .name
            .as_deref()
            .map_or(true, |name| self.name == name)
            && selector
                .service_type
                .as_deref()
                .map_or(true, |ty| self.service_type == ty)
            && selector.port.map_or(true, |port| self.port == port)
    }
}

/// Which advertisements an unregister call targets. Unset fields are
/// wildcards; the default selector matches everything.
#[derive(Debug, Clone, Default)]
pub struct PublisherSelector {
    pub name: Option<String>,
    pub service_type: Option<String>,
    pub port: Option<u16>,
}

/// Where a publisher process is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    /// Process spawned, advertisement not necessarily on the air yet
    Starting,
    /// Process confirmed running
    Active,
    /// Process exited or was terminated
    Terminated,
}

/// One owned advertisement process.
pub struct Publisher {
    key: PublisherKey,
    child: Child,
    state: PublisherState,
}

impl Publisher {
    fn new(key: PublisherKey, child: Child) -> Self {
        Self {
            key,
            child,
            state: PublisherState::Starting,
        }
    }

    pub fn key(&self) -> &PublisherKey {
        &self.key
    }

    /// Current lifecycle state, refreshed against the process table.
    pub fn state(&mut self) -> PublisherState {
        if self.state == PublisherState::Terminated {
            return self.state;
        }
        match self.child.try_wait() {
            Ok(Some(_)) => self.state = PublisherState::Terminated,
            Ok(None) => self.state = PublisherState::Active,
            // Keep the last known state when the check itself fails.
            Err(_) => {}
        }
        self.state
    }

    /// Stop the advertisement. Terminating a publisher whose process
    /// already exited is a no-op.
    pub async fn terminate(&mut self) {
        let _ = self.child.kill().await;
        self.state = PublisherState::Terminated;
    }
}

/// Owns every advertisement registered through it.
pub struct PublisherManager {
    backend: Arc<dyn DiscoveryBackend>,
    publishers: HashMap<PublisherKey, Publisher>,
}

impl PublisherManager {
    /// Build a manager on the platform's native backend.
    pub fn new() -> Result<Self> {
        Ok(Self::with_backend(backend::default_backend()?))
    }

    /// Build a manager on an explicit backend.
    pub fn with_backend(backend: Arc<dyn DiscoveryBackend>) -> Self {
        Self {
            backend,
            publishers: HashMap::new(),
        }
    }

    /// Advertise one service and track its publisher.
    ///
    /// Fails with [`RegistryError::AlreadyRegistered`] while the same
    /// (name, type, port) is still tracked here. Must run inside a tokio
    /// runtime; the publisher process is spawned on it.
    pub fn register(&mut self, name: &str, service_type: &str, port: u16) -> Result<()> {
        let key = PublisherKey {
            name: name.to_string(),
            service_type: service_type.to_string(),
            port,
        };
        if self.publishers.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered {
                name: key.name,
                service_type: key.service_type,
                port: key.port,
            }
            .into());
        }

        let child = self.backend.spawn_publisher(name, service_type, port)?;
        tracing::info!(name, service_type, port, "service registered");
        self.publishers.insert(key.clone(), Publisher::new(key, child));
        Ok(())
    }

    /// Terminate and drop every tracked advertisement the selector
    /// matches, returning how many were removed. Matching nothing is a
    /// no-op, not an error.
    pub async fn unregister(&mut self, selector: &PublisherSelector) -> usize {
        let keys: Vec<PublisherKey> = self
            .publishers
            .keys()
            .filter(|key| key.matches(selector))
            .cloned()
            .collect();

        for key in &keys {
            if let Some(mut publisher) = self.publishers.remove(key) {
                publisher.terminate().await;
                tracing::info!(
                    name = %key.name,
                    service_type = %key.service_type,
                    port = key.port,
                    "service unregistered"
                );
            }
        }
        keys.len()
    }

    /// Terminate every advertisement this manager still owns. Call this
    /// before teardown; it leaves the manager empty and reusable.
    pub async fn shutdown(&mut self) {
        let released = self.unregister(&PublisherSelector::default()).await;
        if released > 0 {
            tracing::debug!(released, "publisher manager shut down");
        }
    }

    /// Refresh and report the state of one tracked advertisement.
    pub fn state(&mut self, key: &PublisherKey) -> Option<PublisherState> {
        self.publishers.get_mut(key).map(|publisher| publisher.state())
    }

    /// Borrow one tracked publisher, e.g. to poll it directly.
    pub fn publisher_mut(&mut self, key: &PublisherKey) -> Option<&mut Publisher> {
        self.publishers.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, service_type: &str, port: u16) -> PublisherKey {
        PublisherKey {
            name: name.to_string(),
            service_type: service_type.to_string(),
            port,
        }
    }

    #[test]
    fn test_selector_unset_fields_are_wildcards() {
        let key = key("web", "_http._tcp", 80);

        assert!(key.matches(&PublisherSelector::default()));
        assert!(key.matches(&PublisherSelector {
            name: Some("web".to_string()),
            ..Default::default()
        }));
        assert!(key.matches(&PublisherSelector {
            service_type: Some("_http._tcp".to_string()),
            port: Some(80),
            ..Default::default()
        }));
    }

    #[test]
    fn test_selector_set_fields_must_all_match() {
        let key = key("web", "_http._tcp", 80);

        assert!(!key.matches(&PublisherSelector {
            name: Some("other".to_string()),
            ..Default::default()
        }));
        assert!(!key.matches(&PublisherSelector {
            name: Some("web".to_string()),
            port: Some(81),
            ..Default::default()
        }));
    }

    #[cfg(unix)]
    mod with_processes {
        use super::*;
        use crate::backend::spawn_publisher_process;
        use crate::error::CoreError;
        use crate::service::{ServiceIdentity, ServiceRecord};
        use async_trait::async_trait;
        use std::path::Path;

        struct SleepBackend;

        #[async_trait]
        impl DiscoveryBackend for SleepBackend {
            fn name(&self) -> &'static str {
                "sleep"
            }

            async fn browse(
                &self,
                _: Option<&str>,
                _: &str,
            ) -> Result<Vec<(ServiceIdentity, ServiceRecord)>> {
                Ok(Vec::new())
            }

            fn spawn_publisher(&self, _: &str, _: &str, _: u16) -> Result<Child> {
                spawn_publisher_process(Path::new("sleep"), &["30"])
            }

            async fn resolve_address(&self, _: &str) -> String {
                String::new()
            }
        }

        fn manager() -> PublisherManager {
            PublisherManager::with_backend(Arc::new(SleepBackend))
        }

        #[tokio::test]
        async fn test_register_duplicate_is_rejected() {
            let mut manager = manager();
            manager.register("web", "_http._tcp", 49152).unwrap();

            let err = manager.register("web", "_http._tcp", 49152).unwrap_err();
            assert!(matches!(
                err,
                CoreError::Registry(RegistryError::AlreadyRegistered { .. })
            ));
            assert_eq!(manager.len(), 1);

            manager.shutdown().await;
        }

        #[tokio::test]
        async fn test_unregister_without_selector_releases_everything() {
            let mut manager = manager();
            manager.register("a", "_http._tcp", 8001).unwrap();
            manager.register("b", "_ipp._tcp", 8002).unwrap();

            let released = manager.unregister(&PublisherSelector::default()).await;
            assert_eq!(released, 2);
            assert!(manager.is_empty());
        }

        #[tokio::test]
        async fn test_unregister_by_name_leaves_others_running() {
            let mut manager = manager();
            manager.register("a", "_http._tcp", 8001).unwrap();
            manager.register("b", "_http._tcp", 8002).unwrap();

            let released = manager
                .unregister(&PublisherSelector {
                    name: Some("a".to_string()),
                    ..Default::default()
                })
                .await;
            assert_eq!(released, 1);
            assert_eq!(manager.len(), 1);
            assert_eq!(
                manager.state(&key("b", "_http._tcp", 8002)),
                Some(PublisherState::Active)
            );

            manager.shutdown().await;
        }

        #[tokio::test]
        async fn test_terminate_through_borrowed_handle_updates_state() {
            let mut manager = manager();
            manager.register("web", "_http._tcp", 49152).unwrap();

            let key = key("web", "_http._tcp", 49152);
            let publisher = manager.publisher_mut(&key).unwrap();
            assert_eq!(publisher.key(), &key);
            assert_eq!(publisher.state(), PublisherState::Active);

            publisher.terminate().await;
            assert_eq!(manager.state(&key), Some(PublisherState::Terminated));

            manager.shutdown().await;
        }

        #[tokio::test]
        async fn test_unregister_absent_selector_is_noop() {
            let mut manager = manager();
            let released = manager
                .unregister(&PublisherSelector {
                    name: Some("ghost".to_string()),
                    ..Default::default()
                })
                .await;
            assert_eq!(released, 0);
        }

        #[tokio::test]
        async fn test_publisher_terminate_is_idempotent() {
            let child = spawn_publisher_process(Path::new("sleep"), &["30"]).unwrap();
            let mut publisher = Publisher::new(key("web", "_http._tcp", 80), child);

            assert_eq!(publisher.state(), PublisherState::Active);
            publisher.terminate().await;
            publisher.terminate().await;
            assert_eq!(publisher.state(), PublisherState::Terminated);
        }

        #[tokio::test]
        async fn test_state_tracks_child_exit() {
            // A child that exits immediately flips to Terminated on its
            // own, without an unregister.
            let child = spawn_publisher_process(Path::new("true"), &[]).unwrap();
            let mut publisher = Publisher::new(key("short", "_http._tcp", 80), child);

            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            assert_eq!(publisher.state(), PublisherState::Terminated);
        }
    }
}
