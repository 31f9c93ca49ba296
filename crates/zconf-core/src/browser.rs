//! One-shot service search over a discovery backend.

use std::sync::Arc;

use crate::backend::{self, BackendOptions, DiscoveryBackend};
use crate::error::Result;
use crate::service::ServiceMap;

/// What a search should match.
///
/// An unset name or type acts as a wildcard; the domain defaults to
/// `local`.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    /// Exact instance name to keep, all names when unset
    pub name: Option<String>,
    /// Service type to browse, every type when unset
    pub service_type: Option<String>,
    /// Browse domain
    pub domain: String,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            name: None,
            service_type: None,
            domain: "local".to_string(),
        }
    }
}

/// Searches for advertised services through a [`DiscoveryBackend`].
pub struct ServiceBrowser {
    backend: Arc<dyn DiscoveryBackend>,
}

impl ServiceBrowser {
    /// Build a browser on the platform's native backend.
    pub fn new() -> Result<Self> {
        Ok(Self {
            backend: backend::default_backend()?,
        })
    }

    /// Build a browser on the platform's native backend with options.
    pub fn new_with(options: &BackendOptions) -> Result<Self> {
        Ok(Self {
            backend: backend::default_backend_with(options)?,
        })
    }

    /// Build a browser on an explicit backend.
    pub fn with_backend(backend: Arc<dyn DiscoveryBackend>) -> Self {
        Self { backend }
    }

    /// Run one bounded search and return everything that matched.
    ///
    /// The backend browses by type and domain; the name filter is
    /// applied here afterwards, as an exact case-sensitive match. When
    /// two records resolve to the same identity the later one wins. No
    /// matches is an empty map, never an error.
    pub async fn search(&self, filter: &SearchFilter) -> Result<ServiceMap> {
        let records = self
            .backend
            .browse(filter.service_type.as_deref(), &filter.domain)
            .await?;

        let mut services = ServiceMap::new();
        for (identity, record) in records {
            services.insert(identity, record);
        }
        if let Some(name) = &filter.name {
            services.retain(|identity, _| identity.name == *name);
        }

        tracing::debug!(
            backend = self.backend.name(),
            matched = services.len(),
            "search complete"
        );
        Ok(services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::service::{ServiceIdentity, ServiceRecord};
    use async_trait::async_trait;
    use tokio::process::Child;

    struct StaticBackend {
        records: Vec<(ServiceIdentity, ServiceRecord)>,
    }

    #[async_trait]
    impl DiscoveryBackend for StaticBackend {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn browse(
            &self,
            service_type: Option<&str>,
            domain: &str,
        ) -> Result<Vec<(ServiceIdentity, ServiceRecord)>> {
            Ok(self
                .records
                .iter()
                .filter(|(identity, _)| {
                    identity.domain == domain
                        && service_type.map_or(true, |ty| identity.service_type == ty)
                })
                .cloned()
                .collect())
        }

        fn spawn_publisher(&self, _: &str, _: &str, _: u16) -> Result<Child> {
            Err(CoreError::Other("static backend cannot publish".to_string()))
        }

        async fn resolve_address(&self, _: &str) -> String {
            String::new()
        }
    }

    fn record(port: u16) -> ServiceRecord {
        ServiceRecord {
            hostname: "box.local".to_string(),
            address: "192.168.1.4".to_string(),
            port,
            txt: String::new(),
        }
    }

    fn browser() -> ServiceBrowser {
        ServiceBrowser::with_backend(Arc::new(StaticBackend {
            records: vec![
                (
                    ServiceIdentity::new("web", "_http._tcp", "local"),
                    record(80),
                ),
                (
                    ServiceIdentity::new("printer", "_ipp._tcp", "local"),
                    record(631),
                ),
            ],
        }))
    }

    #[tokio::test]
    async fn test_search_unknown_name_returns_empty_map() {
        let filter = SearchFilter {
            name: Some("no-such-service".to_string()),
            ..Default::default()
        };
        let services = browser().search(&filter).await.unwrap();
        assert!(services.is_empty());
    }

    #[tokio::test]
    async fn test_search_name_filter_is_exact_and_case_sensitive() {
        let mut filter = SearchFilter {
            name: Some("web".to_string()),
            ..Default::default()
        };
        assert_eq!(browser().search(&filter).await.unwrap().len(), 1);

        filter.name = Some("Web".to_string());
        assert!(browser().search(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_type_contains_fully_qualified_results() {
        let browser = browser();

        let qualified = SearchFilter {
            name: Some("web".to_string()),
            service_type: Some("_http._tcp".to_string()),
            ..Default::default()
        };
        let by_type = SearchFilter {
            service_type: Some("_http._tcp".to_string()),
            ..Default::default()
        };

        let narrow = browser.search(&qualified).await.unwrap();
        let wide = browser.search(&by_type).await.unwrap();
        assert!(!narrow.is_empty());
        for (identity, record) in &narrow {
            assert_eq!(wide.get(identity), Some(record));
        }
    }

    #[tokio::test]
    async fn test_search_last_record_wins_on_duplicate_identity() {
        let identity = ServiceIdentity::new("web", "_http._tcp", "local");
        let browser = ServiceBrowser::with_backend(Arc::new(StaticBackend {
            records: vec![(identity.clone(), record(80)), (identity.clone(), record(8080))],
        }));

        let services = browser.search(&SearchFilter::default()).await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services.get(&identity).map(|r| r.port), Some(8080));
    }
}
