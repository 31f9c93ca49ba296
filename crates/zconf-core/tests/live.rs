//! End-to-end exercise against the real avahi daemon.
//!
//! Needs the avahi tools on PATH and a running avahi-daemon; run with
//! `cargo test -- --ignored`.

#![cfg(target_os = "linux")]

use std::time::Duration;

use zconf_core::{
    PublisherManager, PublisherSelector, SearchFilter, ServiceBrowser, ServiceIdentity,
};

#[tokio::test]
#[ignore = "needs avahi-daemon on the local network"]
async fn test_register_search_unregister_round_trip() {
    let mut manager = PublisherManager::new().unwrap();
    let browser = ServiceBrowser::new().unwrap();

    manager
        .register("zconf-e2e-http", "_http._tcp", 49152)
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let filter = SearchFilter {
        name: Some("zconf-e2e-http".to_string()),
        service_type: Some("_http._tcp".to_string()),
        ..Default::default()
    };
    let services = browser.search(&filter).await.unwrap();
    let identity = ServiceIdentity::new("zconf-e2e-http", "_http._tcp", "local");
    let record = services
        .get(&identity)
        .expect("registered service not found in browse results");
    assert_eq!(record.port, 49152);

    let released = manager
        .unregister(&PublisherSelector {
            name: Some("zconf-e2e-http".to_string()),
            ..Default::default()
        })
        .await;
    assert_eq!(released, 1);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let services = browser.search(&filter).await.unwrap();
    assert!(services.is_empty());
}
