//! Service-level runs: pre-flight failures, dry runs and exit codes.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::memory::InMemoryReferenceStore;
use bridge_traits::{DeletionTask, ReferenceDataStore, ReferenceSet};
use core_async::FailurePolicy;
use core_runtime::config::{AppConfig, AppConfigBuilder, PollPolicy};
use core_service::{CoreError, SyncService};
use mockall::mock;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

mock! {
    Store {}

    #[async_trait]
    impl ReferenceDataStore for Store {
        async fn list_sets(&self) -> BridgeResult<Vec<ReferenceSet>>;
        async fn create_set(&self, name: &str) -> BridgeResult<ReferenceSet>;
        async fn bulk_load(&self, name: &str, values: &[String]) -> BridgeResult<ReferenceSet>;
        async fn delete_set(&self, name: &str, purge_only: bool) -> BridgeResult<DeletionTask>;
        async fn delete_task_status(&self, task_id: i64) -> BridgeResult<DeletionTask>;
    }
}

fn inventory() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"host,ip,site,role\nsrv1,10.0.0.1,east,db\nsrv2,10.0.0.2,east,db\n")
        .unwrap();
    file.flush().unwrap();
    file
}

fn builder(file: &NamedTempFile) -> AppConfigBuilder {
    AppConfig::builder()
        .base_url("https://qradar.example.com")
        .sec_token("token")
        .input_path(file.path())
        .poll(PollPolicy {
            max_attempts: 3,
            interval: Duration::from_millis(1),
        })
}

#[tokio::test]
async fn test_successful_run() {
    let file = inventory();
    let store = Arc::new(
        InMemoryReferenceStore::new().with_set("Managed UNIX Devices - retired", "IP", &["10.5.5.5"]),
    );
    let service = SyncService::with_store(builder(&file).build().unwrap(), store.clone());

    let summary = service.run().await.unwrap();
    let report = summary.report.unwrap();

    assert_eq!(summary.plan.len(), 3);
    assert_eq!(report.created, 2);
    assert_eq!(report.removed, 1);
    assert_eq!(
        store.set_names(),
        vec![
            "Managed UNIX Devices - east".to_string(),
            "Managed UNIX Devices - east - db".to_string()
        ]
    );
}

#[tokio::test]
async fn test_dry_run_changes_nothing() {
    let file = inventory();
    let store = Arc::new(
        InMemoryReferenceStore::new().with_set("Managed UNIX Devices - retired", "IP", &["10.5.5.5"]),
    );
    let config = builder(&file).dry_run(true).build().unwrap();
    let service = SyncService::with_store(config, store.clone());

    let summary = service.run().await.unwrap();

    assert!(summary.report.is_none());
    assert_eq!(summary.plan.len(), 3);
    assert!(store.calls().is_empty());
    assert_eq!(store.set_names(), vec!["Managed UNIX Devices - retired".to_string()]);
}

#[tokio::test]
async fn test_missing_inventory_exits_2_before_listing() {
    let mut store = MockStore::new();
    store.expect_list_sets().never();

    let config = AppConfig::builder()
        .base_url("https://qradar.example.com")
        .sec_token("token")
        .input_path("/nonexistent/USS-UNIX-Servers.csv")
        .build()
        .unwrap();
    let service = SyncService::with_store(config, Arc::new(store));

    let error = service.run().await.unwrap_err();
    assert!(matches!(error, CoreError::Extract(_)));
    assert_eq!(error.exit_code(), 2);
}

#[tokio::test]
async fn test_listing_failure_exits_3_without_mutation() {
    let file = inventory();
    let mut store = MockStore::new();
    store
        .expect_list_sets()
        .times(1)
        .returning(|| Err(BridgeError::Connection("connection refused".to_string())));
    store.expect_create_set().never();
    store.expect_delete_set().never();
    store.expect_bulk_load().never();

    let service = SyncService::with_store(builder(&file).build().unwrap(), Arc::new(store));

    let error = service.run().await.unwrap_err();
    assert!(matches!(error, CoreError::Listing(_)));
    assert_eq!(error.exit_code(), 3);
}

#[tokio::test]
async fn test_unit_failure_exits_4_after_all_units() {
    let file = inventory();
    let store = Arc::new(InMemoryReferenceStore::new().failing_on("Managed UNIX Devices - east"));
    let config = builder(&file)
        .failure_policy(FailurePolicy::BestEffort)
        .build()
        .unwrap();
    let service = SyncService::with_store(config, store.clone());

    let error = service.run().await.unwrap_err();

    assert!(matches!(
        error,
        CoreError::PartialFailure {
            failed: 1,
            cancelled: 0
        }
    ));
    assert_eq!(error.exit_code(), 4);
    // The sibling still completed
    assert_eq!(
        store.members("Managed UNIX Devices - east - db").unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_desktop_dependencies_build_without_network() {
    let file = inventory();
    let service = SyncService::new(builder(&file).build().unwrap()).unwrap();

    assert_eq!(service.config().base_url, "https://qradar.example.com");
    assert!(Arc::strong_count(&service.dependencies()) >= 2);
}
