//! Remote state reader: the managed subset of the platform's reference sets.

use crate::error::{Result, SyncError};
use bridge_traits::reference_data::{ReferenceDataStore, ReferenceSet};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Managed remote sets keyed by name.
pub type RemoteSets = BTreeMap<String, ReferenceSet>;

/// List every set once and keep those whose name starts with `prefix`.
///
/// Sets outside the prefix are never returned, so nothing downstream can
/// touch them.
#[instrument(skip(store))]
pub async fn fetch_managed_sets(store: &dyn ReferenceDataStore, prefix: &str) -> Result<RemoteSets> {
    let all_sets = store.list_sets().await.map_err(SyncError::Listing)?;
    let total = all_sets.len();

    let managed: RemoteSets = all_sets
        .into_iter()
        .filter(|set| set.name.starts_with(prefix))
        .map(|set| (set.name.clone(), set))
        .collect();

    info!(total, managed = managed.len(), "Fetched remote reference sets");
    Ok(managed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bridge_traits::memory::InMemoryReferenceStore;

    #[tokio::test]
    async fn test_only_managed_sets_returned() {
        let store = InMemoryReferenceStore::new()
            .with_set("Managed UNIX Devices - Prod", "IP", &["10.0.0.1"])
            .with_set("Managed UNIX Devices - Old", "IP", &[])
            .with_set("Firewall Blocklist", "IP", &["1.2.3.4"])
            .with_set("Managed Windows Devices - Prod", "IP", &[]);

        let sets = fetch_managed_sets(&store, "Managed UNIX Devices - ")
            .await
            .unwrap();

        assert_eq!(
            sets.keys().collect::<Vec<_>>(),
            vec!["Managed UNIX Devices - Old", "Managed UNIX Devices - Prod"]
        );
        assert_eq!(sets["Managed UNIX Devices - Prod"].element_count(), 1);
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl ReferenceDataStore for BrokenStore {
        async fn list_sets(&self) -> bridge_traits::error::Result<Vec<ReferenceSet>> {
            Err(BridgeError::Decode("expected array".to_string()))
        }
        async fn create_set(&self, _name: &str) -> bridge_traits::error::Result<ReferenceSet> {
            unreachable!()
        }
        async fn bulk_load(
            &self,
            _name: &str,
            _values: &[String],
        ) -> bridge_traits::error::Result<ReferenceSet> {
            unreachable!()
        }
        async fn delete_set(
            &self,
            _name: &str,
            _purge_only: bool,
        ) -> bridge_traits::error::Result<bridge_traits::DeletionTask> {
            unreachable!()
        }
        async fn delete_task_status(
            &self,
            _task_id: i64,
        ) -> bridge_traits::error::Result<bridge_traits::DeletionTask> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_listing_failure() {
        let result = fetch_managed_sets(&BrokenStore, "Managed UNIX Devices - ").await;
        assert!(matches!(
            result,
            Err(SyncError::Listing(BridgeError::Decode(_)))
        ));
    }
}
