//! Core service façade and bootstrap helpers.
//!
//! This crate wires the desktop bridge (reqwest `HttpClient`) and the QRadar
//! connector into the sync engine and runs one reconciliation pass:
//!
//! 1. extract desired groups from the inventory file
//! 2. list the managed remote sets
//! 3. plan, then either log the plan (dry run) or execute it
//!
//! Pre-flight failures (configuration, inventory, listing) abort before any
//! remote mutation. Unit failures are aggregated and surface as
//! [`CoreError::PartialFailure`] once every unit has been joined.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_desktop::{HttpClientOptions, ReqwestHttpClient};
use bridge_traits::{HttpClient, ReferenceDataStore};
use core_async::sync::CancellationToken;
use core_runtime::logging::strip_path;
use core_runtime::AppConfig;
use core_sync::{
    extract_groups, fetch_managed_sets, Reconciler, SyncPlan, SyncReport,
};
use provider_qradar::QRadarConnector;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Aggregated handle to the bridge dependencies the sync engine requires.
pub struct CoreDependencies {
    pub store: Arc<dyn ReferenceDataStore>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from an explicit store handle.
    pub fn new(store: Arc<dyn ReferenceDataStore>) -> Self {
        Self { store }
    }

    /// Native wiring: pooled reqwest client behind the QRadar connector.
    pub fn desktop(config: &AppConfig) -> Result<Self> {
        let options = HttpClientOptions {
            request_timeout: config.http.request_timeout,
            connect_timeout: config.http.connect_timeout,
            accept_invalid_certs: config.http.accept_invalid_certs,
            ..HttpClientOptions::default()
        };
        let http_client: Arc<dyn HttpClient> = Arc::new(
            ReqwestHttpClient::with_options(options)
                .map_err(|e| CoreError::Runtime(e.to_string()))?,
        );

        let connector = QRadarConnector::new(
            http_client,
            config.base_url.as_str(),
            config.sec_token.as_str(),
        )
        .with_api_version(config.api_version.as_str());

        Ok(Self::new(Arc::new(connector)))
    }
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub plan: SyncPlan,
    /// `None` for dry runs
    pub report: Option<SyncReport>,
}

/// Primary façade exposed to the command line.
#[derive(Clone)]
pub struct SyncService {
    config: AppConfig,
    deps: Arc<CoreDependencies>,
}

impl SyncService {
    /// Create a service talking to the configured console.
    pub fn new(config: AppConfig) -> Result<Self> {
        let deps = CoreDependencies::desktop(&config)?;
        Ok(Self::with_dependencies(config, deps))
    }

    pub fn with_dependencies(config: AppConfig, deps: CoreDependencies) -> Self {
        Self {
            config,
            deps: Arc::new(deps),
        }
    }

    /// Create a service over any store implementation.
    pub fn with_store(config: AppConfig, store: Arc<dyn ReferenceDataStore>) -> Self {
        Self::with_dependencies(config, CoreDependencies::new(store))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    /// Run one reconciliation pass.
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_with_token(CancellationToken::new()).await
    }

    /// Run one reconciliation pass; units stop early once `token` is
    /// cancelled and are reported as cancelled.
    pub async fn run_with_token(&self, token: CancellationToken) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("sync_run", run_id = %run_id, dry_run = self.config.dry_run);
        self.run_inner(run_id, token).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, token: CancellationToken) -> Result<RunSummary> {
        let config = &self.config;
        info!(
            base_url = %config.base_url,
            input = %strip_path(&config.input_path.to_string_lossy()),
            api_version = %config.api_version,
            policy = ?config.failure_policy,
            "Starting reference set sync"
        );

        let naming = config.naming.clone();

        let input_path = config.input_path.clone();
        let extract_naming = naming.clone();
        let desired = core_async::task::spawn_blocking(move || {
            extract_groups(&input_path, &extract_naming)
        })
        .await
        .map_err(|e| CoreError::Runtime(format!("Inventory reader task failed: {}", e)))??;

        let remote = fetch_managed_sets(self.deps.store.as_ref(), &naming.prefix).await?;

        let plan = Reconciler::plan(&desired, &remote);

        if config.dry_run {
            plan.log_actions();
            info!("Dry run, no changes applied");
            return Ok(RunSummary {
                run_id,
                plan,
                report: None,
            });
        }

        let reconciler = Reconciler::new(
            Arc::clone(&self.deps.store),
            config.poll,
            config.failure_policy,
        );

        let report = reconciler.execute_with_token(plan.clone(), token).await;
        report.log_summary();

        if !report.is_success() {
            return Err(CoreError::PartialFailure {
                failed: report.failed(),
                cancelled: report.cancelled.len(),
            });
        }

        Ok(RunSummary {
            run_id,
            plan,
            report: Some(report),
        })
    }
}
