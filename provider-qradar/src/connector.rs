//! QRadar reference data API connector
//!
//! Implements the `ReferenceDataStore` trait on top of `/api/reference_data`.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::reference_data::{
    DeletionTask, ReferenceDataStore, ReferenceSet, IP_ELEMENT_TYPE,
};
use core_runtime::config::DEFAULT_API_VERSION;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{QRadarError, Result};

const SETS_PATH: &str = "/api/reference_data/sets";
const DELETE_TASKS_PATH: &str = "/api/reference_data/set_delete_tasks";

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_ACCEPTED: u16 = 202;

/// QRadar reference data connector
///
/// Every request carries the `Version`, `SEC` and `Accept` headers. Set names
/// are percent-encoded wherever they appear in a path or query string.
///
/// # Example
///
/// ```ignore
/// use provider_qradar::QRadarConnector;
/// use bridge_traits::ReferenceDataStore;
///
/// let connector = QRadarConnector::new(http_client, "https://qradar.example.com", token);
/// let sets = connector.list_sets().await?;
/// ```
pub struct QRadarConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Console base URL without trailing slash
    base_url: String,

    /// Authorized service token
    sec_token: String,

    api_version: String,
}

impl QRadarConnector {
    /// Create a new connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - Console base URL, e.g. `https://qradar.example.com`
    /// * `sec_token` - Authorized service token
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        sec_token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
            sec_token: sec_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Override the `Version` header value.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn set_path(&self, name: &str) -> String {
        format!("{}{}/{}", self.base_url, SETS_PATH, urlencoding::encode(name))
    }

    /// Request with the headers every endpoint requires.
    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("Version", self.api_version.as_str())
            .header("SEC", self.sec_token.as_str())
            .header("Accept", "application/json")
    }

    /// Send a request and insist on the one status the endpoint documents.
    async fn send(&self, request: HttpRequest, expected: u16) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();

        let response = self.http_client.execute(request).await?;
        let response = response.expect_status(expected).map_err(|e| {
            warn!(method = %method, url = %url, expected, error = %e, "Unexpected API response");
            e
        })?;

        debug!(method = %method, url = %url, status = response.status, "API request succeeded");
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse, what: &str) -> Result<T> {
        response
            .json()
            .map_err(|e| QRadarError::ParseError(format!("{}: {}", what, e)))
    }

    async fn fetch_sets(&self) -> Result<Vec<ReferenceSet>> {
        let url = format!("{}{}", self.base_url, SETS_PATH);
        let response = self.send(self.request(HttpMethod::Get, url), STATUS_OK).await?;
        Self::decode(&response, "reference set list")
    }

    async fn post_create(&self, name: &str) -> Result<ReferenceSet> {
        let url = format!(
            "{}{}?name={}&element_type={}",
            self.base_url,
            SETS_PATH,
            urlencoding::encode(name),
            IP_ELEMENT_TYPE
        );
        let response = self
            .send(self.request(HttpMethod::Post, url), STATUS_CREATED)
            .await?;
        Self::decode(&response, "created reference set")
    }

    async fn post_bulk_load(&self, name: &str, values: &[String]) -> Result<ReferenceSet> {
        let url = format!(
            "{}{}/bulk_load/{}",
            self.base_url,
            SETS_PATH,
            urlencoding::encode(name)
        );
        let request = self.request(HttpMethod::Post, url).json(values)?;

        let response = self.send(request, STATUS_OK).await?;
        Self::decode(&response, "bulk load result")
    }

    async fn start_delete(&self, name: &str, purge_only: bool) -> Result<DeletionTask> {
        let url = format!("{}?purge_only={}", self.set_path(name), purge_only);
        let response = self
            .send(self.request(HttpMethod::Delete, url), STATUS_ACCEPTED)
            .await?;
        Self::decode(&response, "delete task")
    }

    async fn fetch_task(&self, task_id: i64) -> Result<DeletionTask> {
        let url = format!("{}{}/{}", self.base_url, DELETE_TASKS_PATH, task_id);
        let response = self.send(self.request(HttpMethod::Get, url), STATUS_OK).await?;
        Self::decode(&response, "delete task status")
    }
}

#[async_trait]
impl ReferenceDataStore for QRadarConnector {
    #[instrument(skip(self))]
    async fn list_sets(&self) -> BridgeResult<Vec<ReferenceSet>> {
        let sets = self.fetch_sets().await?;
        info!(count = sets.len(), "Listed reference sets");
        Ok(sets)
    }

    #[instrument(skip(self), fields(set_name = %name))]
    async fn create_set(&self, name: &str) -> BridgeResult<ReferenceSet> {
        let set = self.post_create(name).await?;
        info!("Created reference set");
        Ok(set)
    }

    #[instrument(skip(self, values), fields(set_name = %name, values = values.len()))]
    async fn bulk_load(&self, name: &str, values: &[String]) -> BridgeResult<ReferenceSet> {
        let set = self.post_bulk_load(name, values).await?;
        info!(elements = set.element_count(), "Bulk loaded reference set");
        Ok(set)
    }

    #[instrument(skip(self), fields(set_name = %name))]
    async fn delete_set(&self, name: &str, purge_only: bool) -> BridgeResult<DeletionTask> {
        let task = self.start_delete(name, purge_only).await?;
        debug!(task_id = task.id, status = %task.status, "Delete task started");
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn delete_task_status(&self, task_id: i64) -> BridgeResult<DeletionTask> {
        Ok(self.fetch_task(task_id).await?)
    }
}
