//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport settings for [`ReqwestHttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Upper bound for a whole request, including reading the body
    pub request_timeout: Duration,
    /// Upper bound for TCP connect plus TLS handshake
    pub connect_timeout: Duration,
    /// Skip server certificate validation
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(3),
            accept_invalid_certs: false,
            user_agent: concat!("refset-sync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest, shared by all clones of the inner client
/// - Per-client connect and request timeouts, overridable per request
/// - rustls TLS; certificate validation can only be disabled explicitly
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_options(HttpClientOptions::default())
    }

    /// Create a new HTTP client with custom transport settings
    pub fn with_options(options: HttpClientOptions) -> Result<Self> {
        if options.accept_invalid_certs {
            warn!("TLS certificate validation is disabled for all API requests");
        }

        let client = Client::builder()
            .timeout(options.request_timeout)
            .connect_timeout(options.connect_timeout)
            .pool_max_idle_per_host(10)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .user_agent(options.user_agent)
            .build()
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn convert_error(error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::Timeout(error.to_string())
        } else if error.is_connect() {
            BridgeError::Connection(error.to_string())
        } else {
            BridgeError::OperationFailed(error.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        debug!(method = %method, url = %url, "Executing HTTP request");

        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| {
                warn!(method = %method, url = %url, error = %e, "HTTP request failed");
                Self::convert_error(e)
            })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response.bytes().await.map_err(Self::convert_error)?;

        debug!(
            method = %method,
            url = %url,
            status = status,
            bytes = body.len(),
            "HTTP response received"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned response and hand back the raw request text.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut received = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                if n == 0 || received.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_http_client_creation() {
        assert!(ReqwestHttpClient::new().is_ok());

        let insecure = HttpClientOptions {
            accept_invalid_certs: true,
            ..HttpClientOptions::default()
        };
        assert!(ReqwestHttpClient::with_options(insecure).is_ok());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Delete),
            reqwest::Method::DELETE
        );
    }

    #[test]
    fn test_default_options() {
        let options = HttpClientOptions::default();
        assert_eq!(options.request_timeout, Duration::from_secs(30));
        assert_eq!(options.connect_timeout, Duration::from_secs(3));
        assert!(!options.accept_invalid_certs);
    }

    #[tokio::test]
    async fn test_execute_returns_non_success_status() {
        let (base, server) = serve_once("202 Accepted", r#"{"id":7,"status":"QUEUED"}"#).await;
        let client = ReqwestHttpClient::new().unwrap();

        let request = HttpRequest::new(HttpMethod::Delete, format!("{}/sets/a?purge_only=true", base))
            .header("SEC", "token-value");
        let response = client.execute(request).await.unwrap();

        assert_eq!(response.status, 202);
        assert_eq!(response.text_lossy(), r#"{"id":7,"status":"QUEUED"}"#);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("DELETE /sets/a?purge_only=true HTTP/1.1"));
        assert!(raw.to_lowercase().contains("sec: token-value"));
    }

    #[tokio::test]
    async fn test_execute_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = ReqwestHttpClient::new().unwrap();
        let request = HttpRequest::new(HttpMethod::Get, format!("http://{}/slow", addr))
            .timeout(Duration::from_millis(200));

        let error = client.execute(request).await.unwrap_err();
        assert!(matches!(error, BridgeError::Timeout(_)), "got {:?}", error);
    }
}
