//! K8s client trait, factory trait, and the reqwest-backed implementation
//!
//! The cache only depends on the traits. `close` is the dispose operation:
//! it must be idempotent, and a closed client must refuse further use.

use crate::kubeconfig::Kubeconfig;
use armada_core::{ArmadaError, ArmadaResult, ClusterCode, K8sError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A live handle to a cluster's control plane.
///
/// Implementations must be thread-safe (Send + Sync). Once `close` has been
/// called the handle stays closed forever; resources are released at most
/// once no matter how many times `close` runs.
#[async_trait]
pub trait K8sClient: Send + Sync + std::fmt::Debug {
    /// The API server URL this client talks to.
    fn server_url(&self) -> &str;

    /// Whether the client has been disposed.
    fn is_closed(&self) -> bool;

    /// Release the client's resources. Idempotent.
    async fn close(&self);
}

/// Builds a [`K8sClient`] from an extracted kubeconfig string.
///
/// Construction against an unreachable endpoint must be bounded by the
/// factory's own timeout configuration; the cache imposes none of its own.
#[async_trait]
pub trait K8sClientFactory: Send + Sync {
    /// Build a client for the given cluster.
    ///
    /// # Errors
    ///
    /// Returns `K8sError::ClientBuildFailed` when the kubeconfig is
    /// unusable or the client cannot be constructed.
    async fn build(
        &self,
        cluster_code: ClusterCode,
        kubeconfig: &str,
    ) -> ArmadaResult<Arc<dyn K8sClient>>;
}

/// Timeout configuration for the HTTP-backed client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for a k8s API server.
///
/// Wraps a pooled `reqwest::Client` configured from a kubeconfig. Closing
/// marks the handle as disposed; the underlying connection pool is torn
/// down when the last reference drops.
#[derive(Debug)]
pub struct HttpK8sClient {
    http: reqwest::Client,
    server_url: String,
    token: Option<String>,
    closed: AtomicBool,
}

impl HttpK8sClient {
    fn new(http: reqwest::Client, server_url: String, token: Option<String>) -> Self {
        Self {
            http,
            server_url,
            token,
            closed: AtomicBool::new(false),
        }
    }

    /// Perform a GET against the API server, returning the raw body.
    ///
    /// # Errors
    ///
    /// Returns `K8sError::ClientClosed` if the client has been disposed,
    /// or `K8sError::RequestFailed` on transport or non-2xx failures.
    pub async fn get_raw(&self, path: &str) -> ArmadaResult<String> {
        if self.is_closed() {
            return Err(ArmadaError::K8s(K8sError::ClientClosed {
                server: self.server_url.clone(),
            }));
        }

        let url = format!("{}{}", self.server_url, path);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            ArmadaError::K8s(K8sError::RequestFailed {
                server: self.server_url.clone(),
                reason: e.to_string(),
            })
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArmadaError::K8s(K8sError::RequestFailed {
                server: self.server_url.clone(),
                reason: format!("status {}", status),
            }));
        }

        response.text().await.map_err(|e| {
            ArmadaError::K8s(K8sError::RequestFailed {
                server: self.server_url.clone(),
                reason: e.to_string(),
            })
        })
    }
}

#[async_trait]
impl K8sClient for HttpK8sClient {
    fn server_url(&self) -> &str {
        &self.server_url
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Factory producing [`HttpK8sClient`] instances.
#[derive(Debug, Clone, Default)]
pub struct HttpK8sClientFactory {
    config: HttpClientConfig,
}

impl HttpK8sClientFactory {
    /// Create a factory with default timeouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with explicit timeouts.
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl K8sClientFactory for HttpK8sClientFactory {
    async fn build(
        &self,
        cluster_code: ClusterCode,
        kubeconfig: &str,
    ) -> ArmadaResult<Arc<dyn K8sClient>> {
        let parsed = Kubeconfig::parse(kubeconfig).map_err(|e| K8sError::ClientBuildFailed {
            cluster_code,
            reason: e.to_string(),
        })?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.request_timeout);
        if parsed.insecure_skip_tls_verify() {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(|e| K8sError::ClientBuildFailed {
            cluster_code,
            reason: e.to_string(),
        })?;

        let server_url = parsed.server().trim_end_matches('/').to_string();
        let token = parsed.token().map(|t| t.to_string());

        Ok(Arc::new(HttpK8sClient::new(http, server_url, token)))
    }
}
