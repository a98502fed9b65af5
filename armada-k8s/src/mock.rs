//! Mock client and factory for testing
//!
//! The mock factory records every client it builds so tests can assert on
//! build counts and on how often each superseded client was closed.

use crate::client::{K8sClient, K8sClientFactory};
use armada_core::{ArmadaResult, ClusterCode, K8sError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock k8s client tracking close calls.
#[derive(Debug)]
pub struct MockK8sClient {
    server_url: String,
    fingerprint: String,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl MockK8sClient {
    fn new(cluster_code: ClusterCode, fingerprint: &str) -> Self {
        Self {
            server_url: format!("mock://{}", cluster_code),
            fingerprint: fingerprint.to_string(),
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// The kubeconfig string this client was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// How many times `close` has been invoked.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl K8sClient for MockK8sClient {
    fn server_url(&self) -> &str {
        &self.server_url
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Mock factory with injectable build failures and latency.
#[derive(Debug, Default)]
pub struct MockK8sClientFactory {
    build_count: AtomicUsize,
    fail_builds: AtomicBool,
    build_delay: Mutex<Option<Duration>>,
    built: Mutex<Vec<Arc<MockK8sClient>>>,
}

impl MockK8sClientFactory {
    /// Create a factory that always succeeds instantly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of successful builds.
    pub fn build_count(&self) -> usize {
        self.build_count.load(Ordering::SeqCst)
    }

    /// Make every subsequent build fail (or succeed again).
    pub fn set_fail_builds(&self, fail: bool) {
        self.fail_builds.store(fail, Ordering::SeqCst);
    }

    /// Inject latency into every build, to widen race windows in tests.
    pub fn set_build_delay(&self, delay: Option<Duration>) {
        *self.build_delay.lock().unwrap() = delay;
    }

    /// All clients built so far, in build order.
    pub fn built_clients(&self) -> Vec<Arc<MockK8sClient>> {
        self.built.lock().unwrap().clone()
    }
}

#[async_trait]
impl K8sClientFactory for MockK8sClientFactory {
    async fn build(
        &self,
        cluster_code: ClusterCode,
        kubeconfig: &str,
    ) -> ArmadaResult<Arc<dyn K8sClient>> {
        let delay = *self.build_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_builds.load(Ordering::SeqCst) {
            return Err(K8sError::ClientBuildFailed {
                cluster_code,
                reason: "injected build failure".to_string(),
            }
            .into());
        }

        self.build_count.fetch_add(1, Ordering::SeqCst);
        let client = Arc::new(MockK8sClient::new(cluster_code, kubeconfig));
        self.built.lock().unwrap().push(Arc::clone(&client));
        Ok(client)
    }
}
