//! Per-cluster client cache
//!
//! Owns the mapping from cluster code to `(configuration fingerprint, live
//! client)`. Freshness is pull-based: every access re-reads the registry
//! record and compares fingerprints, so there is no background refresh task
//! to manage. At most one live client exists per cluster, and a superseded
//! client is always closed before being dropped.

use crate::client::{K8sClient, K8sClientFactory};
use crate::registry::ClusterRegistry;
use armada_core::{extract_k8s_config, ArmadaResult, ClusterCode, K8sConfigFingerprint};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cached pairing of a cluster's last-used fingerprint and its client.
struct CacheEntry {
    fingerprint: K8sConfigFingerprint,
    client: Arc<dyn K8sClient>,
}

/// Cache of remote clients keyed by cluster code.
///
/// Explicitly constructed and owned; created at service start and torn down
/// with [`shutdown`](Self::shutdown) at service stop. All freshness checks
/// run synchronously on access. Callers that just persisted a configuration
/// change must call [`refresh`](Self::refresh) rather than rely on the
/// fingerprint check, which could race their own write.
pub struct K8sClientCache<R, F> {
    registry: Arc<R>,
    factory: Arc<F>,
    entries: DashMap<ClusterCode, CacheEntry>,
    /// Per-key rebuild locks. Entries are never removed: handing out a
    /// fresh mutex for a code while another task still holds the old one
    /// would allow two concurrent rebuilds of the same cluster.
    locks: DashMap<ClusterCode, Arc<Mutex<()>>>,
}

impl<R, F> K8sClientCache<R, F>
where
    R: ClusterRegistry,
    F: K8sClientFactory,
{
    /// Create an empty cache on top of a registry and a client factory.
    pub fn new(registry: Arc<R>, factory: Arc<F>) -> Self {
        Self {
            registry,
            factory,
            entries: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Get the client for a cluster, rebuilding it if the registry's
    /// configuration has drifted since the cached client was built.
    ///
    /// Returns `Ok(None)` when there is no cluster context (`code` is
    /// `None`), the cluster does not exist, or it carries no k8s
    /// configuration; none of those are errors. With `force_refresh` the
    /// client is rebuilt even when the fingerprint is unchanged.
    ///
    /// The decide-and-mutate sequence runs under a per-cluster lock, so
    /// concurrent callers for the same code serialize while other clusters
    /// proceed untouched.
    ///
    /// # Errors
    ///
    /// Propagates registry failures, and returns
    /// `K8sError::ClientBuildFailed` when the factory fails. A build
    /// failure never evicts the existing entry: the caller decides whether
    /// to keep operating with the stale client or fail its own operation.
    pub async fn get_client(
        &self,
        code: Option<ClusterCode>,
        force_refresh: bool,
    ) -> ArmadaResult<Option<Arc<dyn K8sClient>>> {
        let Some(code) = code else {
            return Ok(None);
        };

        let lock = self.key_lock(code);
        let _guard = lock.lock().await;

        let Some(cluster) = self.registry.query_by_cluster_code(code).await? else {
            // Cluster was deleted from the registry; drop its client too.
            if let Some((_, entry)) = self.entries.remove(&code) {
                tracing::info!(cluster_code = %code, "Evicting client for deleted cluster");
                entry.client.close().await;
            }
            return Ok(None);
        };

        let Some(fingerprint) = extract_k8s_config(&cluster.config) else {
            // No k8s configuration: a previously cached client is stale.
            if let Some((_, entry)) = self.entries.remove(&code) {
                tracing::info!(
                    cluster_code = %code,
                    "Cluster no longer carries a k8s config, disposing client"
                );
                entry.client.close().await;
            }
            return Ok(None);
        };

        if !force_refresh {
            if let Some(entry) = self.entries.get(&code) {
                if entry.fingerprint == fingerprint {
                    return Ok(Some(Arc::clone(&entry.client)));
                }
            }
        }

        // Build before touching the map, so a failure leaves the old
        // (possibly stale) entry untouched.
        let client = match self.factory.build(code, &fingerprint).await {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(cluster_code = %code, error = %e, "Failed to build k8s client");
                return Err(e);
            }
        };

        let replaced = self.entries.insert(
            code,
            CacheEntry {
                fingerprint,
                client: Arc::clone(&client),
            },
        );
        match replaced {
            Some(old) => {
                tracing::info!(cluster_code = %code, "Replaced k8s client after config change");
                old.client.close().await;
            }
            None => {
                tracing::info!(cluster_code = %code, "Built k8s client");
            }
        }

        Ok(Some(client))
    }

    /// Rebuild the client for a cluster unconditionally.
    ///
    /// Invalidation hook for the cluster-management service: called right
    /// after it persists a configuration change so the next access sees
    /// fresh state instead of racing the fingerprint check.
    pub async fn refresh(&self, code: ClusterCode) -> ArmadaResult<Option<Arc<dyn K8sClient>>> {
        self.get_client(Some(code), true).await
    }

    /// Evict and dispose the client for a cluster, if one is cached.
    ///
    /// Called when the cluster record is deleted. Returns whether an entry
    /// existed.
    pub async fn invalidate(&self, code: ClusterCode) -> bool {
        let lock = self.key_lock(code);
        let _guard = lock.lock().await;

        match self.entries.remove(&code) {
            Some((_, entry)) => {
                tracing::info!(cluster_code = %code, "Invalidated k8s client");
                entry.client.close().await;
                true
            }
            None => false,
        }
    }

    /// Build clients for every registered cluster that carries a k8s
    /// configuration. Intended for service start.
    ///
    /// Per-cluster build failures are logged and skipped; the count of
    /// successfully cached clusters is returned.
    ///
    /// # Errors
    ///
    /// Only a registry listing failure is fatal.
    pub async fn warm_up(&self) -> ArmadaResult<usize> {
        let clusters = self.registry.list_all().await?;
        let mut built = 0;
        for cluster in clusters {
            match self.get_client(Some(cluster.code), false).await {
                Ok(Some(_)) => built += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        cluster_code = %cluster.code,
                        error = %e,
                        "Skipping cluster during cache warm-up"
                    );
                }
            }
        }
        Ok(built)
    }

    /// Dispose every cached client and clear the cache.
    pub async fn shutdown(&self) {
        let codes: Vec<ClusterCode> = self.entries.iter().map(|entry| *entry.key()).collect();
        for code in codes {
            self.invalidate(code).await;
        }
        tracing::info!("K8s client cache shut down");
    }

    /// Number of live cached clients.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache holds no clients.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key_lock(&self, code: ClusterCode) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(code).or_default().value())
    }
}
