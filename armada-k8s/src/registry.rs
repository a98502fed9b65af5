//! Cluster registry collaborator
//!
//! The registry is the authoritative store of cluster records. The cache
//! only ever reads it; creation, mutation, and deletion of clusters are
//! owned by the surrounding cluster-management service.

use armada_core::{ArmadaResult, Cluster, ClusterCode, RegistryError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Read-only view of the cluster registry.
///
/// Implementations must be thread-safe (Send + Sync). Reads may hit slow
/// I/O; callers are expected to tolerate blocking.
#[async_trait]
pub trait ClusterRegistry: Send + Sync {
    /// Look up a cluster by its stable code.
    async fn query_by_cluster_code(&self, code: ClusterCode) -> ArmadaResult<Option<Cluster>>;

    /// Look up a cluster by its (mutable) name.
    ///
    /// Used by callers outside the client cache; the cache itself keys
    /// exclusively on the code.
    async fn query_by_cluster_name(&self, name: &str) -> ArmadaResult<Option<Cluster>>;

    /// List every registered cluster.
    async fn list_all(&self) -> ArmadaResult<Vec<Cluster>>;
}

/// In-memory cluster registry.
///
/// Backs tests and single-process deployments. Mutation methods model what
/// the external cluster-management service does to the authoritative store.
#[derive(Debug, Default)]
pub struct InMemoryClusterRegistry {
    clusters: RwLock<HashMap<ClusterCode, Cluster>>,
}

impl InMemoryClusterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cluster record.
    pub fn insert(&self, cluster: Cluster) -> ArmadaResult<()> {
        let mut clusters = self
            .clusters
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        clusters.insert(cluster.code, cluster);
        Ok(())
    }

    /// Replace the config blob of an existing cluster, bumping `updated_at`.
    ///
    /// Returns `false` if no cluster with that code exists.
    pub fn update_config(&self, code: ClusterCode, config: impl Into<String>) -> ArmadaResult<bool> {
        let mut clusters = self
            .clusters
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        match clusters.get_mut(&code) {
            Some(cluster) => {
                cluster.config = config.into();
                cluster.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete a cluster record. Returns `false` if it did not exist.
    pub fn remove(&self, code: ClusterCode) -> ArmadaResult<bool> {
        let mut clusters = self
            .clusters
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(clusters.remove(&code).is_some())
    }

    /// Number of registered clusters.
    pub fn len(&self) -> usize {
        self.clusters.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClusterRegistry for InMemoryClusterRegistry {
    async fn query_by_cluster_code(&self, code: ClusterCode) -> ArmadaResult<Option<Cluster>> {
        let clusters = self
            .clusters
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(clusters.get(&code).cloned())
    }

    async fn query_by_cluster_name(&self, name: &str) -> ArmadaResult<Option<Cluster>> {
        let clusters = self
            .clusters
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(clusters.values().find(|c| c.name == name).cloned())
    }

    async fn list_all(&self) -> ArmadaResult<Vec<Cluster>> {
        let clusters = self
            .clusters
            .read()
            .map_err(|_| RegistryError::LockPoisoned)?;
        Ok(clusters.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_cluster(code: i64, name: &str, config: &str) -> Cluster {
        let now = Utc::now();
        Cluster {
            code: ClusterCode::new(code),
            name: name.to_string(),
            config: config.to_string(),
            description: Some("test cluster".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_query_by_code() {
        let registry = InMemoryClusterRegistry::new();
        registry
            .insert(make_cluster(1, "alpha", r#"{"k8s": "a"}"#))
            .unwrap();

        let found = registry
            .query_by_cluster_code(ClusterCode::new(1))
            .await
            .unwrap();
        assert_eq!(found.unwrap().name, "alpha");

        let missing = registry
            .query_by_cluster_code(ClusterCode::new(2))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_query_by_name() {
        let registry = InMemoryClusterRegistry::new();
        registry
            .insert(make_cluster(1, "alpha", r#"{"k8s": "a"}"#))
            .unwrap();
        registry
            .insert(make_cluster(2, "beta", r#"{"k8s": "b"}"#))
            .unwrap();

        let found = registry.query_by_cluster_name("beta").await.unwrap();
        assert_eq!(found.unwrap().code, ClusterCode::new(2));

        assert!(registry
            .query_by_cluster_name("gamma")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_config_bumps_updated_at() {
        let registry = InMemoryClusterRegistry::new();
        registry
            .insert(make_cluster(1, "alpha", r#"{"k8s": "a"}"#))
            .unwrap();
        let before = registry
            .query_by_cluster_code(ClusterCode::new(1))
            .await
            .unwrap()
            .unwrap();

        assert!(registry
            .update_config(ClusterCode::new(1), r#"{"k8s": "b"}"#)
            .unwrap());
        let after = registry
            .query_by_cluster_code(ClusterCode::new(1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after.k8s_config().as_deref(), Some("b"));
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_update_config_unknown_cluster() {
        let registry = InMemoryClusterRegistry::new();
        assert!(!registry
            .update_config(ClusterCode::new(9), r#"{"k8s": "x"}"#)
            .unwrap());
    }

    #[tokio::test]
    async fn test_remove_and_list() {
        let registry = InMemoryClusterRegistry::new();
        registry
            .insert(make_cluster(1, "alpha", r#"{"k8s": "a"}"#))
            .unwrap();
        registry
            .insert(make_cluster(2, "beta", r#"{"k8s": "b"}"#))
            .unwrap();
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(ClusterCode::new(1)).unwrap());
        assert!(!registry.remove(ClusterCode::new(1)).unwrap());

        let remaining = registry.list_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].code, ClusterCode::new(2));
    }
}
