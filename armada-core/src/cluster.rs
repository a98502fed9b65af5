//! Cluster identity and record types
//!
//! A cluster is a registered external compute target (e.g., a Kubernetes
//! control plane) reachable via a remote API. Cluster records are owned and
//! mutated exclusively by the registry; this crate only models them.

use crate::config::extract_k8s_config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Stable cluster identifier.
///
/// Codes are opaque 64-bit integers assigned by the registry and never
/// reused across distinct clusters. Cluster *names* are mutable and must
/// never be used as a cache key; the code is the only stable handle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClusterCode(i64);

impl ClusterCode {
    /// Wrap a raw registry-assigned code.
    pub fn new(code: i64) -> Self {
        Self(code)
    }

    /// Get the raw code value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ClusterCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}

impl fmt::Display for ClusterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cluster record as stored in the registry.
///
/// The `config` field is an opaque JSON blob; the remote-client-relevant
/// sub-configuration is extracted from it via [`extract_k8s_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Stable identifier, the only valid cache key.
    pub code: ClusterCode,
    /// Human-readable name. Mutable; never key anything on it.
    pub name: String,
    /// Opaque configuration blob (JSON).
    pub config: String,
    /// Optional free-form description.
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cluster {
    /// Extract the k8s sub-configuration from this cluster's config blob.
    ///
    /// Returns `None` when the cluster carries no remote-client
    /// configuration.
    pub fn k8s_config(&self) -> Option<String> {
        extract_k8s_config(&self.config)
    }
}
