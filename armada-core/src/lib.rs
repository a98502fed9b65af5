//! Armada Core - Cluster Data Types
//!
//! Pure data structures and the error taxonomy for the Armada cluster
//! client manager. No I/O and no async; every other crate depends on this.

pub mod cluster;
pub mod config;
pub mod error;

pub use cluster::{Cluster, ClusterCode, Timestamp};
pub use config::{extract_k8s_config, K8sConfigFingerprint};
pub use error::{ArmadaError, ArmadaResult, K8sError, RegistryError};
