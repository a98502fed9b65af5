//! Armada K8s - Per-Cluster Client Management
//!
//! Owns the mapping from cluster code to live remote API client. The cache
//! rebuilds a cluster's client lazily whenever the registry's configuration
//! fingerprint drifts from the one the cached client was built with, and
//! disposes superseded clients exactly once.
//!
//! Collaborators are traits: [`ClusterRegistry`] is the authoritative store
//! of cluster records and [`K8sClientFactory`] turns an extracted kubeconfig
//! into a live [`K8sClient`]. Mock implementations live in [`mock`].

pub mod cache;
pub mod client;
pub mod kubeconfig;
pub mod mock;
pub mod registry;

pub use cache::K8sClientCache;
pub use client::{HttpClientConfig, HttpK8sClient, HttpK8sClientFactory, K8sClient, K8sClientFactory};
pub use kubeconfig::Kubeconfig;
pub use mock::{MockK8sClient, MockK8sClientFactory};
pub use registry::{ClusterRegistry, InMemoryClusterRegistry};
