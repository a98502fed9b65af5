//! Error types for Armada operations
//!
//! An absent cluster or an absent k8s configuration is NOT an error: those
//! states are modelled as `Ok(None)` at the cache boundary. Errors here are
//! genuine failures only.

use crate::ClusterCode;
use thiserror::Error;

/// K8s client errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum K8sError {
    #[error("Failed to build k8s client for cluster {cluster_code}: {reason}")]
    ClientBuildFailed {
        cluster_code: ClusterCode,
        reason: String,
    },

    #[error("Invalid kubeconfig: {reason}")]
    InvalidKubeconfig { reason: String },

    #[error("Request to {server} failed: {reason}")]
    RequestFailed { server: String, reason: String },

    #[error("Client for {server} is closed")]
    ClientClosed { server: String },
}

/// Cluster registry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Cluster registry query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Registry lock poisoned")]
    LockPoisoned,
}

/// Master error type for all Armada errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArmadaError {
    #[error("K8s error: {0}")]
    K8s(#[from] K8sError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type alias for Armada operations.
pub type ArmadaResult<T> = Result<T, ArmadaError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k8s_error_display_client_build_failed() {
        let err = K8sError::ClientBuildFailed {
            cluster_code: ClusterCode::new(42),
            reason: "endpoint unreachable".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Failed to build k8s client"));
        assert!(msg.contains("42"));
        assert!(msg.contains("endpoint unreachable"));
    }

    #[test]
    fn test_k8s_error_display_invalid_kubeconfig() {
        let err = K8sError::InvalidKubeconfig {
            reason: "missing server".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid kubeconfig"));
        assert!(msg.contains("missing server"));
    }

    #[test]
    fn test_k8s_error_display_client_closed() {
        let err = K8sError::ClientClosed {
            server: "https://k8s.internal:6443".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("is closed"));
        assert!(msg.contains("https://k8s.internal:6443"));
    }

    #[test]
    fn test_registry_error_display_query_failed() {
        let err = RegistryError::QueryFailed {
            reason: "connection reset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("query failed"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_armada_error_from_variants() {
        let k8s = ArmadaError::from(K8sError::InvalidKubeconfig {
            reason: "empty".to_string(),
        });
        assert!(matches!(k8s, ArmadaError::K8s(_)));

        let registry = ArmadaError::from(RegistryError::LockPoisoned);
        assert!(matches!(registry, ArmadaError::Registry(_)));
    }
}
