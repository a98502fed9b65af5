//! Minimal kubeconfig model
//!
//! Only the fields the HTTP client needs are modelled: the API server URL,
//! an optional bearer token, and the TLS-verify opt-out. Everything else in
//! the kubeconfig is ignored.

use armada_core::K8sError;
use serde::Deserialize;

/// A parsed kubeconfig, reduced to client-relevant fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Kubeconfig {
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
}

/// Entry in the kubeconfig `clusters` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedCluster {
    #[serde(default)]
    pub name: Option<String>,
    pub cluster: ClusterEndpoint,
}

/// Connection details for a cluster endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterEndpoint {
    pub server: String,
    #[serde(default, rename = "insecure-skip-tls-verify")]
    pub insecure_skip_tls_verify: bool,
}

/// Entry in the kubeconfig `users` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user: UserAuth,
}

/// Credentials for a kubeconfig user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserAuth {
    #[serde(default)]
    pub token: Option<String>,
}

impl Kubeconfig {
    /// Parse a kubeconfig YAML string.
    ///
    /// # Errors
    ///
    /// Returns `K8sError::InvalidKubeconfig` when the YAML is malformed,
    /// no cluster entry is present, or the server URL is blank.
    pub fn parse(yaml: &str) -> Result<Self, K8sError> {
        let config: Kubeconfig =
            serde_yaml::from_str(yaml).map_err(|e| K8sError::InvalidKubeconfig {
                reason: e.to_string(),
            })?;

        match config.clusters.first() {
            None => Err(K8sError::InvalidKubeconfig {
                reason: "no cluster entry".to_string(),
            }),
            Some(entry) if entry.cluster.server.trim().is_empty() => {
                Err(K8sError::InvalidKubeconfig {
                    reason: "cluster server URL is blank".to_string(),
                })
            }
            Some(_) => Ok(config),
        }
    }

    /// The API server URL of the first cluster entry.
    pub fn server(&self) -> &str {
        &self.clusters[0].cluster.server
    }

    /// The bearer token of the first user entry, if any.
    pub fn token(&self) -> Option<&str> {
        self.users.first().and_then(|u| u.user.token.as_deref())
    }

    /// Whether TLS verification is disabled for the first cluster entry.
    pub fn insecure_skip_tls_verify(&self) -> bool {
        self.clusters[0].cluster.insecure_skip_tls_verify
    }
}
