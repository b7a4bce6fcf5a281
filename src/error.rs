// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Namespace lookup failed: {0}")]
    NamespaceError(String),

    #[error("Failed to create namespace {namespace} for {username}: {source}")]
    NamespaceEnsureFailed {
        namespace: String,
        username: String,
        #[source]
        source: Box<ProvisionError>,
    },

    #[error("Failed to create cluster role binding {name} for {username}: {source}")]
    ClusterRoleBindingFailed {
        name: String,
        username: String,
        #[source]
        source: Box<ProvisionError>,
    },

    #[error(
        "Failed to create role binding {name} in namespace {namespace} for {username}: {source}"
    )]
    RoleBindingFailed {
        name: String,
        namespace: String,
        username: String,
        #[source]
        source: Box<ProvisionError>,
    },

    #[error("Timed out waiting for CSR {name} to be approved after {attempts} attempts")]
    CsrTimeout { name: String, attempts: u32 },

    #[error("Unknown cluster roles: {}", .0.join(", "))]
    UnknownClusterRoles(Vec<String>),

    #[error("Failed to encode request body: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid binding request: {0}")]
    InvalidRequest(String),
}

impl ProvisionError {
    /// True when the underlying API call answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProvisionError::KubeError(e) if is_not_found(e))
    }
}

/// True when a kube error is the API server's "not found" answer
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
