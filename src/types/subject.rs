// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::rbac;
use crate::error::{ProvisionError, Result};
use k8s_openapi::api::rbac::v1::{RoleRef, Subject};
use serde::{Deserialize, Serialize};

/// The identity a binding grants permissions to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum BindingSubject {
    User { name: String },
    /// `namespace` is where the service account lives, not where it is bound
    ServiceAccount { name: String, namespace: String },
}

impl BindingSubject {
    pub fn user(name: impl Into<String>) -> Self {
        BindingSubject::User { name: name.into() }
    }

    pub fn service_account(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        BindingSubject::ServiceAccount {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BindingSubject::User { name } | BindingSubject::ServiceAccount { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BindingSubject::User { .. } => rbac::USER_KIND,
            BindingSubject::ServiceAccount { .. } => rbac::SERVICE_ACCOUNT_KIND,
        }
    }

    /// RBAC subject entry for this identity
    pub fn to_subject(&self) -> Subject {
        match self {
            BindingSubject::User { name } => Subject {
                api_group: Some(rbac::API_GROUP.to_string()),
                kind: rbac::USER_KIND.to_string(),
                name: name.clone(),
                namespace: None,
            },
            BindingSubject::ServiceAccount { name, namespace } => Subject {
                api_group: None,
                kind: rbac::SERVICE_ACCOUNT_KIND.to_string(),
                name: name.clone(),
                namespace: Some(namespace.clone()),
            },
        }
    }
}

/// Name of the binding granting `cluster_role` to `username`
pub fn binding_name(username: &str, cluster_role: &str) -> String {
    format!("{}-{}", username, cluster_role)
}

/// Reference to a cluster-scoped role; used by namespaced bindings too
pub fn cluster_role_ref(cluster_role: &str) -> RoleRef {
    RoleRef {
        api_group: rbac::API_GROUP.to_string(),
        kind: rbac::CLUSTER_ROLE_KIND.to_string(),
        name: cluster_role.to_string(),
    }
}

/// A provisioning plan: who gets which cluster roles, and where.
///
/// An empty `namespaces` list binds cluster-wide.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BindingRequest {
    pub subject: BindingSubject,
    pub cluster_roles: Vec<String>,
    #[serde(default)]
    pub namespaces: Vec<String>,
}

impl BindingRequest {
    /// Parse a request document; JSON is a subset of YAML so both are accepted
    pub fn from_yaml(doc: &str) -> Result<Self> {
        let request: BindingRequest = serde_yaml::from_str(doc)
            .map_err(|e| ProvisionError::InvalidRequest(format!("Failed to parse: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.subject.name().is_empty() {
            return Err(ProvisionError::InvalidRequest(
                "subject name must not be empty".to_string(),
            ));
        }
        if let BindingSubject::ServiceAccount { namespace, .. } = &self.subject {
            if namespace.is_empty() {
                return Err(ProvisionError::InvalidRequest(format!(
                    "service account {} has no namespace",
                    self.subject.name()
                )));
            }
        }
        if self.cluster_roles.is_empty() {
            return Err(ProvisionError::InvalidRequest(
                "at least one cluster role is required".to_string(),
            ));
        }
        if let Some(empty) = self
            .cluster_roles
            .iter()
            .chain(self.namespaces.iter())
            .find(|s| s.is_empty())
        {
            return Err(ProvisionError::InvalidRequest(format!(
                "empty name in cluster roles or namespaces: {:?}",
                empty
            )));
        }
        Ok(())
    }
}
