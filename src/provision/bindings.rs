// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! RoleBinding and ClusterRoleBinding recreation.
//!
//! Bindings are replaced rather than patched: any existing object with the
//! target name is deleted before the new one is created. Nothing guards the
//! window between the two calls, so the same binding must not be provisioned
//! from two places at once.

use crate::error::{ProvisionError, Result};
use crate::kubernetes::ensure_namespace_exists;
use crate::types::subject::{binding_name, cluster_role_ref, BindingSubject};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleBinding};
use kube::{
    api::{DeleteParams, ObjectMeta, PostParams},
    Api, Client, Resource,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

/// A binding created by [`generate_bindings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionedBinding {
    Cluster { name: String },
    Namespaced { namespace: String, name: String },
}

impl fmt::Display for ProvisionedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionedBinding::Cluster { name } => write!(f, "clusterrolebinding/{}", name),
            ProvisionedBinding::Namespaced { namespace, name } => {
                write!(f, "rolebinding/{} in {}", name, namespace)
            }
        }
    }
}

pub fn new_role_binding(
    name: &str,
    namespace: &str,
    subject: &BindingSubject,
    cluster_role: &str,
) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        subjects: Some(vec![subject.to_subject()]),
        role_ref: cluster_role_ref(cluster_role),
    }
}

pub fn new_cluster_role_binding(
    name: &str,
    subject: &BindingSubject,
    cluster_role: &str,
) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        subjects: Some(vec![subject.to_subject()]),
        role_ref: cluster_role_ref(cluster_role),
    }
}

/// Delete `name` if present, then create `object` in its place
async fn recreate<K>(api: &Api<K>, name: &str, object: &K) -> Result<K>
where
    K: Resource + Clone + DeserializeOwned + Serialize + fmt::Debug,
    K::DynamicType: Default,
{
    if api.get_opt(name).await?.is_some() {
        debug!("Deleting existing {} {}", K::kind(&Default::default()), name);
        api.delete(name, &DeleteParams::default()).await?;
    }

    Ok(api.create(&PostParams::default(), object).await?)
}

/// Replace the namespaced binding `name` with one granting `cluster_role` to `subject`
#[instrument(skip(client, subject), fields(subject = %subject.name()))]
pub async fn recreate_role_binding(
    client: &Client,
    namespace: &str,
    name: &str,
    subject: &BindingSubject,
    cluster_role: &str,
) -> Result<RoleBinding> {
    let api: Api<RoleBinding> = Api::namespaced(client.clone(), namespace);
    let binding = new_role_binding(name, namespace, subject, cluster_role);
    recreate(&api, name, &binding).await
}

/// Replace the cluster-wide binding `name` with one granting `cluster_role` to `subject`
#[instrument(skip(client, subject), fields(subject = %subject.name()))]
pub async fn recreate_cluster_role_binding(
    client: &Client,
    name: &str,
    subject: &BindingSubject,
    cluster_role: &str,
) -> Result<ClusterRoleBinding> {
    let api: Api<ClusterRoleBinding> = Api::all(client.clone());
    let binding = new_cluster_role_binding(name, subject, cluster_role);
    recreate(&api, name, &binding).await
}

/// Grant each of `cluster_roles` to `subject`.
///
/// Without namespaces one ClusterRoleBinding per role is created. Otherwise
/// every namespace is ensured first and receives one RoleBinding per role.
/// Input order is preserved and the first failure stops the run; bindings
/// already created stay in place.
#[instrument(skip(client, subject, cluster_roles, namespaces), fields(subject = %subject.name()))]
pub async fn generate_bindings(
    client: &Client,
    subject: &BindingSubject,
    cluster_roles: &[String],
    namespaces: &[String],
) -> Result<Vec<ProvisionedBinding>> {
    let username = subject.name();
    let mut created = Vec::with_capacity(cluster_roles.len() * namespaces.len().max(1));

    if namespaces.is_empty() {
        for cluster_role in cluster_roles {
            let name = binding_name(username, cluster_role);
            recreate_cluster_role_binding(client, &name, subject, cluster_role)
                .await
                .map_err(|e| ProvisionError::ClusterRoleBindingFailed {
                    name: name.clone(),
                    username: username.to_string(),
                    source: Box::new(e),
                })?;
            info!("Created cluster role binding {}", name);
            created.push(ProvisionedBinding::Cluster { name });
        }
        return Ok(created);
    }

    for namespace in namespaces {
        ensure_namespace_exists(client, namespace)
            .await
            .map_err(|e| ProvisionError::NamespaceEnsureFailed {
                namespace: namespace.clone(),
                username: username.to_string(),
                source: Box::new(e),
            })?;

        for cluster_role in cluster_roles {
            let name = binding_name(username, cluster_role);
            recreate_role_binding(client, namespace, &name, subject, cluster_role)
                .await
                .map_err(|e| ProvisionError::RoleBindingFailed {
                    name: name.clone(),
                    namespace: namespace.clone(),
                    username: username.to_string(),
                    source: Box::new(e),
                })?;
            info!("Created role binding {} in namespace {}", name, namespace);
            created.push(ProvisionedBinding::Namespaced {
                namespace: namespace.clone(),
                name,
            });
        }
    }

    Ok(created)
}
