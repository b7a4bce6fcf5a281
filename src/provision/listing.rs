// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Listings used to validate caller input before provisioning.

use crate::error::{ProvisionError, Result};
use crate::kubernetes::ensure_namespace_exists;
use k8s_openapi::api::core::v1::ServiceAccount;
use k8s_openapi::api::rbac::v1::ClusterRole;
use kube::{api::ListParams, Api, Client, ResourceExt};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Names of the service accounts in `namespace`.
///
/// The namespace is created first when missing, so the result may be empty.
#[instrument(skip(client))]
pub async fn service_account_names(client: &Client, namespace: &str) -> Result<Vec<String>> {
    ensure_namespace_exists(client, namespace).await?;

    let accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), namespace);
    let list = accounts.list(&ListParams::default()).await?;
    debug!("Found {} service accounts in {}", list.items.len(), namespace);

    Ok(list.items.iter().map(|sa| sa.name_any()).collect())
}

/// Names of all cluster roles
#[instrument(skip(client))]
pub async fn cluster_role_names(client: &Client) -> Result<Vec<String>> {
    let roles: Api<ClusterRole> = Api::all(client.clone());
    let list = roles.list(&ListParams::default()).await?;
    debug!("Found {} cluster roles", list.items.len());

    Ok(list.items.iter().map(|r| r.name_any()).collect())
}

/// Fail with every requested role the cluster does not define
#[instrument(skip(client))]
pub async fn validate_cluster_roles(client: &Client, requested: &[String]) -> Result<()> {
    let known: HashSet<String> = cluster_role_names(client).await?.into_iter().collect();

    let unknown: Vec<String> = requested
        .iter()
        .filter(|r| !known.contains(*r))
        .cloned()
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ProvisionError::UnknownClusterRoles(unknown))
    }
}
