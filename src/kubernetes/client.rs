// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation

use crate::config::Config;
use crate::error::{ProvisionError, Result};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config as KConfig,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Create a client from the configured kubeconfig file, or the inferred environment
#[instrument(skip(config))]
pub async fn create_client(config: &Config) -> Result<Client> {
    match &config.kubeconfig_path {
        Some(path) => {
            info!("Loading kubeconfig from {}", path.display());
            let kubeconfig = tokio::fs::read_to_string(path).await.map_err(|e| {
                ProvisionError::KubeconfigError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))
            })?;
            create_client_from_kubeconfig(&kubeconfig, path).await
        }
        None => {
            let c = KConfig::infer().await.map_err(|e| {
                ProvisionError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?;
            debug!("Inferred cluster URL {}", c.cluster_url);
            Client::try_from(c).map_err(|e| {
                ProvisionError::KubeconfigError(format!("Failed to create client: {}", e))
            })
        }
    }
}

/// Create a Kubernetes client from a kubeconfig document
async fn create_client_from_kubeconfig(kubeconfig: &str, source: &Path) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig).map_err(|e| {
        ProvisionError::KubeconfigError(format!(
            "Failed to parse kubeconfig {}: {}",
            source.display(),
            e
        ))
    })?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                ProvisionError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| ProvisionError::KubeconfigError(format!("Failed to create client: {}", e)))
}
