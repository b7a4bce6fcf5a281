// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Binding and certificate provisioning against a single cluster client.

pub mod bindings;
pub mod csr;
pub mod listing;

pub use bindings::{generate_bindings, ProvisionedBinding};
pub use csr::{approve_csr, recreate_csr, signed_certificate, wait_for_csr_ready};
pub use listing::{cluster_role_names, service_account_names, validate_cluster_roles};

use crate::config::CsrWaitPolicy;
use crate::error::Result;
use crate::kubernetes::ensure_namespace_exists;
use crate::types::{BindingRequest, BindingSubject};
use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use kube::Client;

/// Entry point for provisioning users; holds the client every call goes through.
///
/// Calls are sequential delete-then-create sequences with no locking, so a
/// given binding or CSR name should only be provisioned by one caller at a time.
#[derive(Clone)]
pub struct Provisioner {
    client: Client,
    csr_wait: CsrWaitPolicy,
}

impl Provisioner {
    pub fn new(client: Client) -> Self {
        Self::with_policy(client, CsrWaitPolicy::default())
    }

    pub fn with_policy(client: Client, csr_wait: CsrWaitPolicy) -> Self {
        Self { client, csr_wait }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn ensure_namespace(&self, namespace: &str) -> Result<()> {
        ensure_namespace_exists(&self.client, namespace).await
    }

    pub async fn generate_bindings(
        &self,
        subject: &BindingSubject,
        cluster_roles: &[String],
        namespaces: &[String],
    ) -> Result<Vec<ProvisionedBinding>> {
        generate_bindings(&self.client, subject, cluster_roles, namespaces).await
    }

    /// Validate and apply a request document
    pub async fn apply(&self, request: &BindingRequest) -> Result<Vec<ProvisionedBinding>> {
        request.validate()?;
        self.generate_bindings(&request.subject, &request.cluster_roles, &request.namespaces)
            .await
    }

    pub async fn submit_csr(
        &self,
        cn: &str,
        request_pem: &str,
    ) -> Result<CertificateSigningRequest> {
        recreate_csr(&self.client, cn, request_pem).await
    }

    pub async fn approve_csr(&self, name: &str) -> Result<CertificateSigningRequest> {
        approve_csr(&self.client, name).await
    }

    pub async fn wait_for_csr(&self, name: &str) -> Result<CertificateSigningRequest> {
        wait_for_csr_ready(&self.client, name, self.csr_wait).await
    }

    /// Submit, approve and wait for a CSR, returning the issued certificate
    pub async fn issue_certificate(&self, cn: &str, request_pem: &str) -> Result<Vec<u8>> {
        self.submit_csr(cn, request_pem).await?;
        self.approve_csr(cn).await?;
        let csr = self.wait_for_csr(cn).await?;
        Ok(signed_certificate(&csr).unwrap_or_default().to_vec())
    }

    pub async fn service_account_names(&self, namespace: &str) -> Result<Vec<String>> {
        service_account_names(&self.client, namespace).await
    }

    pub async fn cluster_role_names(&self) -> Result<Vec<String>> {
        cluster_role_names(&self.client).await
    }

    pub async fn validate_cluster_roles(&self, requested: &[String]) -> Result<()> {
        validate_cluster_roles(&self.client, requested).await
    }
}
