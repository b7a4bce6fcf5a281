// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CertificateSigningRequest submission, approval and readiness polling.

use crate::config::CsrWaitPolicy;
use crate::constants::csr::{
    APPROVAL_REASON, CLIENT_SIGNER_NAME, CONDITION_APPROVED, CONDITION_STATUS_TRUE,
    USAGE_CLIENT_AUTH,
};
use crate::error::{is_not_found, ProvisionError, Result};
use k8s_openapi::api::certificates::v1::{
    CertificateSigningRequest, CertificateSigningRequestCondition, CertificateSigningRequestSpec,
    CertificateSigningRequestStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use k8s_openapi::ByteString;
use kube::{
    api::{DeleteParams, ObjectMeta, PostParams},
    Api, Client,
};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// A client-auth CSR for the API server's client signer
pub fn new_csr(cn: &str, request_pem: &str) -> CertificateSigningRequest {
    CertificateSigningRequest {
        metadata: ObjectMeta {
            name: Some(cn.to_string()),
            ..Default::default()
        },
        spec: CertificateSigningRequestSpec {
            request: ByteString(request_pem.as_bytes().to_vec()),
            usages: Some(vec![USAGE_CLIENT_AUTH.to_string()]),
            signer_name: CLIENT_SIGNER_NAME.to_string(),
            ..Default::default()
        },
        status: None,
    }
}

/// Body for the approval subresource of `name`
pub fn approval_for(name: &str) -> CertificateSigningRequest {
    CertificateSigningRequest {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Default::default(),
        status: Some(CertificateSigningRequestStatus {
            certificate: None,
            conditions: Some(vec![CertificateSigningRequestCondition {
                type_: CONDITION_APPROVED.to_string(),
                status: CONDITION_STATUS_TRUE.to_string(),
                last_update_time: Some(Time(Utc::now())),
                message: Some(APPROVAL_REASON.to_string()),
                reason: Some(APPROVAL_REASON.to_string()),
                ..Default::default()
            }]),
        }),
    }
}

/// The issued certificate, if the signer has filled it in
pub fn signed_certificate(csr: &CertificateSigningRequest) -> Option<&[u8]> {
    csr.status
        .as_ref()
        .and_then(|s| s.certificate.as_ref())
        .map(|c| c.0.as_slice())
        .filter(|c| !c.is_empty())
}

/// Check for an "Approved" condition
pub fn is_approved(csr: &CertificateSigningRequest) -> bool {
    csr.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| conditions.iter().any(|c| c.type_ == CONDITION_APPROVED))
}

/// Replace any CSR named `cn` with a fresh request for `request_pem`
#[instrument(skip(client, request_pem))]
pub async fn recreate_csr(
    client: &Client,
    cn: &str,
    request_pem: &str,
) -> Result<CertificateSigningRequest> {
    let api: Api<CertificateSigningRequest> = Api::all(client.clone());

    match api.delete(cn, &DeleteParams::default()).await {
        Ok(_) => debug!("Deleted previous CSR {}", cn),
        Err(e) if is_not_found(&e) => debug!("No previous CSR {}", cn),
        Err(e) => return Err(e.into()),
    }

    let created = api
        .create(&PostParams::default(), &new_csr(cn, request_pem))
        .await?;
    info!("Submitted CSR {}", cn);
    Ok(created)
}

/// Poll until the CSR carries both a certificate and an "Approved" condition.
///
/// Fetch errors are logged and count as a spent attempt. No sleep follows the
/// final attempt.
#[instrument(skip(client))]
pub async fn wait_for_csr_ready(
    client: &Client,
    name: &str,
    policy: CsrWaitPolicy,
) -> Result<CertificateSigningRequest> {
    let api: Api<CertificateSigningRequest> = Api::all(client.clone());

    for attempt in 1..=policy.attempts {
        match api.get(name).await {
            Err(e) => warn!("Failed to get CSR {} (attempt {}): {}", name, attempt, e),
            Ok(csr) => {
                if signed_certificate(&csr).is_none() {
                    debug!("CSR {} has no certificate yet (attempt {})", name, attempt);
                } else if is_approved(&csr) {
                    info!("CSR {} is approved and issued", name);
                    return Ok(csr);
                } else {
                    debug!("CSR {} is issued but not approved (attempt {})", name, attempt);
                }
            }
        }

        if attempt < policy.attempts {
            sleep(policy.interval).await;
        }
    }

    Err(ProvisionError::CsrTimeout {
        name: name.to_string(),
        attempts: policy.attempts,
    })
}

/// Mark a CSR approved through its approval subresource.
///
/// The CSR is not checked for existence or pending state first.
#[instrument(skip(client))]
pub async fn approve_csr(client: &Client, name: &str) -> Result<CertificateSigningRequest> {
    let api: Api<CertificateSigningRequest> = Api::all(client.clone());
    let body = serde_json::to_vec(&approval_for(name))?;

    let approved = api
        .replace_subresource("approval", name, &PostParams::default(), body)
        .await?;
    info!("Approved CSR {}", name);
    Ok(approved)
}
