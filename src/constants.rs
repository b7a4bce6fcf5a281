// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// RBAC object identifiers
pub mod rbac {
    pub const API_GROUP: &str = "rbac.authorization.k8s.io";
    pub const CLUSTER_ROLE_KIND: &str = "ClusterRole";
    pub const USER_KIND: &str = "User";
    pub const SERVICE_ACCOUNT_KIND: &str = "ServiceAccount";
}

/// CertificateSigningRequest identifiers
pub mod csr {
    /// Built-in signer for client certificates accepted by the API server
    pub const CLIENT_SIGNER_NAME: &str = "kubernetes.io/kube-apiserver-client";
    pub const USAGE_CLIENT_AUTH: &str = "client auth";
    pub const CONDITION_APPROVED: &str = "Approved";
    pub const CONDITION_STATUS_TRUE: &str = "True";
    /// Reason and message recorded on approvals
    pub const APPROVAL_REASON: &str = "approval";
}

/// CSR readiness polling defaults
pub mod poll {
    pub const CSR_WAIT_ATTEMPTS: u32 = 5;
    pub const CSR_WAIT_INTERVAL_MS: u64 = 1000;
}
