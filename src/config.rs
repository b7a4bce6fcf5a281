// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::poll::{CSR_WAIT_ATTEMPTS, CSR_WAIT_INTERVAL_MS};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// How long to wait for a submitted CSR to be issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrWaitPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for CsrWaitPolicy {
    fn default() -> Self {
        Self {
            attempts: CSR_WAIT_ATTEMPTS,
            interval: Duration::from_millis(CSR_WAIT_INTERVAL_MS),
        }
    }
}

/// Provisioner configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Explicit kubeconfig file; the ambient config is inferred when unset
    pub kubeconfig_path: Option<PathBuf>,
    pub csr_wait: CsrWaitPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let kubeconfig_path = lookup("KUBECONFIG_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let mut csr_wait = CsrWaitPolicy::default();
        if let Some(attempts) = lookup("CSR_WAIT_ATTEMPTS") {
            csr_wait.attempts = attempts
                .parse()
                .with_context(|| format!("CSR_WAIT_ATTEMPTS is not a number: {}", attempts))?;
            if csr_wait.attempts == 0 {
                bail!("CSR_WAIT_ATTEMPTS must be at least 1");
            }
        }
        if let Some(interval) = lookup("CSR_WAIT_INTERVAL_MS") {
            let ms: u64 = interval
                .parse()
                .with_context(|| format!("CSR_WAIT_INTERVAL_MS is not a number: {}", interval))?;
            csr_wait.interval = Duration::from_millis(ms);
        }

        Ok(Config {
            kubeconfig_path,
            csr_wait,
        })
    }
}
