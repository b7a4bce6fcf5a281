// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rbac_provisioner::config::Config;
use rbac_provisioner::kubernetes::create_client;
use rbac_provisioner::provision::{signed_certificate, Provisioner};
use rbac_provisioner::types::{BindingRequest, BindingSubject};

#[derive(Parser)]
#[command(name = "rbac-provisioner")]
#[command(about = "Grant cluster roles and issue client certificates for users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind cluster roles to a user or service account
    Bind(BindArgs),

    /// Manage client certificate signing requests
    #[command(subcommand)]
    Csr(CsrCommands),

    /// List objects used to validate provisioning input
    #[command(subcommand)]
    List(ListCommands),
}

#[derive(Args)]
struct BindArgs {
    /// Read the request from a YAML or JSON document instead of flags
    #[arg(
        short,
        long,
        conflicts_with_all = ["username", "cluster_roles", "namespaces", "service_account_namespace"]
    )]
    file: Option<PathBuf>,

    #[arg(short, long, required_unless_present = "file")]
    username: Option<String>,

    /// Cluster role to grant; repeatable
    #[arg(short = 'r', long = "cluster-role", required_unless_present = "file")]
    cluster_roles: Vec<String>,

    /// Namespace to bind in; repeatable. Binds cluster-wide when omitted
    #[arg(short, long = "namespace")]
    namespaces: Vec<String>,

    /// Treat the username as a service account living in this namespace
    #[arg(long)]
    service_account_namespace: Option<String>,

    /// Do not check the requested roles against the cluster's role list
    #[arg(long)]
    skip_validation: bool,
}

impl BindArgs {
    fn into_request(self) -> Result<BindingRequest> {
        if let Some(file) = self.file {
            let doc = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            return Ok(BindingRequest::from_yaml(&doc)?);
        }

        let username = self.username.unwrap_or_default();
        let subject = match self.service_account_namespace {
            Some(namespace) => BindingSubject::service_account(username, namespace),
            None => BindingSubject::user(username),
        };
        let request = BindingRequest {
            subject,
            cluster_roles: self.cluster_roles,
            namespaces: self.namespaces,
        };
        request.validate()?;
        Ok(request)
    }
}

#[derive(Subcommand)]
enum CsrCommands {
    /// Submit a CSR, replacing any previous one with the same name
    Submit {
        #[arg(long)]
        cn: String,
        /// PEM encoded certificate request
        #[arg(long)]
        request_file: PathBuf,
    },
    /// Approve a pending CSR
    Approve {
        #[arg(long)]
        name: String,
    },
    /// Wait for a CSR to be approved and issued
    Wait {
        #[arg(long)]
        name: String,
        /// Where to write the certificate. Defaults to stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Submit, approve and wait for a CSR
    Issue {
        #[arg(long)]
        cn: String,
        #[arg(long)]
        request_file: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Service accounts in a namespace; the namespace is created when missing
    ServiceAccounts {
        #[arg(short, long)]
        namespace: String,
    },
    ClusterRoles,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let client = create_client(&config).await?;
    let provisioner = Provisioner::with_policy(client, config.csr_wait);

    match cli.command {
        Commands::Bind(args) => {
            let skip_validation = args.skip_validation;
            let request = args.into_request()?;
            if !skip_validation {
                provisioner.validate_cluster_roles(&request.cluster_roles).await?;
            }
            for binding in provisioner.apply(&request).await? {
                println!("{}", binding);
            }
        }
        Commands::Csr(CsrCommands::Submit { cn, request_file }) => {
            let pem = read_request(&request_file)?;
            provisioner.submit_csr(&cn, &pem).await?;
        }
        Commands::Csr(CsrCommands::Approve { name }) => {
            provisioner.approve_csr(&name).await?;
        }
        Commands::Csr(CsrCommands::Wait { name, out }) => {
            let csr = provisioner.wait_for_csr(&name).await?;
            write_certificate(signed_certificate(&csr).unwrap_or_default(), out.as_ref())?;
        }
        Commands::Csr(CsrCommands::Issue {
            cn,
            request_file,
            out,
        }) => {
            let pem = read_request(&request_file)?;
            let certificate = provisioner.issue_certificate(&cn, &pem).await?;
            write_certificate(&certificate, out.as_ref())?;
        }
        Commands::List(ListCommands::ServiceAccounts { namespace }) => {
            for name in provisioner.service_account_names(&namespace).await? {
                println!("{}", name);
            }
        }
        Commands::List(ListCommands::ClusterRoles) => {
            for name in provisioner.cluster_role_names().await? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn read_request(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_certificate(certificate: &[u8], out: Option<&PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, certificate)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote certificate to {}", path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(certificate)?;
        }
    }
    Ok(())
}
