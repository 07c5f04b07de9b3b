//! One handler per subcommand. Each prints its result as JSON and reports
//! whether the operation succeeded.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use panel_deployer_core::remote::{RemoteFs, close_quietly};
use panel_deployer_core::services::{
    ConnectionService, DnsRecordService, DomainAnalysisService, DomainDiscoveryService,
    ProvisioningService, Selection, TransferService,
};
use panel_deployer_core::traits::{ConfigChangeListener, spawn_config_listener};
use panel_deployer_core::types::CreateSubdomainRequest;
use panel_deployer_core::utils::CancelFlag;
use panel_deployer_core::{CoreError, ServiceContext};

use crate::cli::{Command, ModuleArg, resolve_domain_root};

pub struct Runner {
    ctx: Arc<ServiceContext>,
    cancel: CancelFlag,
    compact: bool,
}

impl Runner {
    pub fn new(ctx: Arc<ServiceContext>, cancel: CancelFlag, compact: bool) -> Self {
        Self {
            ctx,
            cancel,
            compact,
        }
    }

    pub async fn run(&self, command: Command) -> Result<bool> {
        match command {
            Command::Modules => {
                self.print(self.ctx.registry.all())?;
                Ok(true)
            }
            Command::TestConnection => {
                let result = ConnectionService::new(Arc::clone(&self.ctx))
                    .test_connection()
                    .await;
                self.print(&result)?;
                Ok(result.success)
            }
            Command::Discover => {
                let report = DomainDiscoveryService::new(Arc::clone(&self.ctx))
                    .discover()
                    .await
                    .map_err(report_core_error)?;
                self.print(&report)?;
                Ok(true)
            }
            Command::Analyze { domain } => {
                let root = self.domain_root(&domain).await;
                let analysis = DomainAnalysisService::new(Arc::clone(&self.ctx))
                    .analyze(&root)
                    .await;
                self.print(&analysis)?;
                Ok(analysis.error.is_none())
            }
            Command::Transfer {
                domain,
                modules,
                dry_run,
            } => self.transfer(&domain, &modules, dry_run).await,
            Command::Dns { subdomain } => self.dns(&subdomain).await,
            Command::Provision {
                subdomain,
                desc,
                php_mode,
                php_version,
            } => {
                let request = CreateSubdomainRequest {
                    subdomain,
                    description: desc,
                    php_mode,
                    php_version,
                };
                let result = ProvisioningService::new(Arc::clone(&self.ctx))
                    .create_subdomain(&request)
                    .await
                    .map_err(report_core_error)?;
                self.print(&result)?;
                Ok(result.success)
            }
            Command::Download {
                remote_path,
                output,
            } => self.download(&remote_path, output).await,
        }
    }

    async fn transfer(&self, domain: &str, modules: &[ModuleArg], dry_run: bool) -> Result<bool> {
        let root = self.domain_root(domain).await;
        let mut selection = Selection::new();
        for module in modules {
            selection
                .select(&self.ctx.registry, &module.key, module.part)
                .map_err(report_core_error)?;
        }

        let service = TransferService::new(Arc::clone(&self.ctx));
        if dry_run {
            let plan = service
                .plan(&selection, &root)
                .await
                .map_err(report_core_error)?;
            self.print(&plan)?;
            return Ok(true);
        }

        let summary = service
            .transfer(&mut selection, &root, &self.cancel)
            .await
            .map_err(report_core_error)?;
        self.print(&summary)?;
        Ok(summary.success_count == summary.total_count)
    }

    async fn dns(&self, subdomain: &str) -> Result<bool> {
        let service = Arc::new(DnsRecordService::new(Arc::clone(&self.ctx)));
        let listener = spawn_config_listener(
            self.ctx.config.as_ref(),
            Arc::clone(&service) as Arc<dyn ConfigChangeListener>,
        );

        let result = service.create_records(subdomain, &self.cancel).await;
        listener.abort();

        let result = result.map_err(report_core_error)?;
        self.print(&result)?;
        Ok(result.created_count == result.total_count)
    }

    async fn download(&self, remote_path: &str, output: Option<PathBuf>) -> Result<bool> {
        let config = self.ctx.config().await;
        let destination = output.unwrap_or_else(|| PathBuf::from(&config.paths.local_destination));
        tokio::fs::create_dir_all(&destination)
            .await
            .with_context(|| format!("Failed to create {}", destination.display()))?;

        let session = self
            .ctx
            .open_session(&config.connection)
            .await
            .map_err(report_core_error)?;
        let result = RemoteFs::new(session.as_ref())
            .download(remote_path, &destination)
            .await;
        close_quietly(session.as_ref()).await;

        let summary = result.map_err(report_core_error)?;
        self.print(&summary)?;
        Ok(true)
    }

    async fn domain_root(&self, domain: &str) -> String {
        let config = self.ctx.config().await;
        resolve_domain_root(domain, &config.paths.base_path)
    }

    fn print<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        println!("{json}");
        Ok(())
    }
}

/// Log a core error at the level its kind warrants and hand it to `anyhow`.
fn report_core_error(err: CoreError) -> anyhow::Error {
    if err.is_expected() {
        tracing::warn!("{err}");
    } else {
        tracing::error!("{err}");
    }
    anyhow::Error::new(err)
}
