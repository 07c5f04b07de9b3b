//! Module transfer: plan selected items against a web root and copy them
//! from the module library on the remote host.

mod planner;
mod selection;

pub use planner::{classify, plan_item, plan_transfer};
pub use selection::Selection;

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::remote::{CommandExecutor, close_quietly};
use crate::services::ServiceContext;
use crate::traits::RemoteSession;
use crate::types::{TransferConfig, TransferPlanItem, TransferResult, TransferSummary};
use crate::utils::CancelFlag;
use crate::utils::remote_path;
use crate::utils::shell::quote;

/// Copies selected modules into a domain's web root
pub struct TransferService {
    ctx: Arc<ServiceContext>,
}

impl TransferService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Resolve the selection without touching the remote host.
    pub async fn plan(
        &self,
        selection: &Selection,
        domain_root: &str,
    ) -> CoreResult<Vec<TransferPlanItem>> {
        let config = self.ctx.config().await;
        let source_root = module_source(&config.paths.module_source)?;
        validate_domain_root(domain_root)?;
        Ok(plan_transfer(selection.items(), source_root, domain_root))
    }

    /// Plan and execute the selection against `domain_root`.
    ///
    /// Items run one after another on a single session; one item failing
    /// never stops the rest. Items that succeeded are removed from
    /// `selection`, so a fully successful transfer leaves it empty.
    ///
    /// Only precondition and connection failures are returned as `Err`.
    pub async fn transfer(
        &self,
        selection: &mut Selection,
        domain_root: &str,
        cancel: &CancelFlag,
    ) -> CoreResult<TransferSummary> {
        if selection.is_empty() {
            return Err(CoreError::ValidationError(
                "Nothing selected for transfer".to_string(),
            ));
        }
        let mut plan = self.plan(selection, domain_root).await?;
        let config = self.ctx.config().await;

        log::info!(
            "[transfer] Transferring {} item(s) to {domain_root}",
            plan.len()
        );

        let session = self.ctx.open_session(&config.connection).await?;
        let executor = ServiceContext::executor(&config.connection);
        let summary = execute_plan(
            session.as_ref(),
            executor,
            &mut plan,
            domain_root,
            &config.transfer,
            cancel,
        )
        .await;
        close_quietly(session.as_ref()).await;

        let mut outcomes = summary.results.iter().map(TransferResult::is_success);
        let retained: Vec<_> = selection
            .items()
            .iter()
            .filter(|_| !outcomes.next().unwrap_or(false))
            .cloned()
            .collect();
        selection.clear();
        for item in retained {
            selection.insert(item);
        }

        log::info!(
            "[transfer] Finished: {}/{} succeeded{}",
            summary.success_count,
            summary.total_count,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        Ok(summary)
    }
}

fn module_source(configured: &str) -> CoreResult<&str> {
    let trimmed = configured.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Configuration(
            "paths.moduleSource is not configured".to_string(),
        ));
    }
    Ok(trimmed)
}

fn validate_domain_root(domain_root: &str) -> CoreResult<()> {
    let root = remote_path::trim_trailing_slash(domain_root.trim());
    if root.is_empty() || !root.starts_with('/') || root == "/" {
        return Err(CoreError::ValidationError(format!(
            "Domain root must be an absolute directory, got '{domain_root}'"
        )));
    }
    Ok(())
}

async fn execute_plan(
    session: &dyn RemoteSession,
    executor: CommandExecutor,
    plan: &mut [TransferPlanItem],
    domain_root: &str,
    transfer: &TransferConfig,
    cancel: &CancelFlag,
) -> TransferSummary {
    let mut results = Vec::with_capacity(plan.len());
    let mut cancelled = false;
    let mut session_lost: Option<String> = None;

    for item in plan.iter_mut() {
        if let Some(reason) = &session_lost {
            results.push(TransferResult::error(item, format!("Not attempted: {reason}")));
            continue;
        }
        if cancelled || cancel.is_cancelled() {
            cancelled = true;
            results.push(TransferResult::error(item, CoreError::Cancelled.to_string()));
            continue;
        }

        match transfer_item(session, executor, item, transfer).await {
            Ok(warning) => {
                log::info!(
                    "[transfer] {} -> {}",
                    item.display_name,
                    item.destination_absolute_path
                );
                results.push(TransferResult::success(item, warning));
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("[transfer] {} failed: {e}", item.display_name);
                } else {
                    log::error!("[transfer] {} failed: {e}", item.display_name);
                }
                if e.is_connectivity() {
                    session_lost = Some(e.to_string());
                }
                results.push(TransferResult::error(item, e.to_string()));
            }
        }
    }

    let ownership_fixed = if session_lost.is_some() {
        false
    } else {
        fix_domain_ownership(session, executor, domain_root, &transfer.owner).await
    };

    TransferSummary::from_results(results, cancelled, ownership_fixed)
}

/// Copy one item. Returns a warning when only the permission fix-up failed.
async fn transfer_item(
    session: &dyn RemoteSession,
    executor: CommandExecutor,
    item: &mut TransferPlanItem,
    transfer: &TransferConfig,
) -> CoreResult<Option<String>> {
    let name = item.display_name.clone();
    let source = item.source_absolute_path.clone();
    let destination = item.destination_absolute_path.clone();

    let probe = executor
        .exec(
            session,
            &format!("ls -ldL {}", quote(&source)),
            &format!("probe {name}"),
        )
        .await?;
    if !probe.is_ok() {
        return Err(CoreError::NotFound(format!("Source not found: {source}")));
    }
    item.is_directory = probe.stdout.trim_start().starts_with('d');

    if let Some(parent) = remote_path::parent(&destination) {
        executor
            .exec_checked(
                session,
                &format!("mkdir -p {}", quote(parent)),
                &format!("prepare {name}"),
            )
            .await?;
    }

    let copy = if item.is_directory {
        format!(
            "mkdir -p {dest} && cp -rf {src} {dest_slash}",
            dest = quote(&destination),
            src = quote(&format!("{source}/.")),
            dest_slash = quote(&format!("{destination}/")),
        )
    } else {
        format!("cp -f {} {}", quote(&source), quote(&destination))
    };
    executor
        .exec_checked(session, &copy, &format!("copy {name}"))
        .await?;

    let fixup = format!(
        "chown -R {owner} {dest} && chmod -R {mode} {dest}",
        owner = quote(&transfer.owner),
        mode = quote(&transfer.directory_mode),
        dest = quote(&destination),
    );
    let result = executor
        .exec(session, &fixup, &format!("permissions {name}"))
        .await?;
    if result.is_ok() {
        Ok(None)
    } else {
        Ok(Some(format!(
            "Copied, but setting ownership/permissions failed: {}",
            result.failure_detail()
        )))
    }
}

async fn fix_domain_ownership(
    session: &dyn RemoteSession,
    executor: CommandExecutor,
    domain_root: &str,
    owner: &str,
) -> bool {
    let command = format!("chown -R {} {}", quote(owner), quote(domain_root));
    match executor.exec(session, &command, "fix ownership").await {
        Ok(result) if result.is_ok() => true,
        Ok(result) => {
            log::warn!(
                "[transfer] Ownership fix-up on {domain_root} failed: {}",
                result.failure_detail()
            );
            false
        }
        Err(e) => {
            log::warn!("[transfer] Ownership fix-up on {domain_root} failed: {e}");
            false
        }
    }
}
