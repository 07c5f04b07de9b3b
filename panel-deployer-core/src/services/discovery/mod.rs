//! Domain discovery
//!
//! Several unreliable sources are queried independently and merged by
//! name. A source that fails or finds nothing contributes nothing.

mod strategies;

pub use strategies::DiscoveryStrategy;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::remote::{CommandExecutor, close_quietly};
use crate::services::ServiceContext;
use crate::traits::RemoteSession;
use crate::types::{CommandStatus, DiscoveredDomain, DiscoveryReport, Domain};
use crate::utils::remote_path;
use crate::utils::shell::quote;

/// Web root below a domain directory when no source says otherwise.
const DEFAULT_WEB_ROOT_DIR: &str = "public_html";

/// Lists the domains hosted on the remote machine
pub struct DomainDiscoveryService {
    ctx: Arc<ServiceContext>,
}

impl DomainDiscoveryService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Run every strategy, merge, and fall back to a raw listing of the
    /// domains root when nothing was found.
    pub async fn discover(&self) -> CoreResult<DiscoveryReport> {
        let config = self.ctx.config().await;
        let base_path = config.paths.base_path.trim();
        if base_path.is_empty() {
            return Err(CoreError::Configuration(
                "paths.basePath is not configured".to_string(),
            ));
        }

        let session = self.ctx.open_session(&config.connection).await?;
        let executor = ServiceContext::executor(&config.connection);
        let report = run_discovery(
            session.as_ref(),
            executor,
            base_path,
            &config.provisioning.cli_command,
        )
        .await;
        close_quietly(session.as_ref()).await;

        log::info!(
            "[discovery] Found {} domain(s) via {:?}{}",
            report.domains.len(),
            report.contributing_sources,
            if report.used_fallback { " (fallback listing)" } else { "" }
        );
        Ok(report)
    }
}

async fn run_discovery(
    session: &dyn RemoteSession,
    executor: CommandExecutor,
    base_path: &str,
    cli_command: &str,
) -> DiscoveryReport {
    let mut results = Vec::with_capacity(DiscoveryStrategy::ALL.len());
    for strategy in DiscoveryStrategy::ALL {
        let found = run_strategy(session, executor, strategy, base_path, cli_command).await;
        results.push((strategy.name(), found));
    }

    let mut report = merge_discoveries(results, base_path);
    if report.domains.is_empty() {
        match list_domains_root(session, executor, base_path).await {
            Ok(names) => {
                report.used_fallback = true;
                report.domains = names
                    .into_iter()
                    .map(|name| Domain {
                        path: default_web_root(base_path, &name),
                        name,
                    })
                    .collect();
            }
            Err(e) => {
                log::warn!("[discovery] Fallback listing of {base_path} failed: {e}");
                report.failures.insert("fallback-listing".to_string(), e.to_string());
            }
        }
    }
    report
}

async fn run_strategy(
    session: &dyn RemoteSession,
    executor: CommandExecutor,
    strategy: DiscoveryStrategy,
    base_path: &str,
    cli_command: &str,
) -> CoreResult<Vec<DiscoveredDomain>> {
    let command = strategy.command(base_path, cli_command);
    let result = executor
        .exec(session, &command, &format!("discover {}", strategy.name()))
        .await?;
    match result.status {
        CommandStatus::Ok => Ok(strategy.parse(&result.stdout)),
        CommandStatus::Failed if strategy.scans_optional_paths() => {
            log::debug!(
                "[discovery] {} exited {}, keeping partial output",
                strategy.name(),
                result.exit_code.unwrap_or(-1)
            );
            Ok(strategy.parse(&result.stdout))
        }
        _ => Err(result.into_error(executor.timeout_secs())),
    }
}

async fn list_domains_root(
    session: &dyn RemoteSession,
    executor: CommandExecutor,
    base_path: &str,
) -> CoreResult<Vec<String>> {
    let result = executor
        .exec_checked(
            session,
            &format!("ls -la {}", quote(base_path)),
            "discover fallback-listing",
        )
        .await?;
    Ok(parse_long_listing(&result.stdout))
}

/// Merge per-source results into a sorted, deduplicated domain list.
///
/// Failed sources are logged and recorded in `failures`; they never
/// prevent the others from contributing. An explicit path from any source
/// wins over the default convention.
pub fn merge_discoveries<S: Into<String>>(
    results: impl IntoIterator<Item = (S, CoreResult<Vec<DiscoveredDomain>>)>,
    base_path: &str,
) -> DiscoveryReport {
    let mut merged: BTreeMap<String, Option<String>> = BTreeMap::new();
    let mut contributing = BTreeSet::new();
    let mut failures = BTreeMap::new();

    for (source, result) in results {
        let source = source.into();
        match result {
            Ok(found) => {
                if !found.is_empty() {
                    contributing.insert(source.clone());
                }
                log::debug!("[discovery] {source}: {} name(s)", found.len());
                for domain in found {
                    let slot = merged.entry(domain.name).or_insert(None);
                    if slot.is_none() {
                        *slot = domain.path;
                    }
                }
            }
            Err(e) => {
                log::debug!("[discovery] {source} contributed nothing: {e}");
                failures.insert(source, e.to_string());
            }
        }
    }

    let domains = merged
        .into_iter()
        .map(|(name, path)| Domain {
            path: path.unwrap_or_else(|| default_web_root(base_path, &name)),
            name,
        })
        .collect();

    DiscoveryReport {
        domains,
        contributing_sources: contributing.into_iter().collect(),
        failures,
        used_fallback: false,
    }
}

/// Domain names from `ls -la` output: directories (and symlinks) whose
/// name looks like a domain.
pub fn parse_long_listing(stdout: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for line in stdout.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }
        let kind = fields[0].chars().next();
        if !matches!(kind, Some('d' | 'l')) {
            continue;
        }
        let name = fields[8..].join(" ");
        let name = name.split(" -> ").next().unwrap_or(&name);
        if let Some(name) = strategies::normalize_name(name) {
            names.insert(name);
        }
    }
    names.into_iter().collect()
}

fn default_web_root(base_path: &str, name: &str) -> String {
    remote_path::join(base_path, &format!("{name}/{DEFAULT_WEB_ROOT_DIR}"))
}
