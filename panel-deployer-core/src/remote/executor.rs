//! Command execution with timeout and audit logging

use std::time::Duration;

use panel_deployer_provider::truncate_for_log;

use crate::error::CoreResult;
use crate::traits::RemoteSession;
use crate::types::{CommandStatus, ConnectionConfig, RemoteCommandResult};

/// Runs labelled commands on a session.
///
/// Every command carries the configured timeout. A command that does not
/// finish in time is reported as [`CommandStatus::TimedOut`]; it is not
/// killed on the remote side.
#[derive(Debug, Clone, Copy)]
pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    #[must_use]
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(Duration::from_secs(config.command_timeout_secs))
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    /// Run `command` and classify the outcome.
    ///
    /// Non-zero exits and timeouts come back as `Ok` with the matching
    /// status and whatever output was captured; only transport failures
    /// are returned as `Err`.
    pub async fn exec(
        &self,
        session: &dyn RemoteSession,
        command: &str,
        label: &str,
    ) -> CoreResult<RemoteCommandResult> {
        log::debug!("[remote] {label}: {}", truncate_for_log(command));

        let result = match tokio::time::timeout(self.timeout, session.exec(command)).await {
            Ok(Ok(output)) => RemoteCommandResult {
                label: label.to_string(),
                status: if output.exit_code == 0 {
                    CommandStatus::Ok
                } else {
                    CommandStatus::Failed
                },
                exit_code: Some(output.exit_code),
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Ok(Err(e)) => {
                log::error!("[remote] {label}: transport error: {e}");
                return Err(e);
            }
            Err(_) => RemoteCommandResult {
                label: label.to_string(),
                stdout: String::new(),
                stderr: String::new(),
                exit_code: None,
                status: CommandStatus::TimedOut,
            },
        };

        audit(&result, self.timeout_secs());
        Ok(result)
    }

    /// Like [`exec`](Self::exec), but a non-ok status becomes an error.
    pub async fn exec_checked(
        &self,
        session: &dyn RemoteSession,
        command: &str,
        label: &str,
    ) -> CoreResult<RemoteCommandResult> {
        let result = self.exec(session, command, label).await?;
        if result.is_ok() {
            Ok(result)
        } else {
            Err(result.into_error(self.timeout_secs()))
        }
    }
}

fn audit(result: &RemoteCommandResult, timeout_secs: u64) {
    let label = &result.label;
    match result.status {
        CommandStatus::Ok => {
            log::info!("[remote] {label}: ok");
        }
        CommandStatus::Failed => {
            log::warn!(
                "[remote] {label}: exit {}: {}",
                result.exit_code.unwrap_or(-1),
                truncate_for_log(result.stderr.trim())
            );
        }
        CommandStatus::TimedOut => {
            log::warn!("[remote] {label}: timed out after {timeout_secs}s");
        }
    }
    if !result.stdout.is_empty() {
        log::debug!("[remote] {label} stdout: {}", truncate_for_log(&result.stdout));
    }
    if !result.stderr.is_empty() && result.is_ok() {
        log::debug!("[remote] {label} stderr: {}", truncate_for_log(&result.stderr));
    }
}
