//! Remote session and command types

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Raw output of one command as returned by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandStatus {
    Ok,
    Failed,
    TimedOut,
}

/// Classified outcome of one executed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCommandResult {
    pub label: String,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the command timed out.
    pub exit_code: Option<i32>,
    pub status: CommandStatus,
}

impl RemoteCommandResult {
    pub fn is_ok(&self) -> bool {
        self.status == CommandStatus::Ok
    }

    /// stdout followed by stderr.
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }

    /// Best human-readable failure detail: stderr, else stdout, else the status.
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.status {
            CommandStatus::TimedOut => "command timed out".to_string(),
            _ => format!("exit code {}", self.exit_code.unwrap_or(-1)),
        }
    }

    /// Convert a non-ok result into the matching [`CoreError`].
    pub fn into_error(self, timeout_secs: u64) -> CoreError {
        match self.status {
            CommandStatus::TimedOut => CoreError::CommandTimedOut {
                label: self.label,
                timeout_secs,
            },
            _ => CoreError::CommandFailed {
                exit_code: self.exit_code,
                stderr: self.failure_detail(),
                label: self.label,
            },
        }
    }
}

/// Attributes returned by a remote `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileStat {
    pub is_dir: bool,
    pub size: u64,
    /// Permission bits, when the server reports them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
}

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub name: String,
    /// Absolute remote path.
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
}
