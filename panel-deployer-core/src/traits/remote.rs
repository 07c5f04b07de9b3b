//! Remote session abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{CommandOutput, ConnectionConfig, RemoteEntry, RemoteFileStat};

/// Opens authenticated sessions to the remote host.
///
/// Implementations must fail with `ConnectTimeout` when the session is not
/// established within `config.connect_timeout_secs`, and with `AuthFailed`
/// when the credentials are rejected.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> CoreResult<Box<dyn RemoteSession>>;
}

/// One live connection to one host.
///
/// A session is owned by the operation that opened it and is never shared
/// across concurrent operations. Callers must [`close`](Self::close) it on
/// every exit path.
///
/// File operations follow SFTP semantics: a missing path is reported as
/// `CoreError::NotFound`, an existing one (for `mkdir`) as
/// `CoreError::AlreadyExists`.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Host this session is connected to
    fn host(&self) -> &str;

    /// Whether the underlying transport is still usable
    fn is_alive(&self) -> bool;

    /// Run one shell command and wait for it to exit.
    ///
    /// A non-zero exit is not an error at this level; only transport
    /// failures are.
    async fn exec(&self, command: &str) -> CoreResult<CommandOutput>;

    async fn stat(&self, path: &str) -> CoreResult<RemoteFileStat>;

    /// Create one directory (parent must exist).
    async fn mkdir(&self, path: &str, mode: i32) -> CoreResult<()>;

    /// List a directory, without `.` and `..`.
    async fn read_dir(&self, path: &str) -> CoreResult<Vec<RemoteEntry>>;

    /// Read a whole file.
    async fn read_file(&self, path: &str) -> CoreResult<Vec<u8>>;

    /// Tear the session down. Closing twice is a no-op.
    async fn close(&self) -> CoreResult<()>;
}
