//! Session establishment: TCP, handshake, host key logging, authentication

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use ssh2::Session;

use panel_deployer_core::types::ConnectionConfig;
use panel_deployer_core::{CoreError, CoreResult, RemoteConnector, RemoteSession};

use crate::error::{is_auth_failure, map_session_error};
use crate::session::{Inner, SshSession};

/// libssh2's own blocking timeout sits this far above the command timeout,
/// so the executor's deadline fires first and reports a timed-out command
/// rather than a failed session.
const LIBSSH2_TIMEOUT_MARGIN_SECS: u64 = 5;

/// Opens [`SshSession`]s with password or private-key authentication.
#[derive(Debug, Default, Clone, Copy)]
pub struct SshConnector {
    read_lanes: usize,
}

impl SshConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve SFTP reads from up to `lanes` extra connections, opened on
    /// first use, so parallel reads of one session overlap. With zero lanes
    /// every operation shares the command connection.
    #[must_use]
    pub fn with_read_lanes(mut self, lanes: usize) -> Self {
        self.read_lanes = lanes;
        self
    }
}

#[async_trait]
impl RemoteConnector for SshConnector {
    async fn connect(&self, config: &ConnectionConfig) -> CoreResult<Box<dyn RemoteSession>> {
        let config = config.clone();
        let read_lanes = self.read_lanes;
        let session = tokio::task::spawn_blocking(move || {
            let primary = open_session(&config)?;
            Ok::<_, CoreError>(SshSession::new(config, Inner::new(primary), read_lanes))
        })
        .await
        .map_err(|e| CoreError::NetworkError(format!("connect task failed: {e}")))??;
        Ok(Box::new(session))
    }
}

/// Connect and authenticate one libssh2 session.
pub(crate) fn open_session(config: &ConnectionConfig) -> CoreResult<Session> {
    let target = config.display_target();
    let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
    log::debug!("[ssh] Connecting to {target}");

    let addr = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|e| CoreError::NetworkError(format!("Cannot resolve {}: {e}", config.host)))?
        .next()
        .ok_or_else(|| CoreError::NetworkError(format!("No address for {}", config.host)))?;

    let tcp = TcpStream::connect_timeout(&addr, connect_timeout).map_err(|e| match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => CoreError::ConnectTimeout {
            host: config.host.clone(),
            timeout_secs: config.connect_timeout_secs,
        },
        _ => CoreError::NetworkError(format!("TCP connect to {target} failed: {e}")),
    })?;
    // Nagle hurts the many small request/response rounds of exec and SFTP
    if let Err(e) = tcp.set_nodelay(true) {
        log::debug!("[ssh] set_nodelay failed: {e}");
    }

    let mut session = Session::new()
        .map_err(|e| CoreError::NetworkError(format!("Cannot create SSH session: {e}")))?;
    session.set_tcp_stream(tcp);
    session.set_timeout(millis(config.connect_timeout_secs));
    session.handshake().map_err(|e| match map_session_error("handshake", &e, 0) {
        CoreError::CommandTimedOut { .. } => CoreError::ConnectTimeout {
            host: config.host.clone(),
            timeout_secs: config.connect_timeout_secs,
        },
        _ => CoreError::NetworkError(format!("SSH handshake with {target} failed: {e}")),
    })?;

    if let Some((key, _)) = session.host_key() {
        log::info!("[ssh] Host key for {}: {}", config.host, host_key_fingerprint(key));
    }

    authenticate(&session, config)?;

    session.set_timeout(session_timeout_millis(config.command_timeout_secs));
    log::info!("[ssh] Authenticated to {target}");
    Ok(session)
}

fn authenticate(session: &Session, config: &ConnectionConfig) -> CoreResult<()> {
    let auth_failed = || CoreError::AuthFailed {
        host: config.host.clone(),
        username: config.username.clone(),
    };

    let result = match config.private_key_path.as_deref().filter(|p| !p.is_empty()) {
        Some(key_path) => {
            // The password, when set, unlocks an encrypted key
            let passphrase = Some(config.password.as_str()).filter(|p| !p.is_empty());
            session.userauth_pubkey_file(&config.username, None, Path::new(key_path), passphrase)
        }
        None => session.userauth_password(&config.username, &config.password),
    };

    match result {
        Ok(()) if session.authenticated() => Ok(()),
        Ok(()) => Err(auth_failed()),
        Err(e) if is_auth_failure(&e) => {
            log::warn!("[ssh] Authentication as {} rejected: {e}", config.username);
            Err(auth_failed())
        }
        Err(e) => Err(map_session_error("authenticate", &e, config.connect_timeout_secs)),
    }
}

/// `SHA256:<hex>` fingerprint of a raw host key blob.
pub fn host_key_fingerprint(key: &[u8]) -> String {
    format!("SHA256:{}", hex::encode(Sha256::digest(key)))
}

/// Bound for blocking libssh2 calls once authenticated.
fn session_timeout_millis(command_timeout_secs: u64) -> u32 {
    millis(command_timeout_secs.saturating_add(LIBSSH2_TIMEOUT_MARGIN_SECS))
}

fn millis(secs: u64) -> u32 {
    u32::try_from(secs.saturating_mul(1000)).unwrap_or(u32::MAX)
}
