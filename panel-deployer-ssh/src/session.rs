//! `RemoteSession` over libssh2 sessions

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use ssh2::{Session, Sftp};

use panel_deployer_core::types::{CommandOutput, ConnectionConfig, RemoteEntry, RemoteFileStat};
use panel_deployer_core::{CoreError, CoreResult, RemoteSession};

use crate::connector::open_session;
use crate::error::{map_io_error, map_mkdir_error, map_session_error, map_sftp_error};
use crate::pool::LanePool;

pub(crate) struct Inner {
    pub(crate) session: Session,
    /// Opened on the first file operation
    sftp: Option<Sftp>,
    closed: bool,
}

impl Inner {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            sftp: None,
            closed: false,
        }
    }

    fn sftp(&mut self, timeout_secs: u64) -> CoreResult<&Sftp> {
        if self.sftp.is_none() {
            let sftp = self
                .session
                .sftp()
                .map_err(|e| map_session_error("open sftp", &e, timeout_secs))?;
            log::debug!("[ssh] SFTP subsystem opened");
            self.sftp = Some(sftp);
        }
        self.sftp
            .as_ref()
            .ok_or_else(|| CoreError::NetworkError("SFTP subsystem unavailable".to_string()))
    }
}

/// One authenticated SSH connection, plus optional read lanes.
///
/// libssh2 calls block, so every operation runs on the blocking pool and
/// locks the connection it uses. Commands and writes share the primary
/// connection and are serialized. Reads (`stat`, `read_dir`, `read_file`)
/// go to a pool of extra connections opened on first use, so parallel reads
/// overlap; if an extra connection cannot be opened, reads fall back to the
/// primary one.
pub struct SshSession {
    host: String,
    timeout_secs: u64,
    inner: Arc<Mutex<Inner>>,
    readers: Arc<Readers>,
    alive: Arc<AtomicBool>,
}

struct Readers {
    config: ConnectionConfig,
    pool: LanePool<Inner>,
    /// Set once opening an extra connection failed, or the session closed
    disabled: AtomicBool,
}

impl SshSession {
    pub(crate) fn new(config: ConnectionConfig, inner: Inner, read_lanes: usize) -> Self {
        Self {
            host: config.host.clone(),
            timeout_secs: config.command_timeout_secs,
            inner: Arc::new(Mutex::new(inner)),
            readers: Arc::new(Readers {
                pool: LanePool::new(read_lanes),
                disabled: AtomicBool::new(read_lanes == 0),
                config,
            }),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    async fn blocking<T, F>(&self, op: &str, f: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inner, u64) -> CoreResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let timeout_secs = self.timeout_secs;

        let result = tokio::task::spawn_blocking(move || run_on(&inner, timeout_secs, f))
            .await
            .map_err(|e| CoreError::NetworkError(format!("{op} task failed: {e}")))?;
        self.note_failure(&result);
        result
    }

    /// Like [`blocking`](Self::blocking), but on a read lane when one is
    /// available.
    async fn blocking_read<T, F>(&self, op: &str, f: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inner, u64) -> CoreResult<T> + Send + 'static,
    {
        if self.readers.disabled.load(Ordering::SeqCst) {
            return self.blocking(op, f).await;
        }
        let inner = Arc::clone(&self.inner);
        let readers = Arc::clone(&self.readers);
        let timeout_secs = self.timeout_secs;

        let (result, on_primary) = tokio::task::spawn_blocking(move || {
            let primary = |f: F| (run_on(&inner, timeout_secs, f), true);
            let Some((index, mut lane)) = readers.pool.acquire() else {
                return primary(f);
            };
            if readers.disabled.load(Ordering::SeqCst) {
                drop(lane);
                return primary(f);
            }
            if lane.is_none() {
                match open_session(&readers.config) {
                    Ok(session) => {
                        log::debug!("[ssh] Read lane {index} opened");
                        *lane = Some(Inner::new(session));
                    }
                    Err(e) => {
                        log::warn!(
                            "[ssh] Cannot open read lane, reading over the command connection: {e}"
                        );
                        readers.disabled.store(true, Ordering::SeqCst);
                        drop(lane);
                        return primary(f);
                    }
                }
            }
            let Some(reader) = lane.as_mut() else {
                return primary(f);
            };
            let result = f(reader, timeout_secs);
            if let Err(e) = &result
                && e.is_connectivity()
                && let Some(dead) = lane.take()
            {
                // Reopened by the next read that lands here
                disconnect(dead, "read lane");
            }
            (result, false)
        })
        .await
        .map_err(|e| CoreError::NetworkError(format!("{op} task failed: {e}")))?;

        // A dropped read lane leaves the command connection usable
        if on_primary {
            self.note_failure(&result);
        }
        result
    }

    fn note_failure<T>(&self, result: &CoreResult<T>) {
        if let Err(e) = result
            && e.is_connectivity()
        {
            self.alive.store(false, Ordering::SeqCst);
        }
    }
}

fn run_on<T, F>(inner: &Mutex<Inner>, timeout_secs: u64, f: F) -> CoreResult<T>
where
    F: FnOnce(&mut Inner, u64) -> CoreResult<T>,
{
    let mut guard = inner.lock();
    if guard.closed {
        return Err(CoreError::NetworkError("session is closed".to_string()));
    }
    f(&mut guard, timeout_secs)
}

fn disconnect(mut inner: Inner, what: &str) {
    inner.closed = true;
    inner.sftp = None;
    if let Err(e) = inner.session.disconnect(None, "closing", None) {
        log::debug!("[ssh] Disconnecting {what} failed: {e}");
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    fn host(&self) -> &str {
        &self.host
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn exec(&self, command: &str) -> CoreResult<CommandOutput> {
        let command = command.to_string();
        self.blocking("exec", move |inner, timeout_secs| {
            let label = "exec";
            let mut channel = inner
                .session
                .channel_session()
                .map_err(|e| map_session_error(label, &e, timeout_secs))?;
            channel
                .exec(&command)
                .map_err(|e| map_session_error(label, &e, timeout_secs))?;

            let mut stdout = Vec::new();
            channel
                .read_to_end(&mut stdout)
                .map_err(|e| map_io_error(label, &e, timeout_secs))?;
            let mut stderr = Vec::new();
            channel
                .stderr()
                .read_to_end(&mut stderr)
                .map_err(|e| map_io_error(label, &e, timeout_secs))?;

            channel
                .wait_close()
                .map_err(|e| map_session_error(label, &e, timeout_secs))?;
            let exit_code = channel
                .exit_status()
                .map_err(|e| map_session_error(label, &e, timeout_secs))?;

            Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                exit_code,
            })
        })
        .await
    }

    async fn stat(&self, path: &str) -> CoreResult<RemoteFileStat> {
        let path = path.to_string();
        self.blocking_read("stat", move |inner, timeout_secs| {
            let stat = inner
                .sftp(timeout_secs)?
                .stat(Path::new(&path))
                .map_err(|e| map_sftp_error(&path, &e, timeout_secs))?;
            Ok(RemoteFileStat {
                is_dir: stat.is_dir(),
                size: stat.size.unwrap_or(0),
                permissions: stat.perm,
            })
        })
        .await
    }

    async fn mkdir(&self, path: &str, mode: i32) -> CoreResult<()> {
        let path = path.to_string();
        self.blocking("mkdir", move |inner, timeout_secs| {
            inner
                .sftp(timeout_secs)?
                .mkdir(Path::new(&path), mode)
                .map_err(|e| map_mkdir_error(&path, &e, timeout_secs))
        })
        .await
    }

    async fn read_dir(&self, path: &str) -> CoreResult<Vec<RemoteEntry>> {
        let path = path.to_string();
        self.blocking_read("read_dir", move |inner, timeout_secs| {
            let entries = inner
                .sftp(timeout_secs)?
                .readdir(Path::new(&path))
                .map_err(|e| map_sftp_error(&path, &e, timeout_secs))?;

            Ok(entries
                .into_iter()
                .filter_map(|(entry_path, stat)| {
                    let name = entry_path.file_name()?.to_string_lossy().into_owned();
                    if name == "." || name == ".." {
                        return None;
                    }
                    Some(RemoteEntry {
                        name,
                        path: entry_path.to_string_lossy().into_owned(),
                        is_dir: stat.is_dir(),
                        size: stat.size.unwrap_or(0),
                    })
                })
                .collect())
        })
        .await
    }

    async fn read_file(&self, path: &str) -> CoreResult<Vec<u8>> {
        let path = path.to_string();
        self.blocking_read("read_file", move |inner, timeout_secs| {
            let mut file = inner
                .sftp(timeout_secs)?
                .open(Path::new(&path))
                .map_err(|e| map_sftp_error(&path, &e, timeout_secs))?;
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)
                .map_err(|e| map_io_error(&path, &e, timeout_secs))?;
            Ok(contents)
        })
        .await
    }

    async fn close(&self) -> CoreResult<()> {
        self.alive.store(false, Ordering::SeqCst);
        self.readers.disabled.store(true, Ordering::SeqCst);
        let host = self.host.clone();
        let inner = Arc::clone(&self.inner);
        let readers = Arc::clone(&self.readers);
        tokio::task::spawn_blocking(move || {
            for lane in readers.pool.drain() {
                disconnect(lane, "read lane");
            }
            let mut guard = inner.lock();
            if guard.closed {
                return;
            }
            guard.closed = true;
            guard.sftp = None;
            if let Err(e) = guard.session.disconnect(None, "closing", None) {
                log::debug!("[ssh] Disconnect from {host} failed: {e}");
            }
        })
        .await
        .map_err(|e| CoreError::NetworkError(format!("close task failed: {e}")))?;
        log::debug!("[ssh] Session to {} closed", self.host);
        Ok(())
    }
}
