//! Remote file and directory operations built on the session's file channel

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::traits::RemoteSession;
use crate::types::{RemoteEntry, RemoteFileStat};
use crate::utils::remote_path;

const DEFAULT_DIR_MODE: i32 = 0o755;

/// An entry found by [`RemoteFs::walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the walk root, `/`-separated.
    pub relative_path: String,
    /// 1 for direct children of the root.
    pub depth: usize,
    pub entry: RemoteEntry,
}

/// What a download wrote locally.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSummary {
    pub local_path: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// File operations on one session.
pub struct RemoteFs<'a> {
    session: &'a dyn RemoteSession,
}

impl<'a> RemoteFs<'a> {
    pub fn new(session: &'a dyn RemoteSession) -> Self {
        Self { session }
    }

    pub async fn stat(&self, path: &str) -> CoreResult<RemoteFileStat> {
        self.session.stat(path).await
    }

    /// `stat` with not-found mapped to `false`.
    pub async fn exists(&self, path: &str) -> CoreResult<bool> {
        match self.session.stat(path).await {
            Ok(_) => Ok(true),
            Err(CoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create one directory; an existing directory is not an error.
    pub async fn mkdir(&self, path: &str) -> CoreResult<()> {
        match self.session.mkdir(path, DEFAULT_DIR_MODE).await {
            Ok(()) | Err(CoreError::AlreadyExists(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Create `path` and any missing parents.
    pub async fn mkdir_all(&self, path: &str) -> CoreResult<()> {
        let path = remote_path::trim_trailing_slash(path);
        let mut missing = Vec::new();
        let mut current = Some(path);

        while let Some(dir) = current {
            if dir == "/" || self.exists(dir).await? {
                break;
            }
            missing.push(dir);
            current = remote_path::parent(dir);
        }

        for dir in missing.into_iter().rev() {
            self.mkdir(dir).await?;
        }
        Ok(())
    }

    /// Read a file and decode it as JSON.
    pub async fn read_json(&self, path: &str) -> CoreResult<serde_json::Value> {
        let bytes = self.session.read_file(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Breadth-first listing of `root`, down to `max_depth` levels.
    ///
    /// A failure to list the root is returned; failures below it are
    /// logged and the subtree is skipped.
    pub async fn walk(&self, root: &str, max_depth: usize) -> CoreResult<Vec<WalkEntry>> {
        let mut found = Vec::new();
        if max_depth == 0 {
            return Ok(found);
        }

        let mut queue = VecDeque::from([(root.to_string(), String::new(), 1_usize)]);
        while let Some((dir, relative_dir, depth)) = queue.pop_front() {
            let entries = match self.session.read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if depth == 1 => return Err(e),
                Err(e) => {
                    log::warn!("[fs] Skipping unreadable directory {dir}: {e}");
                    continue;
                }
            };

            for entry in entries {
                let relative_path = if relative_dir.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{relative_dir}/{}", entry.name)
                };
                if entry.is_dir && depth < max_depth {
                    queue.push_back((entry.path.clone(), relative_path.clone(), depth + 1));
                }
                found.push(WalkEntry {
                    relative_path,
                    depth,
                    entry,
                });
            }
        }
        Ok(found)
    }

    /// Download one file to `local_path`, creating its parent directory.
    pub async fn download_file(&self, remote: &str, local_path: &Path) -> CoreResult<u64> {
        let bytes = self.session.read_file(remote).await?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(local_io)?;
        }
        tokio::fs::write(local_path, &bytes).await.map_err(local_io)?;
        log::debug!(
            "[fs] Downloaded {remote} -> {} ({} bytes)",
            local_path.display(),
            bytes.len()
        );
        Ok(bytes.len() as u64)
    }

    /// Recursively download the directory `remote` into `local_dir`.
    pub async fn download_dir(&self, remote: &str, local_dir: &Path) -> CoreResult<DownloadSummary> {
        let mut summary = DownloadSummary {
            local_path: local_dir.to_path_buf(),
            ..DownloadSummary::default()
        };
        let mut pending = vec![(remote.to_string(), local_dir.to_path_buf())];

        while let Some((remote_dir, local)) = pending.pop() {
            tokio::fs::create_dir_all(&local).await.map_err(local_io)?;
            summary.directories += 1;

            for entry in self.session.read_dir(&remote_dir).await? {
                let target = local.join(&entry.name);
                if entry.is_dir {
                    pending.push((entry.path, target));
                } else {
                    summary.bytes += self.download_file(&entry.path, &target).await?;
                    summary.files += 1;
                }
            }
        }

        log::info!(
            "[fs] Downloaded {remote}: {} file(s), {} bytes",
            summary.files,
            summary.bytes
        );
        Ok(summary)
    }

    /// Download a file or directory into `local_dest`, keeping its name.
    pub async fn download(&self, remote: &str, local_dest: &Path) -> CoreResult<DownloadSummary> {
        let stat = self.session.stat(remote).await?;
        let name = remote_path::file_name(remote);
        if name.is_empty() || name == "." || name == ".." {
            return Err(CoreError::ValidationError(format!(
                "Cannot derive a local name from remote path '{remote}'"
            )));
        }
        let target = local_dest.join(name);

        if stat.is_dir {
            self.download_dir(remote, &target).await
        } else {
            let bytes = self.download_file(remote, &target).await?;
            Ok(DownloadSummary {
                local_path: target,
                files: 1,
                directories: 0,
                bytes,
            })
        }
    }
}

fn local_io(e: std::io::Error) -> CoreError {
    CoreError::RemoteIo(format!("local write failed: {e}"))
}
