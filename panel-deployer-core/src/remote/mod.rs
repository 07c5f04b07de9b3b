//! Remote command and file primitives layered on [`RemoteSession`]

mod executor;
mod fs;

pub use executor::CommandExecutor;
pub use fs::{DownloadSummary, RemoteFs, WalkEntry};

use crate::traits::RemoteSession;

/// Close a session, logging (not returning) any failure.
///
/// Used on every exit path of operations that opened their own session.
pub async fn close_quietly(session: &dyn RemoteSession) {
    if let Err(e) = session.close().await {
        log::warn!("[remote] Failed to close session to {}: {e}", session.host());
    }
}
