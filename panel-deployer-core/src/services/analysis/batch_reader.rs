//! Throttled, retrying reader for small JSON metadata files

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::error::CoreError;
use crate::traits::RemoteSession;
use crate::types::AnalysisConfig;

/// Outcome of reading one metadata file.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataRead {
    Present(serde_json::Value),
    /// The file does not exist.
    Missing,
    /// Every attempt failed, or the content is not JSON.
    Unreadable(String),
}

impl MetadataRead {
    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing | Self::Unreadable(_) => None,
        }
    }
}

/// Reads many files over one session without flooding it.
///
/// Paths are split into fixed-size batches processed one after another;
/// within a batch, reads run concurrently but never more than
/// `concurrency` at once. Failed reads are retried after a fixed delay.
/// Not-found and invalid JSON are final on the first attempt.
#[derive(Debug, Clone)]
pub struct BatchReader {
    concurrency: usize,
    batch_size: usize,
    retries: u32,
    retry_delay: Duration,
}

impl BatchReader {
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            batch_size: config.batch_size.max(1),
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Read every path. The result has one entry per distinct path.
    pub async fn read_all(
        &self,
        session: &dyn RemoteSession,
        paths: &[String],
    ) -> HashMap<String, MetadataRead> {
        let semaphore = Semaphore::new(self.concurrency);
        let mut results = HashMap::with_capacity(paths.len());

        for batch in paths.chunks(self.batch_size) {
            let reads = batch
                .iter()
                .map(|path| self.read_with_retry(session, path, &semaphore));
            for (path, read) in batch.iter().zip(join_all(reads).await) {
                results.insert(path.clone(), read);
            }
        }
        results
    }

    async fn read_with_retry(
        &self,
        session: &dyn RemoteSession,
        path: &str,
        semaphore: &Semaphore,
    ) -> MetadataRead {
        let mut attempt = 0;
        loop {
            let read = {
                let Ok(_permit) = semaphore.acquire().await else {
                    return MetadataRead::Unreadable("reader shut down".to_string());
                };
                session.read_file(path).await
            };

            match read {
                Ok(bytes) => {
                    return match serde_json::from_slice(&bytes) {
                        Ok(value) => MetadataRead::Present(value),
                        Err(e) => {
                            log::debug!("[analysis] {path} is not valid JSON: {e}");
                            MetadataRead::Unreadable(format!("invalid JSON: {e}"))
                        }
                    };
                }
                Err(CoreError::NotFound(_)) => return MetadataRead::Missing,
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::debug!(
                        "[analysis] Read of {path} failed (attempt {attempt}/{}), retrying: {e}",
                        self.retries + 1
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    log::warn!(
                        "[analysis] Giving up on {path} after {} attempt(s): {e}",
                        attempt + 1
                    );
                    return MetadataRead::Unreadable(e.to_string());
                }
            }
        }
    }
}
