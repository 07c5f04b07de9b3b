//! Configuration service abstract Trait

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use crate::types::{AppConfig, ConfigSection, SectionUpdate};

/// Capacity of the change-notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// Source of configuration for every service.
///
/// Services read a snapshot per operation via [`current`](Self::current)
/// and never cache configuration across operations, except where they
/// subscribe to changes.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Snapshot of the current configuration
    async fn current(&self) -> Arc<AppConfig>;

    /// Replace one section and notify subscribers
    async fn update_section(&self, update: SectionUpdate);

    /// Receive the section identifier of every subsequent change
    fn subscribe(&self) -> broadcast::Receiver<ConfigSection>;
}

/// Reacts to configuration changes.
#[async_trait]
pub trait ConfigChangeListener: Send + Sync {
    async fn on_config_changed(&self, section: ConfigSection);
}

/// In-memory configuration service
///
/// Default implementation; the CLI seeds it from the config file.
pub struct InMemoryConfigService {
    config: RwLock<Arc<AppConfig>>,
    changes: broadcast::Sender<ConfigSection>,
}

impl InMemoryConfigService {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            config: RwLock::new(Arc::new(config)),
            changes,
        }
    }
}

impl Default for InMemoryConfigService {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[async_trait]
impl ConfigService for InMemoryConfigService {
    async fn current(&self) -> Arc<AppConfig> {
        Arc::clone(&*self.config.read().await)
    }

    async fn update_section(&self, update: SectionUpdate) {
        let section = update.section();
        {
            let mut guard = self.config.write().await;
            let mut next = AppConfig::clone(&guard);
            update.apply_to(&mut next);
            *guard = Arc::new(next);
        }
        log::info!("[config] Section '{section}' updated");
        // No receivers is fine
        let _ = self.changes.send(section);
    }

    fn subscribe(&self) -> broadcast::Receiver<ConfigSection> {
        self.changes.subscribe()
    }
}

/// Forward every change from `config` to `listener` until the channel closes.
pub fn spawn_config_listener(
    config: &dyn ConfigService,
    listener: Arc<dyn ConfigChangeListener>,
) -> tokio::task::JoinHandle<()> {
    let mut rx = config.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(section) => listener.on_config_changed(section).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("[config] Listener lagged, {skipped} change(s) skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
