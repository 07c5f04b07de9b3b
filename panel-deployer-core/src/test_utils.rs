//! Test helpers
//!
//! Mock implementations of the transport and DNS seams plus factories for
//! a ready-to-use `ServiceContext`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use panel_deployer_provider::{
    BackendCapability, BackendKind, CreatedDnsRecord, DnsBackend, DnsCredentials, DnsRecord,
    ProviderError,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::registry::ModuleRegistry;
use crate::services::ServiceContext;
use crate::traits::{DnsBackendFactory, InMemoryConfigService, RemoteConnector, RemoteSession};
use crate::types::{AppConfig, CommandOutput, ConnectionConfig, RemoteEntry, RemoteFileStat};
use crate::utils::remote_path;

// ===== MockRemote =====

#[derive(Debug, Clone)]
enum Scripted {
    Respond(CommandOutput),
    Hang,
    Disconnect,
}

/// In-memory remote host: scripted command responses and a file tree.
///
/// Commands are matched by substring against the scripted patterns in
/// registration order; unmatched commands succeed with empty output.
pub struct MockRemote {
    scripts: RwLock<Vec<(String, Scripted)>>,
    commands: RwLock<Vec<String>>,
    dirs: RwLock<BTreeSet<String>>,
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    created_dirs: RwLock<Vec<String>>,
    /// Remaining injected failures per path
    read_failures: RwLock<HashMap<String, usize>>,
    read_attempts: RwLock<HashMap<String, usize>>,
    read_delay: RwLock<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    closed: AtomicBool,
}

impl MockRemote {
    pub fn new() -> Self {
        Self {
            scripts: RwLock::new(Vec::new()),
            commands: RwLock::new(Vec::new()),
            dirs: RwLock::new(BTreeSet::from(["/".to_string()])),
            files: RwLock::new(BTreeMap::new()),
            created_dirs: RwLock::new(Vec::new()),
            read_failures: RwLock::new(HashMap::new()),
            read_attempts: RwLock::new(HashMap::new()),
            read_delay: RwLock::new(Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub async fn respond(&self, pattern: &str, output: CommandOutput) {
        self.script(pattern, Scripted::Respond(output)).await;
    }

    /// Commands matching `pattern` never complete.
    pub async fn hang_on(&self, pattern: &str) {
        self.script(pattern, Scripted::Hang).await;
    }

    /// Commands matching `pattern` drop the connection.
    pub async fn disconnect_on(&self, pattern: &str) {
        self.script(pattern, Scripted::Disconnect).await;
    }

    /// Later scripts take precedence over earlier ones matching the same command.
    async fn script(&self, pattern: &str, scripted: Scripted) {
        self.scripts
            .write()
            .await
            .push((pattern.to_string(), scripted));
    }

    /// Every command received, in order
    pub async fn commands(&self) -> Vec<String> {
        self.commands.read().await.clone()
    }

    /// Add a file, creating its parent directories.
    pub async fn add_file(&self, path: &str, content: &str) {
        if let Some(parent) = remote_path::parent(path) {
            self.add_dir(parent).await;
        }
        self.files
            .write()
            .await
            .insert(path.to_string(), content.as_bytes().to_vec());
    }

    /// Add a directory and its ancestors.
    pub async fn add_dir(&self, path: &str) {
        let mut dirs = self.dirs.write().await;
        let mut current = Some(remote_path::trim_trailing_slash(path));
        while let Some(dir) = current {
            if dir.is_empty() || !dirs.insert(dir.to_string()) {
                break;
            }
            current = remote_path::parent(dir);
        }
    }

    /// Directories created through `mkdir`, in order
    pub async fn created_dirs(&self) -> Vec<String> {
        self.created_dirs.read().await.clone()
    }

    /// Fail the next `times` reads of `path`.
    pub async fn fail_reads(&self, path: &str, times: usize) {
        self.read_failures
            .write()
            .await
            .insert(path.to_string(), times);
    }

    pub async fn read_attempts(&self, path: &str) -> usize {
        self.read_attempts
            .read()
            .await
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub async fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.write().await = delay;
    }

    /// Highest number of concurrent `read_file` calls observed
    pub fn max_in_flight_reads(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_closed() {
            return Err(CoreError::NetworkError("session is closed".to_string()));
        }
        Ok(())
    }

    async fn entry_for(&self, path: &str) -> Option<RemoteEntry> {
        let name = remote_path::file_name(path).to_string();
        if self.dirs.read().await.contains(path) {
            return Some(RemoteEntry {
                name,
                path: path.to_string(),
                is_dir: true,
                size: 4096,
            });
        }
        self.files.read().await.get(path).map(|content| RemoteEntry {
            name,
            path: path.to_string(),
            is_dir: false,
            size: content.len() as u64,
        })
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteSession for MockRemote {
    fn host(&self) -> &str {
        "mock-host"
    }

    fn is_alive(&self) -> bool {
        !self.is_closed()
    }

    async fn exec(&self, command: &str) -> CoreResult<CommandOutput> {
        self.ensure_open()?;
        self.commands.write().await.push(command.to_string());

        let scripted = self
            .scripts
            .read()
            .await
            .iter()
            .rev()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Respond(output)) => Ok(output),
            Some(Scripted::Hang) => std::future::pending().await,
            Some(Scripted::Disconnect) => {
                self.closed.store(true, Ordering::SeqCst);
                Err(CoreError::NetworkError("connection reset by peer".to_string()))
            }
            None => Ok(CommandOutput::success("")),
        }
    }

    async fn stat(&self, path: &str) -> CoreResult<RemoteFileStat> {
        self.ensure_open()?;
        let path = remote_path::trim_trailing_slash(path);
        match self.entry_for(path).await {
            Some(entry) => Ok(RemoteFileStat {
                is_dir: entry.is_dir,
                size: entry.size,
                permissions: Some(if entry.is_dir { 0o755 } else { 0o644 }),
            }),
            None => Err(CoreError::NotFound(path.to_string())),
        }
    }

    async fn mkdir(&self, path: &str, _mode: i32) -> CoreResult<()> {
        self.ensure_open()?;
        let path = remote_path::trim_trailing_slash(path);
        if self.entry_for(path).await.is_some() {
            return Err(CoreError::AlreadyExists(path.to_string()));
        }
        let parent = remote_path::parent(path).unwrap_or("/");
        if !self.dirs.read().await.contains(parent) {
            return Err(CoreError::NotFound(parent.to_string()));
        }
        self.dirs.write().await.insert(path.to_string());
        self.created_dirs.write().await.push(path.to_string());
        Ok(())
    }

    async fn read_dir(&self, path: &str) -> CoreResult<Vec<RemoteEntry>> {
        self.ensure_open()?;
        let path = remote_path::trim_trailing_slash(path);
        if !self.dirs.read().await.contains(path) {
            return Err(CoreError::NotFound(path.to_string()));
        }

        let is_child = |candidate: &str| {
            candidate != path && remote_path::parent(candidate) == Some(path)
        };
        let children: Vec<String> = self
            .dirs
            .read()
            .await
            .iter()
            .chain(self.files.read().await.keys())
            .filter(|candidate| is_child(candidate.as_str()))
            .cloned()
            .collect();

        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            if let Some(entry) = self.entry_for(&child).await {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn read_file(&self, path: &str) -> CoreResult<Vec<u8>> {
        self.ensure_open()?;
        *self
            .read_attempts
            .write()
            .await
            .entry(path.to_string())
            .or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.read_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(remaining) = self.read_failures.write().await.get_mut(path)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(CoreError::RemoteIo(format!("injected read failure: {path}")));
        }

        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(path.to_string()))
    }

    async fn close(&self) -> CoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RemoteSession for Arc<MockRemote> {
    fn host(&self) -> &str {
        self.as_ref().host()
    }

    fn is_alive(&self) -> bool {
        self.as_ref().is_alive()
    }

    async fn exec(&self, command: &str) -> CoreResult<CommandOutput> {
        self.as_ref().exec(command).await
    }

    async fn stat(&self, path: &str) -> CoreResult<RemoteFileStat> {
        self.as_ref().stat(path).await
    }

    async fn mkdir(&self, path: &str, mode: i32) -> CoreResult<()> {
        self.as_ref().mkdir(path, mode).await
    }

    async fn read_dir(&self, path: &str) -> CoreResult<Vec<RemoteEntry>> {
        self.as_ref().read_dir(path).await
    }

    async fn read_file(&self, path: &str) -> CoreResult<Vec<u8>> {
        self.as_ref().read_file(path).await
    }

    async fn close(&self) -> CoreResult<()> {
        RemoteSession::close(self.as_ref()).await
    }
}

// ===== MockConnector =====

/// Hands out the same `MockRemote` on every connect.
pub struct MockConnector {
    remote: Arc<MockRemote>,
    connects: AtomicUsize,
    next_error: RwLock<Option<CoreError>>,
}

impl MockConnector {
    pub fn new(remote: Arc<MockRemote>) -> Self {
        Self {
            remote,
            connects: AtomicUsize::new(0),
            next_error: RwLock::new(None),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub async fn fail_next_connect(&self, error: CoreError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl RemoteConnector for MockConnector {
    async fn connect(&self, _config: &ConnectionConfig) -> CoreResult<Box<dyn RemoteSession>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.remote.reopen();
        Ok(Box::new(Arc::clone(&self.remote)))
    }
}

// ===== MockDnsBackend =====

pub struct MockDnsBackend {
    kind: BackendKind,
    created: Mutex<Vec<DnsRecord>>,
    fail_names: Mutex<HashSet<String>>,
    shape_mismatch: AtomicBool,
}

impl MockDnsBackend {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            created: Mutex::new(Vec::new()),
            fail_names: Mutex::new(HashSet::new()),
            shape_mismatch: AtomicBool::new(false),
        }
    }

    /// Records accepted so far, in order
    pub fn created(&self) -> Vec<DnsRecord> {
        self.created.lock().unwrap().clone()
    }

    /// Reject records with this fully-qualified name.
    pub fn fail_on(&self, fqdn: &str) {
        self.fail_names.lock().unwrap().insert(fqdn.to_string());
    }

    /// Answer every create with an unreadable response.
    pub fn reject_shape(&self) {
        self.shape_mismatch.store(true, Ordering::SeqCst);
    }

    fn provider_name(&self) -> &'static str {
        match self.kind {
            BackendKind::Structured => "mock-structured",
            BackendKind::DirectHttps => "mock-direct",
        }
    }
}

#[async_trait]
impl DnsBackend for MockDnsBackend {
    fn id(&self) -> &'static str {
        self.provider_name()
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn probe(&self, _zone_id: &str) -> panel_deployer_provider::Result<BackendCapability> {
        Ok(BackendCapability::Supported)
    }

    async fn create_record(
        &self,
        _zone_id: &str,
        record: &DnsRecord,
    ) -> panel_deployer_provider::Result<CreatedDnsRecord> {
        if self.shape_mismatch.load(Ordering::SeqCst) {
            return Err(ProviderError::ParseError {
                provider: self.provider_name().to_string(),
                detail: "missing field `result`".to_string(),
            });
        }
        if self.fail_names.lock().unwrap().contains(&record.name) {
            return Err(ProviderError::RecordExists {
                provider: self.provider_name().to_string(),
                record_name: record.name.clone(),
                raw_message: Some("An identical record already exists.".to_string()),
            });
        }

        let mut created = self.created.lock().unwrap();
        created.push(record.clone());
        Ok(CreatedDnsRecord {
            id: format!("rec-{}", created.len()),
            name: record.name.clone(),
            record_type: record.record_type.as_str().to_string(),
            content: record.content.clone(),
            proxied: Some(record.proxied),
        })
    }
}

// ===== MockDnsBackendFactory =====

pub struct MockDnsBackendFactory {
    structured: Arc<MockDnsBackend>,
    direct: Arc<MockDnsBackend>,
    selects: AtomicUsize,
    creates: AtomicUsize,
    select_error: Mutex<Option<CoreError>>,
}

impl MockDnsBackendFactory {
    pub fn new() -> Self {
        Self {
            structured: Arc::new(MockDnsBackend::new(BackendKind::Structured)),
            direct: Arc::new(MockDnsBackend::new(BackendKind::DirectHttps)),
            selects: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            select_error: Mutex::new(None),
        }
    }

    /// The backend `select` returns
    pub fn structured(&self) -> &MockDnsBackend {
        &self.structured
    }

    /// The backend `create(DirectHttps)` returns
    pub fn direct(&self) -> &MockDnsBackend {
        &self.direct
    }

    pub fn select_count(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn fail_select(&self, error: CoreError) {
        *self.select_error.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl DnsBackendFactory for MockDnsBackendFactory {
    async fn select(
        &self,
        _credentials: &DnsCredentials,
        _zone_id: &str,
    ) -> CoreResult<Arc<dyn DnsBackend>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.select_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(Arc::clone(&self.structured) as Arc<dyn DnsBackend>)
    }

    fn create(&self, kind: BackendKind, _credentials: &DnsCredentials) -> Arc<dyn DnsBackend> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        match kind {
            BackendKind::Structured => Arc::clone(&self.structured) as Arc<dyn DnsBackend>,
            BackendKind::DirectHttps => Arc::clone(&self.direct) as Arc<dyn DnsBackend>,
        }
    }
}

// ===== Factories =====

/// Fully configured setup pointing at `panel.example.com`.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();

    config.connection.host = "panel.example.com".to_string();
    config.connection.username = "root".to_string();
    config.connection.password = "secret".to_string();

    config.paths.base_path = "/var/www".to_string();
    config.paths.module_source = "/opt/modules".to_string();

    config.dns.api_token = Some("test-token".to_string());
    config.dns.zone_id = "zone-123".to_string();
    config.dns.root_domain = "example.com".to_string();
    config.dns.ipv4_address = Some("203.0.113.10".to_string());
    config.dns.ipv6_address = Some("2001:db8::10".to_string());

    config.provisioning.parent_domain = "example.com".to_string();
    config
}

pub fn create_test_context(
    remote: Arc<MockRemote>,
    config: AppConfig,
) -> (Arc<ServiceContext>, Arc<MockConnector>) {
    create_test_context_with_dns(remote, config, Arc::new(MockDnsBackendFactory::new()))
}

pub fn create_test_context_with_dns(
    remote: Arc<MockRemote>,
    config: AppConfig,
    dns_factory: Arc<MockDnsBackendFactory>,
) -> (Arc<ServiceContext>, Arc<MockConnector>) {
    let connector = Arc::new(MockConnector::new(remote));
    let ctx = ServiceContext::new(
        Arc::clone(&connector) as Arc<dyn RemoteConnector>,
        Arc::new(InMemoryConfigService::new(config)),
        Arc::new(ModuleRegistry::builtin()),
        dns_factory,
    );
    (Arc::new(ctx), connector)
}
