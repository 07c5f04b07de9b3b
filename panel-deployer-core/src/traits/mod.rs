//! Platform abstraction layer Trait definition
//!
//! Adapters (SSH transport, config file loading, DNS backends) implement
//! these traits and are injected through `ServiceContext`.

mod config_service;
mod dns_backend_factory;
mod remote;

pub use config_service::{
    ConfigChangeListener, ConfigService, InMemoryConfigService, spawn_config_listener,
};
pub use dns_backend_factory::{DnsBackendFactory, ProbingBackendFactory};
pub use remote::{RemoteConnector, RemoteSession};
