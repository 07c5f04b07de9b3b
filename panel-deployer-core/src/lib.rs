//! Panel Deployer Core Library
//!
//! Provides the deployment logic for IPTV panel hosting, including:
//! - Remote command execution and file operations over an injected session
//! - Module path registry and transfer planning/execution
//! - Domain discovery and structure analysis
//! - DNS record creation and subdomain provisioning
//!
//! This library is transport-independent: the remote session, the
//! configuration source and the DNS backends are abstracted through traits
//! and injected via [`ServiceContext`].

pub mod error;
pub mod registry;
pub mod remote;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use registry::ModuleRegistry;
pub use services::ServiceContext;
pub use traits::{ConfigService, DnsBackendFactory, RemoteConnector, RemoteSession};
