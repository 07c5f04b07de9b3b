//! SSH transport for panel-deployer
//!
//! Implements the core [`RemoteConnector`](panel_deployer_core::RemoteConnector)
//! and [`RemoteSession`](panel_deployer_core::RemoteSession) traits on top of
//! libssh2: commands run over exec channels, file operations over SFTP.
//! Reads can be spread over extra connections with
//! [`SshConnector::with_read_lanes`].

mod connector;
mod error;
mod pool;
mod session;

pub use connector::{SshConnector, host_key_fingerprint};
pub use session::SshSession;
