//! Shared helpers for live SSH tests

#![allow(dead_code)]

use std::env;

use panel_deployer_core::types::ConnectionConfig;

/// Skip the test when any of the env vars is missing.
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("Skipping test: missing environment variable {}", $var);
                return;
            }
        )+
    };
}

/// Built from `SSH_TEST_HOST`, `SSH_TEST_USER` and either `SSH_TEST_PASSWORD`
/// or `SSH_TEST_KEY`. `SSH_TEST_PORT` defaults to 22.
pub fn connection_from_env() -> Option<ConnectionConfig> {
    let password = env::var("SSH_TEST_PASSWORD").unwrap_or_default();
    let private_key_path = env::var("SSH_TEST_KEY").ok();
    if password.is_empty() && private_key_path.is_none() {
        return None;
    }
    Some(ConnectionConfig {
        host: env::var("SSH_TEST_HOST").ok()?,
        port: env::var("SSH_TEST_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(22),
        username: env::var("SSH_TEST_USER").ok()?,
        password,
        private_key_path,
        ..ConnectionConfig::default()
    })
}
