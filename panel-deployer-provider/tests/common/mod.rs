//! Shared helpers for live Cloudflare tests

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use panel_deployer_provider::{
    BackendKind, DnsBackend, DnsCredentials, DnsRecord, DnsRecordType, create_backend,
    CF_API_BASE,
};

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

/// Unique, throwaway record label.
pub fn generate_test_label() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_pd-test-{}", &uuid.to_string()[..8])
}

pub struct TestContext {
    pub credentials: DnsCredentials,
    pub zone_id: String,
    pub root_domain: String,
}

impl TestContext {
    /// Built from `CLOUDFLARE_API_TOKEN` (or `CLOUDFLARE_EMAIL` + `CLOUDFLARE_API_KEY`),
    /// `CLOUDFLARE_ZONE_ID` and `TEST_DOMAIN`.
    pub fn from_env() -> Option<Self> {
        let credentials = DnsCredentials::from_parts(
            env::var("CLOUDFLARE_API_TOKEN").ok().as_deref(),
            env::var("CLOUDFLARE_EMAIL").ok().as_deref(),
            env::var("CLOUDFLARE_API_KEY").ok().as_deref(),
        )?;
        Some(Self {
            credentials,
            zone_id: env::var("CLOUDFLARE_ZONE_ID").ok()?,
            root_domain: env::var("TEST_DOMAIN").ok()?,
        })
    }

    pub fn backend(&self, kind: BackendKind) -> Arc<dyn DnsBackend> {
        create_backend(kind, self.credentials.clone(), CF_API_BASE)
    }

    pub fn test_a_record(&self, label: &str) -> DnsRecord {
        DnsRecord {
            name: format!("{label}.{}", self.root_domain),
            record_type: DnsRecordType::A,
            content: "192.0.2.1".to_string(),
            ttl: 120,
            proxied: false,
        }
    }
}
