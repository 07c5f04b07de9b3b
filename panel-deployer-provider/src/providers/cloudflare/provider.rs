//! Cloudflare `DnsBackend` implementation

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{DnsBackend, ErrorContext};
use crate::types::{BackendCapability, BackendKind, CreatedDnsRecord, DnsRecord};

use super::types::CreateRecordBody;
use super::{CloudflareClient, CloudflareDnsRecord, CloudflareZone};

#[async_trait]
impl DnsBackend for CloudflareClient {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Structured
    }

    async fn probe(&self, zone_id: &str) -> Result<BackendCapability> {
        let context = ErrorContext {
            zone_id: Some(zone_id.to_string()),
            ..ErrorContext::default()
        };
        match self.get::<CloudflareZone>(&format!("/zones/{zone_id}"), context).await {
            Ok(zone) => {
                log::info!(
                    "[cloudflare] Zone {} ({}) is {} via {}",
                    zone.name,
                    zone.id,
                    zone.status,
                    self.credentials.method_name()
                );
                Ok(BackendCapability::Supported)
            }
            Err(e) if e.is_shape_mismatch() => Ok(BackendCapability::ShapeMismatch {
                detail: e.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn create_record(&self, zone_id: &str, record: &DnsRecord) -> Result<CreatedDnsRecord> {
        let body = CreateRecordBody {
            record_type: record.record_type.as_str(),
            name: &record.name,
            content: &record.content,
            ttl: record.ttl,
            proxied: record.proxied,
        };
        let context = ErrorContext {
            record_name: Some(record.name.clone()),
            zone_id: Some(zone_id.to_string()),
        };

        let cf_record: CloudflareDnsRecord = self
            .post(&format!("/zones/{zone_id}/dns_records"), &body, context)
            .await?;

        Ok(CreatedDnsRecord {
            id: cf_record.id,
            name: cf_record.name,
            record_type: cf_record.record_type,
            content: cf_record.content,
            proxied: cf_record.proxied,
        })
    }
}
