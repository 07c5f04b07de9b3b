//! DNS record creation for a new subdomain

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use panel_deployer_provider::{BackendKind, DnsBackend, DnsCredentials, DnsRecord, DnsRecordType};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::services::provisioning_service::is_valid_subdomain_label;
use crate::traits::ConfigChangeListener;
use crate::types::{
    ConfigSection, DnsConfig, DnsCreationResult, DnsRecordOutcome, DnsRecordTemplate,
    SUBDOMAIN_PLACEHOLDER, TemplateContent,
};
use crate::utils::CancelFlag;

/// Records published for every new subdomain, in creation order.
pub static DNS_RECORD_TEMPLATES: &[DnsRecordTemplate] = &[
    DnsRecordTemplate {
        name_pattern: "admin.{subdomain}",
        record_type: DnsRecordType::A,
        content: TemplateContent::Ipv4,
        proxied: None,
    },
    DnsRecordTemplate {
        name_pattern: "localhost.{subdomain}",
        record_type: DnsRecordType::A,
        content: TemplateContent::Literal("127.0.0.1"),
        proxied: Some(false),
    },
    DnsRecordTemplate {
        name_pattern: "{subdomain}",
        record_type: DnsRecordType::A,
        content: TemplateContent::Ipv4,
        proxied: None,
    },
    DnsRecordTemplate {
        name_pattern: "www.{subdomain}",
        record_type: DnsRecordType::A,
        content: TemplateContent::Ipv4,
        proxied: None,
    },
    DnsRecordTemplate {
        name_pattern: "{subdomain}",
        record_type: DnsRecordType::Aaaa,
        content: TemplateContent::Ipv6,
        proxied: None,
    },
    DnsRecordTemplate {
        name_pattern: "www.{subdomain}",
        record_type: DnsRecordType::Aaaa,
        content: TemplateContent::Ipv6,
        proxied: None,
    },
];

/// A template with the subdomain substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRecord {
    /// Name relative to the zone apex, e.g. `www.demo`.
    pub name: String,
    pub record_type: DnsRecordType,
    /// `None` when the address the template needs is not configured.
    pub content: Option<String>,
    pub proxied: bool,
}

impl PlannedRecord {
    pub fn fqdn(&self, root_domain: &str) -> String {
        format!("{}.{}", self.name, root_domain.trim_end_matches('.'))
    }
}

/// Expand every template for `subdomain`.
pub fn expand_templates(subdomain: &str, config: &DnsConfig) -> Vec<PlannedRecord> {
    let address = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    DNS_RECORD_TEMPLATES
        .iter()
        .map(|template| PlannedRecord {
            name: template.name_pattern.replace(SUBDOMAIN_PLACEHOLDER, subdomain),
            record_type: template.record_type,
            content: match template.content {
                TemplateContent::Ipv4 => address(&config.ipv4_address),
                TemplateContent::Ipv6 => address(&config.ipv6_address),
                TemplateContent::Literal(value) => Some(value.to_string()),
            },
            proxied: template.proxied.unwrap_or(config.proxied),
        })
        .collect()
}

/// Creates the DNS records a subdomain needs
///
/// The backend chosen by the factory's probe is cached until the `dns`
/// configuration section changes.
pub struct DnsRecordService {
    ctx: Arc<ServiceContext>,
    backend: RwLock<Option<Arc<dyn DnsBackend>>>,
}

impl DnsRecordService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            backend: RwLock::new(None),
        }
    }

    /// Create every templated record for `subdomain`.
    ///
    /// Configuration problems fail before any provider call. Each record
    /// is attempted independently; the result lists every outcome.
    pub async fn create_records(
        &self,
        subdomain: &str,
        cancel: &CancelFlag,
    ) -> CoreResult<DnsCreationResult> {
        let config = self.ctx.config().await;
        let dns = &config.dns;

        let subdomain = subdomain.trim().to_ascii_lowercase();
        if !is_valid_subdomain_label(&subdomain) {
            return Err(CoreError::ValidationError(format!(
                "Invalid subdomain label: '{subdomain}'"
            )));
        }
        let root_domain = dns.root_domain.trim().trim_end_matches('.');
        if root_domain.is_empty() {
            return Err(CoreError::Configuration(
                "dns.rootDomain is not configured".to_string(),
            ));
        }
        let Some(credentials) = dns.credentials() else {
            return Err(CoreError::Configuration(
                "No DNS authentication configured (apiToken, or email + apiKey)".to_string(),
            ));
        };
        let zone_id = dns.zone_id.trim();
        if zone_id.is_empty() {
            return Err(CoreError::Configuration(
                "dns.zoneId is not configured".to_string(),
            ));
        }

        let mut backend = self.backend(&credentials, zone_id).await?;
        log::info!(
            "[dns] Creating records for {subdomain}.{root_domain} via {} ({})",
            backend.id(),
            credentials.method_name()
        );

        let planned = expand_templates(&subdomain, dns);
        let mut outcomes = Vec::with_capacity(planned.len());
        let mut cancelled = false;

        for record in planned {
            let fqdn = record.fqdn(root_domain);
            if cancelled || cancel.is_cancelled() {
                cancelled = true;
                outcomes.push(failed_outcome(record, fqdn, &CoreError::Cancelled.to_string()));
                continue;
            }
            let Some(content) = record.content.clone() else {
                let missing = match record.record_type {
                    DnsRecordType::A => "dns.ipv4Address",
                    DnsRecordType::Aaaa => "dns.ipv6Address",
                };
                log::warn!(
                    "[dns] Skipping {} {fqdn}: {missing} is not configured",
                    record.record_type
                );
                outcomes.push(failed_outcome(
                    record,
                    fqdn,
                    &format!("{missing} is not configured"),
                ));
                continue;
            };

            let request = DnsRecord {
                name: fqdn.clone(),
                record_type: record.record_type,
                content,
                ttl: dns.default_ttl,
                proxied: record.proxied,
            };

            match self.create_one(&mut backend, &credentials, zone_id, &request).await {
                Ok(created) => {
                    log::info!(
                        "[dns] Created {} {fqdn} -> {} ({})",
                        request.record_type,
                        request.content,
                        created.id
                    );
                    outcomes.push(DnsRecordOutcome {
                        name: record.name,
                        fqdn,
                        record_type: request.record_type,
                        content: request.content,
                        proxied: request.proxied,
                        success: true,
                        record_id: Some(created.id),
                        backend: Some(backend.kind()),
                        error: None,
                    });
                }
                Err(e) => {
                    if e.is_expected() {
                        log::warn!("[dns] {} {fqdn} failed: {e}", request.record_type);
                    } else {
                        log::error!("[dns] {} {fqdn} failed: {e}", request.record_type);
                    }
                    outcomes.push(DnsRecordOutcome {
                        backend: Some(backend.kind()),
                        ..failed_outcome(record, fqdn, &e.to_string())
                    });
                }
            }
        }

        let fqdn = format!("{subdomain}.{root_domain}");
        let result = DnsCreationResult::from_outcomes(&subdomain, fqdn, outcomes, cancelled);
        log::info!(
            "[dns] {}/{} record(s) created for {}{}",
            result.created_count,
            result.total_count,
            result.fqdn,
            if result.cancelled { " (cancelled)" } else { "" }
        );
        Ok(result)
    }

    /// Create through the current backend, switching to the direct backend
    /// once if the structured client cannot read the response.
    async fn create_one(
        &self,
        backend: &mut Arc<dyn DnsBackend>,
        credentials: &DnsCredentials,
        zone_id: &str,
        request: &DnsRecord,
    ) -> CoreResult<panel_deployer_provider::CreatedDnsRecord> {
        match backend.create_record(zone_id, request).await {
            Ok(created) => Ok(created),
            Err(e) if e.is_shape_mismatch() && backend.kind() == BackendKind::Structured => {
                log::warn!(
                    "[dns] Structured client could not read the response ({e}), switching to direct HTTPS"
                );
                let direct = self
                    .ctx
                    .dns_backend_factory
                    .create(BackendKind::DirectHttps, credentials);
                *self.backend.write().await = Some(Arc::clone(&direct));
                *backend = direct;
                Ok(backend.create_record(zone_id, request).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn backend(
        &self,
        credentials: &DnsCredentials,
        zone_id: &str,
    ) -> CoreResult<Arc<dyn DnsBackend>> {
        if let Some(backend) = self.backend.read().await.as_ref() {
            return Ok(Arc::clone(backend));
        }

        let mut slot = self.backend.write().await;
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }
        let backend = self
            .ctx
            .dns_backend_factory
            .select(credentials, zone_id)
            .await?;
        log::debug!("[dns] Selected backend {}", backend.id());
        *slot = Some(Arc::clone(&backend));
        Ok(backend)
    }
}

#[async_trait]
impl ConfigChangeListener for DnsRecordService {
    async fn on_config_changed(&self, section: ConfigSection) {
        if section == ConfigSection::Dns && self.backend.write().await.take().is_some() {
            log::debug!("[dns] Configuration changed, dropping cached backend");
        }
    }
}

fn failed_outcome(record: PlannedRecord, fqdn: String, error: &str) -> DnsRecordOutcome {
    DnsRecordOutcome {
        name: record.name,
        fqdn,
        record_type: record.record_type,
        content: record.content.unwrap_or_default(),
        proxied: record.proxied,
        success: false,
        record_id: None,
        backend: None,
        error: Some(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        MockDnsBackendFactory, MockRemote, create_test_context_with_dns, test_config,
    };
    use crate::traits::ConfigService;
    use crate::types::{AppConfig, SectionUpdate};

    fn service_with(config: AppConfig) -> (DnsRecordService, Arc<MockDnsBackendFactory>) {
        let factory = Arc::new(MockDnsBackendFactory::new());
        let (ctx, _) =
            create_test_context_with_dns(Arc::new(MockRemote::new()), config, Arc::clone(&factory));
        (DnsRecordService::new(ctx), factory)
    }

    #[test]
    fn expansion_yields_four_a_and_two_aaaa() {
        let config = test_config();
        let planned = expand_templates("demo", &config.dns);

        let names_of = |t: DnsRecordType| -> Vec<&str> {
            planned
                .iter()
                .filter(|r| r.record_type == t)
                .map(|r| r.name.as_str())
                .collect()
        };
        assert_eq!(
            names_of(DnsRecordType::A),
            vec!["admin.demo", "localhost.demo", "demo", "www.demo"]
        );
        assert_eq!(names_of(DnsRecordType::Aaaa), vec!["demo", "www.demo"]);
        assert_eq!(planned[0].fqdn("example.com"), "admin.demo.example.com");
    }

    #[test]
    fn localhost_record_is_pinned_and_unproxied() {
        let planned = expand_templates("demo", &test_config().dns);
        let localhost = planned.iter().find(|r| r.name == "localhost.demo").unwrap();
        assert_eq!(localhost.content.as_deref(), Some("127.0.0.1"));
        assert!(!localhost.proxied);
        assert!(planned.iter().filter(|r| r.name != "localhost.demo").all(|r| r.proxied));
    }

    #[tokio::test]
    async fn missing_authentication_fails_without_network_call() {
        let mut config = test_config();
        config.dns.api_token = None;
        config.dns.email = None;
        config.dns.api_key = None;
        let (service, factory) = service_with(config);

        let err = service.create_records("demo", &CancelFlag::new()).await.unwrap_err();

        assert!(matches!(err, CoreError::Configuration(_)));
        assert_eq!(factory.select_count(), 0);
        assert_eq!(factory.create_count(), 0);
    }

    #[tokio::test]
    async fn missing_root_domain_fails_without_network_call() {
        let mut config = test_config();
        config.dns.root_domain = String::new();
        let (service, factory) = service_with(config);

        let err = service.create_records("demo", &CancelFlag::new()).await.unwrap_err();

        assert!(matches!(err, CoreError::Configuration(_)));
        assert_eq!(factory.select_count(), 0);
    }

    #[tokio::test]
    async fn creates_every_record_with_fully_qualified_names() {
        let (service, factory) = service_with(test_config());

        let result = service.create_records("Demo", &CancelFlag::new()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.fqdn, "demo.example.com");
        assert_eq!(result.created_count, 6);
        assert_eq!(result.total_count, 6);
        let sent: Vec<String> = factory.structured().created().into_iter().map(|r| r.name).collect();
        assert_eq!(
            sent,
            vec![
                "admin.demo.example.com",
                "localhost.demo.example.com",
                "demo.example.com",
                "www.demo.example.com",
                "demo.example.com",
                "www.demo.example.com",
            ]
        );
    }

    #[tokio::test]
    async fn one_failing_record_does_not_abort_the_rest() {
        let (service, factory) = service_with(test_config());
        factory.structured().fail_on("admin.demo.example.com");

        let result = service.create_records("demo", &CancelFlag::new()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.created_count, 5);
        assert_eq!(result.total_count, 6);
        let admin = &result.records[0];
        assert!(!admin.success);
        assert!(admin.error.is_some());
        assert!(result.records[1..].iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn missing_ipv6_fails_only_aaaa_records() {
        let mut config = test_config();
        config.dns.ipv6_address = None;
        let (service, factory) = service_with(config);

        let result = service.create_records("demo", &CancelFlag::new()).await.unwrap();

        assert_eq!(result.created_count, 4);
        assert!(
            result
                .records
                .iter()
                .filter(|r| r.record_type == DnsRecordType::Aaaa)
                .all(|r| !r.success && r.error.as_deref().is_some_and(|e| e.contains("ipv6Address")))
        );
        assert_eq!(factory.structured().created().len(), 4);
    }

    #[tokio::test]
    async fn all_records_failing_is_overall_failure() {
        let (service, factory) = service_with(test_config());
        for name in ["admin.demo", "localhost.demo", "demo", "www.demo"] {
            factory.structured().fail_on(&format!("{name}.example.com"));
        }

        let result = service.create_records("demo", &CancelFlag::new()).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.created_count, 0);
        assert_eq!(result.records.len(), 6);
    }

    #[tokio::test]
    async fn shape_mismatch_switches_to_direct_backend() {
        let (service, factory) = service_with(test_config());
        factory.structured().reject_shape();

        let result = service.create_records("demo", &CancelFlag::new()).await.unwrap();

        assert_eq!(result.created_count, 6);
        assert_eq!(factory.create_count(), 1);
        assert_eq!(factory.direct().created().len(), 6);
        assert!(result.records.iter().all(|r| r.backend == Some(BackendKind::DirectHttps)));

        // The switch sticks for later calls
        service.create_records("next", &CancelFlag::new()).await.unwrap();
        assert_eq!(factory.select_count(), 1);
        assert_eq!(factory.direct().created().len(), 12);
    }

    #[tokio::test]
    async fn cancelled_before_start_creates_nothing() {
        let (service, factory) = service_with(test_config());
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = service.create_records("demo", &cancel).await.unwrap();

        assert!(result.cancelled);
        assert!(!result.success);
        assert!(factory.structured().created().is_empty());
        assert!(result.records.iter().all(|r| r.error.is_some()));
    }

    #[tokio::test]
    async fn invalid_label_is_rejected() {
        let (service, factory) = service_with(test_config());

        let err = service.create_records("bad_label!", &CancelFlag::new()).await.unwrap_err();

        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(factory.select_count(), 0);
    }

    #[tokio::test]
    async fn backend_is_cached_until_dns_section_changes() {
        let config = test_config();
        let factory = Arc::new(MockDnsBackendFactory::new());
        let (ctx, _) = create_test_context_with_dns(
            Arc::new(MockRemote::new()),
            config.clone(),
            Arc::clone(&factory),
        );
        let service = DnsRecordService::new(Arc::clone(&ctx));

        service.create_records("one", &CancelFlag::new()).await.unwrap();
        service.create_records("two", &CancelFlag::new()).await.unwrap();
        assert_eq!(factory.select_count(), 1);

        service.on_config_changed(ConfigSection::Transfer).await;
        service.create_records("three", &CancelFlag::new()).await.unwrap();
        assert_eq!(factory.select_count(), 1);

        ctx.config
            .update_section(SectionUpdate::Dns(config.dns.clone()))
            .await;
        service.on_config_changed(ConfigSection::Dns).await;
        service.create_records("four", &CancelFlag::new()).await.unwrap();
        assert_eq!(factory.select_count(), 2);
    }

    #[tokio::test]
    async fn probe_failure_is_fatal() {
        let (service, factory) = service_with(test_config());
        factory.fail_select(CoreError::NetworkError("connection refused".into()));

        let err = service.create_records("demo", &CancelFlag::new()).await.unwrap_err();

        assert!(matches!(err, CoreError::NetworkError(_)));
        assert!(factory.structured().created().is_empty());
    }
}
