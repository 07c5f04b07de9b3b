//! Subdomain provisioning through the hosting control panel

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::remote::{CommandExecutor, close_quietly};
use crate::services::ServiceContext;
use crate::traits::RemoteSession;
use crate::types::{CreateSubdomainRequest, ProvisioningConfig, ProvisioningResult};
use crate::utils::remote_path;
use crate::utils::shell::quote;

const WEB_ROOT_DIR: &str = "public_html";

/// Whether `label` is a single DNS label: letters, digits and inner hyphens.
pub fn is_valid_subdomain_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn create_domain_command(config: &ProvisioningConfig, fqdn: &str, description: &str) -> String {
    let mut command = format!(
        "{} create-domain --domain {} --parent {} --desc {} --web --dir",
        quote(&config.cli_command),
        quote(fqdn),
        quote(&config.parent_domain),
        quote(description)
    );
    if let Some(template) = config.template.as_deref().filter(|t| !t.is_empty()) {
        command.push_str(&format!(" --template {}", quote(template)));
    }
    if let Some(plan) = config.plan.as_deref().filter(|p| !p.is_empty()) {
        command.push_str(&format!(" --plan {}", quote(plan)));
    }
    if let Some(quotas) = &config.quotas {
        // Quota is in 1 KiB blocks, bandwidth in bytes
        if let Some(disk_mb) = quotas.disk_mb {
            command.push_str(&format!(" --quota {}", disk_mb.saturating_mul(1024)));
        }
        if let Some(bandwidth_mb) = quotas.bandwidth_mb {
            command.push_str(&format!(
                " --bandwidth {}",
                bandwidth_mb.saturating_mul(1024 * 1024)
            ));
        }
    }
    command
}

fn php_primary_command(cli: &str, fqdn: &str, mode: &str, version: &str) -> String {
    format!(
        "{} modify-web --domain {} --php-mode {} --php-version {}",
        quote(cli),
        quote(fqdn),
        quote(mode),
        quote(version)
    )
}

fn php_fallback_command(cli: &str, fqdn: &str, version: &str) -> String {
    format!(
        "{} modify-domain --domain {} --set-php-version {}",
        quote(cli),
        quote(fqdn),
        quote(version)
    )
}

/// Creates subdomains under the configured parent domain
pub struct ProvisioningService {
    ctx: Arc<ServiceContext>,
}

impl ProvisioningService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Create `request.subdomain` under the parent domain and configure PHP.
    ///
    /// A failed `create-domain` is reported as `success = false` with the
    /// captured stderr. PHP configuration is best effort: when both command
    /// forms fail the result carries `php_config_warning` and stays successful.
    pub async fn create_subdomain(
        &self,
        request: &CreateSubdomainRequest,
    ) -> CoreResult<ProvisioningResult> {
        let config = self.ctx.config().await;
        let provisioning = &config.provisioning;

        let label = request.subdomain.trim().to_ascii_lowercase();
        if !is_valid_subdomain_label(&label) {
            return Err(CoreError::ValidationError(format!(
                "Invalid subdomain label: '{}'",
                request.subdomain
            )));
        }
        let parent = provisioning.parent_domain.trim().trim_end_matches('.');
        if parent.is_empty() {
            return Err(CoreError::Configuration(
                "provisioning.parentDomain is not configured".to_string(),
            ));
        }
        let base_path = config.paths.base_path.trim();
        if base_path.is_empty() {
            return Err(CoreError::Configuration(
                "paths.basePath is not configured".to_string(),
            ));
        }

        let fqdn = format!("{label}.{parent}");
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(|| fqdn.clone(), str::to_string);
        let php_mode = request.php_mode.as_deref().unwrap_or(&provisioning.php_mode);
        let php_version = request
            .php_version
            .as_deref()
            .unwrap_or(&provisioning.php_version);

        let session = self.ctx.open_session(&config.connection).await?;
        let executor = ServiceContext::executor(&config.connection);
        let outcome = provision(
            session.as_ref(),
            executor,
            provisioning,
            &fqdn,
            &description,
            (php_mode, php_version),
        )
        .await;
        close_quietly(session.as_ref()).await;

        let (created, php_config_warning) = outcome?;
        let web_root_path = remote_path::join(base_path, &format!("{fqdn}/{WEB_ROOT_DIR}"));
        Ok(match created {
            Ok(()) => {
                log::info!("[provisioning] Created {fqdn} ({web_root_path})");
                ProvisioningResult {
                    success: true,
                    domain_name: fqdn,
                    web_root_path,
                    php_config_warning,
                    error: None,
                }
            }
            Err(stderr) => {
                log::warn!("[provisioning] create-domain for {fqdn} failed: {stderr}");
                ProvisioningResult {
                    success: false,
                    domain_name: fqdn,
                    web_root_path,
                    php_config_warning: None,
                    error: Some(stderr),
                }
            }
        })
    }
}

/// Returns the creation outcome (captured stderr on failure) and the PHP warning.
async fn provision(
    session: &dyn RemoteSession,
    executor: CommandExecutor,
    config: &ProvisioningConfig,
    fqdn: &str,
    description: &str,
    (php_mode, php_version): (&str, &str),
) -> CoreResult<(Result<(), String>, Option<String>)> {
    let created = executor
        .exec(
            session,
            &create_domain_command(config, fqdn, description),
            "create-domain",
        )
        .await?;
    if !created.is_ok() {
        return Ok((Err(created.failure_detail()), None));
    }

    let cli = &config.cli_command;
    let primary = executor
        .exec(
            session,
            &php_primary_command(cli, fqdn, php_mode, php_version),
            "php modify-web",
        )
        .await;
    let primary_error = match primary {
        Ok(result) if result.is_ok() => return Ok((Ok(()), None)),
        Ok(result) => result.failure_detail(),
        Err(e) => e.to_string(),
    };
    log::debug!("[provisioning] modify-web failed for {fqdn} ({primary_error}), trying modify-domain");

    let fallback = executor
        .exec(
            session,
            &php_fallback_command(cli, fqdn, php_version),
            "php modify-domain",
        )
        .await;
    let fallback_error = match fallback {
        Ok(result) if result.is_ok() => return Ok((Ok(()), None)),
        Ok(result) => result.failure_detail(),
        Err(e) => e.to_string(),
    };

    let warning = format!(
        "PHP {php_mode} {php_version} could not be configured for {fqdn}: \
         modify-web: {primary_error}; modify-domain: {fallback_error}"
    );
    log::warn!("[provisioning] {warning}");
    Ok((Ok(()), Some(warning)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockRemote, create_test_context, test_config};
    use crate::types::{CommandOutput, ProvisioningQuotas};

    fn service(remote: &Arc<MockRemote>) -> ProvisioningService {
        let (ctx, _) = create_test_context(Arc::clone(remote), test_config());
        ProvisioningService::new(ctx)
    }

    #[test]
    fn create_command_carries_required_flags() {
        let config = test_config().provisioning;
        assert_eq!(
            create_domain_command(&config, "demo.example.com", "Demo panel"),
            "virtualmin create-domain --domain demo.example.com --parent example.com \
             --desc 'Demo panel' --web --dir"
        );
    }

    #[test]
    fn create_command_appends_configured_options() {
        let mut config = test_config().provisioning;
        config.template = Some("IPTV Panel".into());
        config.plan = Some("reseller".into());
        config.quotas = Some(ProvisioningQuotas {
            disk_mb: Some(2048),
            bandwidth_mb: Some(10),
        });
        let command = create_domain_command(&config, "demo.example.com", "demo");
        assert!(command.ends_with(
            " --template 'IPTV Panel' --plan reseller --quota 2097152 --bandwidth 10485760"
        ));
    }

    #[test]
    fn subdomain_labels() {
        assert!(is_valid_subdomain_label("demo"));
        assert!(is_valid_subdomain_label("tv-2"));
        assert!(!is_valid_subdomain_label(""));
        assert!(!is_valid_subdomain_label("-demo"));
        assert!(!is_valid_subdomain_label("a.b"));
        assert!(!is_valid_subdomain_label("demo; rm -rf /"));
        assert!(!is_valid_subdomain_label(&"a".repeat(64)));
    }

    #[tokio::test]
    async fn creates_domain_and_configures_php() {
        let remote = Arc::new(MockRemote::new());
        let request = CreateSubdomainRequest {
            description: Some("Demo panel".into()),
            ..CreateSubdomainRequest::new("demo")
        };

        let result = service(&remote).create_subdomain(&request).await.unwrap();

        assert!(result.success);
        assert_eq!(result.domain_name, "demo.example.com");
        assert_eq!(result.web_root_path, "/var/www/demo.example.com/public_html");
        assert!(result.php_config_warning.is_none());
        let commands = remote.commands().await;
        assert_eq!(commands.len(), 2);
        assert!(commands[0].contains("create-domain --domain demo.example.com"));
        assert_eq!(
            commands[1],
            "virtualmin modify-web --domain demo.example.com --php-mode fpm --php-version 8.1"
        );
        assert!(remote.is_closed());
    }

    #[tokio::test]
    async fn failed_creation_is_overall_failure_with_stderr() {
        let remote = Arc::new(MockRemote::new());
        remote
            .respond(
                "create-domain",
                CommandOutput::failure(1, "A virtual server named demo.example.com already exists"),
            )
            .await;

        let result = service(&remote)
            .create_subdomain(&CreateSubdomainRequest::new("demo"))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("already exists"));
        // PHP is never attempted
        assert_eq!(remote.commands().await.len(), 1);
    }

    #[tokio::test]
    async fn fallback_php_form_is_tried_after_primary_fails() {
        let remote = Arc::new(MockRemote::new());
        remote
            .respond("modify-web", CommandOutput::failure(1, "Unknown parameter --php-mode"))
            .await;

        let result = service(&remote)
            .create_subdomain(&CreateSubdomainRequest::new("demo"))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.php_config_warning.is_none());
        let commands = remote.commands().await;
        assert_eq!(
            commands[2],
            "virtualmin modify-domain --domain demo.example.com --set-php-version 8.1"
        );
    }

    #[tokio::test]
    async fn both_php_forms_failing_is_a_warning_not_a_failure() {
        let remote = Arc::new(MockRemote::new());
        remote
            .respond("modify-web", CommandOutput::failure(1, "Unknown parameter"))
            .await;
        remote
            .respond("modify-domain", CommandOutput::failure(1, "PHP 7.4 is not installed"))
            .await;
        let request = CreateSubdomainRequest {
            php_version: Some("7.4".into()),
            ..CreateSubdomainRequest::new("demo")
        };

        let result = service(&remote).create_subdomain(&request).await.unwrap();

        assert!(result.success);
        let warning = result.php_config_warning.unwrap();
        assert!(warning.contains("7.4"));
        assert!(warning.contains("PHP 7.4 is not installed"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn invalid_label_never_reaches_the_host() {
        let remote = Arc::new(MockRemote::new());
        let (ctx, connector) = create_test_context(Arc::clone(&remote), test_config());

        let err = ProvisioningService::new(ctx)
            .create_subdomain(&CreateSubdomainRequest::new("demo.$(id)"))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn missing_parent_domain_is_configuration_error() {
        let remote = Arc::new(MockRemote::new());
        let mut config = test_config();
        config.provisioning.parent_domain = String::new();
        let (ctx, connector) = create_test_context(remote, config);

        let err = ProvisioningService::new(ctx)
            .create_subdomain(&CreateSubdomainRequest::new("demo"))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Configuration(_)));
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn connection_failure_is_fatal() {
        let remote = Arc::new(MockRemote::new());
        let (ctx, connector) = create_test_context(remote, test_config());
        connector
            .fail_next_connect(CoreError::AuthFailed {
                host: "panel.example.com".into(),
                username: "root".into(),
            })
            .await;

        let err = ProvisioningService::new(ctx)
            .create_subdomain(&CreateSubdomainRequest::new("demo"))
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
    }
}
