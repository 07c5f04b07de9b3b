//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use panel_deployer_core::types::ModulePart;

#[derive(Debug, Parser)]
#[command(name = "panel-deployer", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to <config dir>/panel-deployer/config.json)
    #[arg(short, long, env = "PANEL_DEPLOYER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the module registry
    Modules,
    /// Open a session, run `echo ok` and report latency
    TestConnection,
    /// Discover domains hosted on the remote machine
    Discover,
    /// Report what is installed under a domain's web root
    Analyze {
        /// Domain name or absolute web root path
        domain: String,
    },
    /// Copy modules into a domain's web root
    Transfer {
        /// Domain name or absolute web root path
        domain: String,
        /// Module keys, optionally suffixed with `:api` or `:panel`
        #[arg(required = true, value_parser = parse_module_arg)]
        modules: Vec<ModuleArg>,
        /// Print the plan without touching the remote host
        #[arg(long)]
        dry_run: bool,
    },
    /// Create the DNS records for a subdomain
    Dns {
        /// Subdomain label, e.g. `demo`
        subdomain: String,
    },
    /// Create a subdomain through the hosting control panel
    Provision {
        /// Subdomain label, e.g. `demo`
        subdomain: String,
        /// Description (defaults to the full domain name)
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        php_mode: Option<String>,
        #[arg(long)]
        php_version: Option<String>,
    },
    /// Download a remote file or directory into the local destination
    Download {
        remote_path: String,
        /// Overrides `paths.localDestination`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// `key`, `key:api` or `key:panel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArg {
    pub key: String,
    pub part: Option<ModulePart>,
}

pub fn parse_module_arg(raw: &str) -> Result<ModuleArg, String> {
    let raw = raw.trim();
    let (key, part) = match raw.rsplit_once(':') {
        Some((key, "api")) => (key, Some(ModulePart::Api)),
        Some((key, "panel")) => (key, Some(ModulePart::Panel)),
        Some((_, other)) => {
            return Err(format!("unknown module part '{other}', expected 'api' or 'panel'"));
        }
        None => (raw, None),
    };
    if key.is_empty() {
        return Err("module key is empty".to_string());
    }
    Ok(ModuleArg {
        key: key.to_string(),
        part,
    })
}

/// An absolute path is used as-is; a bare name maps to `<base>/<name>/public_html`.
pub fn resolve_domain_root(domain: &str, base_path: &str) -> String {
    let domain = domain.trim();
    if domain.starts_with('/') {
        return domain.to_string();
    }
    format!("{}/{domain}/public_html", base_path.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn module_args() {
        assert_eq!(
            parse_module_arg("xciptv").unwrap(),
            ModuleArg {
                key: "xciptv".to_string(),
                part: None
            }
        );
        assert_eq!(
            parse_module_arg("xciptv:api").unwrap().part,
            Some(ModulePart::Api)
        );
        assert_eq!(
            parse_module_arg("xciptv:panel").unwrap().part,
            Some(ModulePart::Panel)
        );
        assert!(parse_module_arg("xciptv:web").is_err());
        assert!(parse_module_arg(":api").is_err());
    }

    #[test]
    fn domain_roots() {
        assert_eq!(
            resolve_domain_root("demo.example.com", "/var/www/"),
            "/var/www/demo.example.com/public_html"
        );
        assert_eq!(
            resolve_domain_root("/home/demo/public_html", "/var/www"),
            "/home/demo/public_html"
        );
    }

    #[test]
    fn transfer_requires_modules() {
        assert!(Cli::try_parse_from(["panel-deployer", "transfer", "demo.example.com"]).is_err());

        let cli = Cli::try_parse_from([
            "panel-deployer",
            "transfer",
            "demo.example.com",
            "xciptv:api",
            "smarters",
        ])
        .unwrap();
        let Command::Transfer { modules, .. } = cli.command else {
            panic!("expected transfer");
        };
        assert_eq!(modules.len(), 2);
    }
}
