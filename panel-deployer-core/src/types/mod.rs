//! Type definitions

mod config;
mod dns;
mod domain;
mod module;
mod provisioning;
mod remote;
mod transfer;

pub use config::{
    AnalysisConfig, AppConfig, ConfigSection, ConnectionConfig, DnsConfig, PathsConfig,
    ProvisioningConfig, ProvisioningQuotas, SectionUpdate, TransferConfig,
};
pub use dns::{
    DnsCreationResult, DnsRecordOutcome, DnsRecordTemplate, SUBDOMAIN_PLACEHOLDER, TemplateContent,
};
pub use domain::{
    DiscoveredDomain, DiscoveryReport, Domain, DomainStructureAnalysis, InstalledModule,
};
pub use module::{ModuleDescriptor, ModulePart, ModulePaths};
pub use provisioning::{CreateSubdomainRequest, ProvisioningResult};
pub use remote::{CommandOutput, CommandStatus, RemoteCommandResult, RemoteEntry, RemoteFileStat};
pub use transfer::{
    ItemKind, PlacementCategory, SelectedItem, TransferPlanItem, TransferResult, TransferStatus,
    TransferSummary,
};

// Re-export provider library types
pub use panel_deployer_provider::{
    BackendKind, CreatedDnsRecord, DnsCredentials, DnsRecord, DnsRecordType,
};
