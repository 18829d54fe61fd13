//! Configuration types for zone synchronization
//!
//! This module defines all configuration structures used throughout the crate.
//! Nothing here is read from globals: callers build a [`SyncConfig`] and hand
//! it to the engine and the provider factories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default HTTP timeout for provider requests (in seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Zone to synchronize (e.g. "example.org")
    pub domain: String,

    /// Where records are read from
    pub reader: ReaderConfig,

    /// Where records are written to
    pub writer: WriterConfig,

    /// Template step settings
    #[serde(default)]
    pub template: TemplateConfig,

    /// Delete records the template step removed (only for writers that support it)
    #[serde(default)]
    pub prune_deleted: bool,
}

impl SyncConfig {
    /// Create a configuration reading from and writing back to the same PowerDNS server
    pub fn pdns_round_trip(domain: impl Into<String>, pdns: PdnsConfig) -> Self {
        Self {
            domain: domain.into(),
            reader: ReaderConfig::Pdns(pdns.clone()),
            writer: WriterConfig::Pdns(pdns),
            template: TemplateConfig::default(),
            prune_deleted: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.trim().is_empty() {
            return Err(crate::Error::config("Domain cannot be empty"));
        }

        self.reader.validate()?;
        self.writer.validate()?;

        if self.prune_deleted && matches!(self.writer, WriterConfig::Registrar(_)) {
            return Err(crate::Error::config(
                "prune_deleted cannot be used with the registrar writer: its bulk update already replaces every record",
            ));
        }

        Ok(())
    }
}

/// Record source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReaderConfig {
    /// PowerDNS-style zone API
    Pdns(PdnsConfig),
}

impl ReaderConfig {
    /// Validate the reader configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ReaderConfig::Pdns(pdns) => pdns.validate(),
        }
    }

    /// Get the reader type name
    pub fn type_name(&self) -> &str {
        match self {
            ReaderConfig::Pdns(_) => "pdns",
        }
    }
}

/// Record destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WriterConfig {
    /// PowerDNS-style zone API (one PATCH per record)
    Pdns(PdnsConfig),

    /// Registrar record API (one bulk PUT)
    Registrar(RegistrarConfig),
}

impl WriterConfig {
    /// Validate the writer configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            WriterConfig::Pdns(pdns) => pdns.validate(),
            WriterConfig::Registrar(registrar) => registrar.validate(),
        }
    }

    /// Get the writer type name
    pub fn type_name(&self) -> &str {
        match self {
            WriterConfig::Pdns(_) => "pdns",
            WriterConfig::Registrar(_) => "registrar",
        }
    }
}

/// Connection settings for a PowerDNS-style server
#[derive(Clone, Serialize, Deserialize)]
pub struct PdnsConfig {
    /// Base URL of the API (e.g. "http://127.0.0.1:8081")
    pub host: String,

    /// Server id in the API path
    #[serde(default = "default_server_id")]
    pub server_id: String,

    /// Value of the `X-API-Key` header
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log writes instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl PdnsConfig {
    /// Create a new PowerDNS configuration with the default server id and timeout
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            server_id: default_server_id(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
            dry_run: false,
        }
    }

    /// Set the server id
    pub fn with_server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = server_id.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// URL of the zone resource for `domain`
    pub fn zone_url(&self, domain: &str) -> String {
        format!(
            "{}/api/v1/servers/{}/zones/{}",
            self.host.trim_end_matches('/'),
            self.server_id,
            domain
        )
    }

    /// Validate the PowerDNS configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_base_url("PowerDNS host", &self.host)?;
        if self.server_id.is_empty() {
            return Err(crate::Error::config("PowerDNS server id cannot be empty"));
        }
        if self.api_key.is_empty() {
            return Err(crate::Error::config("PowerDNS API key cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("PowerDNS timeout must be > 0"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for PdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdnsConfig")
            .field("host", &self.host)
            .field("server_id", &self.server_id)
            .field("api_key", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Connection settings for a registrar record API
#[derive(Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// Base URL of the API (e.g. "https://api.registrar.example")
    pub api_base: String,

    /// Credential sent as `Authorization: sso-key <api_key>`
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log writes instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl RegistrarConfig {
    /// Create a new registrar configuration with the default timeout
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// URL of the record collection for `domain`
    pub fn records_url(&self, domain: &str) -> String {
        format!(
            "{}/v1/domains/{}/records",
            self.api_base.trim_end_matches('/'),
            domain
        )
    }

    /// Validate the registrar configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_base_url("Registrar API base", &self.api_base)?;
        if self.api_key.is_empty() {
            return Err(crate::Error::config("Registrar API key cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Registrar timeout must be > 0"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RegistrarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrarConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Template step configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Host label the template is applied under ("" = zone apex)
    #[serde(default)]
    pub host: String,

    /// Template variables (e.g. `verifytxt`, `spftxt`)
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Overlay template file; when unset records pass through unchanged
    #[serde(default)]
    pub overlay_path: Option<PathBuf>,
}

fn validate_base_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", what)));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

fn default_server_id() -> String {
    "localhost".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
