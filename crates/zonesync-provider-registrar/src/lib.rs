// # Registrar Record Provider
//
// Writes a zone's records to a registrar API in one bulk request.
//
// ## Behavior
//
// - The full `[{type, name, data, ttl}]` array is sent in a single PUT
// - Success is HTTP 200; anything else rejects the whole set
//   (all-or-nothing, there is only one call)
// - Transport failures propagate
// - Deletion is not offered: the PUT already replaces the record set
//
// ## API Reference
//
// - Replace records: PUT `/v1/domains/:domain/records`
// - Auth header: `Authorization: sso-key <key>`

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use zonesync_core::config::{RegistrarConfig, WriterConfig};
use zonesync_core::traits::{RecordOutcome, WriteReport, ZoneWriter, ZoneWriterFactory};
use zonesync_core::{Error, GenericRecord, ProviderRegistry, Result};

/// Provider name used in logs, errors and reports
pub const PROVIDER_NAME: &str = "registrar";

/// Registrar record provider
pub struct RegistrarProvider {
    /// Connection settings
    /// ⚠️ holds the API key, NEVER log it
    config: RegistrarConfig,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for RegistrarProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrarProvider")
            .field("config", &self.config)
            .finish()
    }
}

impl RegistrarProvider {
    /// Create a new provider
    pub fn new(config: RegistrarConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Replace every record of `domain` with `records`
    ///
    /// Returns `Ok(true)` iff the registrar answered 200 and `Ok(false)` for
    /// any other status. In dry-run mode nothing is sent and `Ok(true)` is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for an empty `records` slice, which would
    ///   wipe the zone; nothing is sent
    /// - [`Error::Http`] when the request cannot be sent
    pub async fn replace_records(&self, domain: &str, records: &[GenericRecord]) -> Result<bool> {
        Ok(!matches!(
            self.submit(domain, records).await?,
            RecordOutcome::Rejected { .. }
        ))
    }

    async fn submit(&self, domain: &str, records: &[GenericRecord]) -> Result<RecordOutcome> {
        if records.is_empty() {
            return Err(Error::invalid_input(format!(
                "refusing to replace all records of {} with an empty set",
                domain
            )));
        }

        let url = self.config.records_url(domain);

        if self.config.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT to {} with payload: {}",
                url,
                serde_json::to_string(records)?
            );
            return Ok(RecordOutcome::DryRun);
        }

        tracing::debug!("PUT {} ({} records)", url, records.len());

        let response = self
            .client
            .put(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("sso-key {}", self.config.api_key),
            )
            .json(records)
            .send()
            .await
            .map_err(|e| Error::http(format!("PUT {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::OK {
            tracing::info!("Registrar accepted {} record(s) for {}", records.len(), domain);
            return Ok(RecordOutcome::Applied);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        tracing::warn!(
            "Registrar rejected records for {}: {} - {}",
            domain,
            status,
            body
        );

        Ok(RecordOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ZoneWriter for RegistrarProvider {
    async fn write_records(&self, domain: &str, records: &[GenericRecord]) -> Result<WriteReport> {
        let outcome = self.submit(domain, records).await?;

        let mut report = WriteReport::new(PROVIDER_NAME);
        for record in records {
            report.push(record, outcome.clone());
        }
        Ok(report)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating registrar writers
pub struct RegistrarFactory;

impl ZoneWriterFactory for RegistrarFactory {
    fn create(&self, config: &WriterConfig) -> Result<Box<dyn ZoneWriter>> {
        match config {
            WriterConfig::Registrar(registrar) => {
                if registrar.dry_run {
                    tracing::warn!("Registrar writer running in DRY-RUN mode - no changes will be made");
                }
                Ok(Box::new(RegistrarProvider::new(registrar.clone())?))
            }
            _ => Err(Error::config("Invalid config for registrar writer")),
        }
    }
}

/// Register the registrar writer with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_writer(PROVIDER_NAME, Box::new(RegistrarFactory));
}
