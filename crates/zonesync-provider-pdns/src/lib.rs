// # PowerDNS-style Zone Provider
//
// Reads and writes zone records through a PowerDNS-style HTTP API.
//
// ## Behavior
//
// - Reading fetches the whole zone in one GET and converts every rrset to a
//   generic record (first content only)
// - Writing issues one PATCH per record with `changetype: REPLACE`
// - A rejected PATCH is logged and reported, the loop moves on to the next
//   record (per-record success, not all-or-nothing)
// - Transport failures abort and propagate
// - No retries, no caching, 30 second default timeout
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Provider MUST fail fast if the key is empty
//
// ## API Reference
//
// - Read zone: GET `/api/v1/servers/:server_id/zones/:zone`, success 200
// - Patch rrsets: PATCH `/api/v1/servers/:server_id/zones/:zone`, success 204
// - Auth header: `X-API-Key: <key>`

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use zonesync_core::config::{PdnsConfig, ReaderConfig, WriterConfig};
use zonesync_core::record::{PdnsPatch, PdnsZone, convert_rrsets};
use zonesync_core::traits::{
    RecordOutcome, WriteReport, ZoneReader, ZoneReaderFactory, ZoneWriter, ZoneWriterFactory,
};
use zonesync_core::{Error, GenericRecord, ProviderRegistry, Result};

/// Provider name used in logs, errors and reports
pub const PROVIDER_NAME: &str = "pdns";

/// Authentication header expected by the zone API
const API_KEY_HEADER: &str = "X-API-Key";

/// PowerDNS-style zone provider
///
/// Implements both [`ZoneReader`] and [`ZoneWriter`] against one server.
///
/// # Dry-Run Mode
///
/// When `dry_run` is set in the config, reads still happen but PATCH bodies
/// are only logged and every record is reported as [`RecordOutcome::DryRun`].
pub struct PdnsProvider {
    /// Connection settings
    /// ⚠️ holds the API key, NEVER log it
    config: PdnsConfig,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for PdnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdnsProvider")
            .field("config", &self.config)
            .finish()
    }
}

impl PdnsProvider {
    /// Create a new provider
    ///
    /// Fails with a configuration error when the settings are invalid
    /// (empty key, missing host, ...).
    pub fn new(config: PdnsConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Whether writes are only logged
    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Send one PATCH body, returning the outcome for the record it carries
    async fn send_patch(&self, url: &str, patch: &PdnsPatch) -> Result<RecordOutcome> {
        if self.config.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH to {} with payload: {}",
                url,
                serde_json::to_string(patch)?
            );
            return Ok(RecordOutcome::DryRun);
        }

        let response = self
            .client
            .patch(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(patch)
            .send()
            .await
            .map_err(|e| Error::http(format!("PATCH {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(RecordOutcome::Applied);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        Ok(RecordOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    /// Apply `build` to every record and PATCH the results one by one
    async fn patch_each(
        &self,
        domain: &str,
        records: &[GenericRecord],
        action: &str,
        build: fn(&GenericRecord) -> PdnsPatch,
    ) -> Result<WriteReport> {
        let url = self.config.zone_url(domain);
        let mut report = WriteReport::new(PROVIDER_NAME);

        for record in records {
            let outcome = self.send_patch(&url, &build(record)).await?;

            match &outcome {
                RecordOutcome::Applied => {
                    tracing::info!("{} {} {}: OK", action, record.name, record.record_type);
                }
                RecordOutcome::Rejected { status, body } => {
                    tracing::warn!(
                        "{} {} {} rejected: {} - {}",
                        action,
                        record.name,
                        record.record_type,
                        status,
                        body
                    );
                }
                RecordOutcome::DryRun => {}
            }

            report.push(record, outcome);
        }

        Ok(report)
    }
}

#[async_trait]
impl ZoneReader for PdnsProvider {
    /// Fetch all rrsets of `domain` and convert them
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /api/v1/servers/:server_id/zones/:zone
    /// X-API-Key: <key>
    /// ```
    ///
    /// Any status other than 200 is returned as [`Error::Status`] with the
    /// raw body. An rrset without records fails the read with
    /// [`Error::EmptyRrset`].
    async fn fetch_records(&self, domain: &str) -> Result<Vec<GenericRecord>> {
        let url = self.config.zone_url(domain);
        tracing::debug!("Fetching zone {} from {}", domain, url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::http(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::warn!("Zone read for {} failed: {} - {}", domain, status, body);
            return Err(Error::status(PROVIDER_NAME, status.as_u16(), body));
        }

        let zone: PdnsZone = response.json().await.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Failed to parse zone response: {}", e))
        })?;

        tracing::debug!("Zone {} has {} rrset(s)", domain, zone.rrsets.len());
        convert_rrsets(&zone.rrsets)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[async_trait]
impl ZoneWriter for PdnsProvider {
    /// Replace each record's rrset with one PATCH per record
    ///
    /// # API Call (per record)
    ///
    /// ```http
    /// PATCH /api/v1/servers/:server_id/zones/:zone
    /// X-API-Key: <key>
    ///
    /// {"rrsets": [{"name": "...", "type": "A", "ttl": 300, "changetype": "REPLACE",
    ///              "records": [{"content": "1.2.3.4", "disabled": false}]}]}
    /// ```
    async fn write_records(&self, domain: &str, records: &[GenericRecord]) -> Result<WriteReport> {
        tracing::info!(
            "Writing {} record(s) to {} [mode: {}]",
            records.len(),
            domain,
            if self.config.dry_run { "DRY-RUN" } else { "LIVE" }
        );
        self.patch_each(domain, records, "Replace", PdnsPatch::replace)
            .await
    }

    fn supports_delete(&self) -> bool {
        true
    }

    /// Delete each record's rrset with one PATCH per record
    async fn delete_records(
        &self,
        domain: &str,
        records: &[GenericRecord],
    ) -> Result<WriteReport> {
        tracing::info!(
            "Deleting {} rrset(s) from {} [mode: {}]",
            records.len(),
            domain,
            if self.config.dry_run { "DRY-RUN" } else { "LIVE" }
        );
        self.patch_each(domain, records, "Delete", PdnsPatch::delete)
            .await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating PowerDNS readers and writers
pub struct PdnsFactory;

impl ZoneReaderFactory for PdnsFactory {
    fn create(&self, config: &ReaderConfig) -> Result<Box<dyn ZoneReader>> {
        match config {
            ReaderConfig::Pdns(pdns) => Ok(Box::new(PdnsProvider::new(pdns.clone())?)),
        }
    }
}

impl ZoneWriterFactory for PdnsFactory {
    fn create(&self, config: &WriterConfig) -> Result<Box<dyn ZoneWriter>> {
        match config {
            WriterConfig::Pdns(pdns) => {
                if pdns.dry_run {
                    tracing::warn!("PowerDNS writer running in DRY-RUN mode - no changes will be made");
                }
                Ok(Box::new(PdnsProvider::new(pdns.clone())?))
            }
            _ => Err(Error::config("Invalid config for PowerDNS writer")),
        }
    }
}

/// Register the PowerDNS reader and writer with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonesync_provider_pdns::register(&registry);
/// assert!(registry.has_reader("pdns"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_reader(PROVIDER_NAME, Box::new(PdnsFactory));
    registry.register_writer(PROVIDER_NAME, Box::new(PdnsFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use zonesync_core::config::RegistrarConfig;

    const ZONE_PATH: &str = "/api/v1/servers/localhost/zones/example.org";

    fn provider_for(server: &mockito::ServerGuard) -> PdnsProvider {
        PdnsProvider::new(PdnsConfig::new(server.url(), "secret_key_111")).unwrap()
    }

    #[test]
    fn test_factory_creation() {
        let config = ReaderConfig::Pdns(PdnsConfig::new("http://127.0.0.1:8081", "k"));
        assert!(ZoneReaderFactory::create(&PdnsFactory, &config).is_ok());

        let config = WriterConfig::Pdns(PdnsConfig::new("http://127.0.0.1:8081", "k"));
        assert!(ZoneWriterFactory::create(&PdnsFactory, &config).is_ok());
    }

    #[test]
    fn test_factory_rejects_foreign_config() {
        let config =
            WriterConfig::Registrar(RegistrarConfig::new("https://api.registrar.test", "k"));
        assert!(ZoneWriterFactory::create(&PdnsFactory, &config).is_err());
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = PdnsProvider::new(PdnsConfig::new("http://127.0.0.1:8081", ""));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_register() {
        let registry = ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_reader("pdns"));
        assert!(registry.has_writer("pdns"));
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let provider =
            PdnsProvider::new(PdnsConfig::new("http://127.0.0.1:8081", "secret_key_111")).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_key_111"));
        assert!(debug_str.contains("PdnsProvider"));
    }

    #[tokio::test]
    async fn test_fetch_records_converts_rrsets() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", ZONE_PATH)
            .match_header("x-api-key", "secret_key_111")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": "example.org.",
                    "rrsets": [
                        {"name": "a.example.org", "type": "A", "ttl": 300,
                         "records": [{"content": "1.2.3.4", "disabled": false}]},
                        {"name": "example.org.", "type": "NS", "ttl": 3600,
                         "records": [{"content": "ns1.example.org."}, {"content": "ns2.example.org."}]}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let records = provider_for(&server)
            .fetch_records("example.org")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            records,
            vec![
                GenericRecord::new("A", "a.example.org", "1.2.3.4", 300),
                GenericRecord::new("NS", "example.org.", "ns1.example.org.", 3600),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_records_non_200_returns_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ZONE_PATH)
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let err = provider_for(&server)
            .fetch_records("example.org")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.response_body(), Some("Unauthorized"));
    }

    #[tokio::test]
    async fn test_fetch_records_empty_rrset_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ZONE_PATH)
            .with_status(200)
            .with_body(
                json!({"rrsets": [{"name": "x.example.org.", "type": "TXT", "ttl": 60, "records": []}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let result = provider_for(&server).fetch_records("example.org").await;
        assert!(matches!(result, Err(Error::EmptyRrset { .. })));
    }

    #[tokio::test]
    async fn test_fetch_records_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ZONE_PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = provider_for(&server).fetch_records("example.org").await;
        assert!(matches!(result, Err(Error::Provider { .. })));
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let provider = PdnsProvider::new(PdnsConfig::new("http://127.0.0.1:1", "k")).unwrap();

        let result = provider.fetch_records("example.org").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn test_write_records_patches_each_record_and_continues_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("PATCH", ZONE_PATH)
            .match_header("x-api-key", "secret_key_111")
            .match_body(Matcher::Json(json!({
                "rrsets": [{
                    "name": "a.example.org.", "type": "A", "ttl": 300, "changetype": "REPLACE",
                    "records": [{"content": "1.2.3.4", "disabled": false}]
                }]
            })))
            .with_status(204)
            .create_async()
            .await;
        let rejected = server
            .mock("PATCH", ZONE_PATH)
            .match_body(Matcher::Json(json!({
                "rrsets": [{
                    "name": "bad.example.org.", "type": "A", "ttl": 300, "changetype": "REPLACE",
                    "records": [{"content": "not-an-ip", "disabled": false}]
                }]
            })))
            .with_status(422)
            .with_body("{\"error\": \"invalid content\"}")
            .create_async()
            .await;
        let ok_after = server
            .mock("PATCH", ZONE_PATH)
            .match_body(Matcher::Json(json!({
                "rrsets": [{
                    "name": "c.example.org.", "type": "TXT", "ttl": 60, "changetype": "REPLACE",
                    "records": [{"content": "\"hello\"", "disabled": false}]
                }]
            })))
            .with_status(204)
            .create_async()
            .await;

        let records = vec![
            GenericRecord::new("A", "a.example.org.", "1.2.3.4", 300),
            GenericRecord::new("A", "bad.example.org.", "not-an-ip", 300),
            GenericRecord::new("TXT", "c.example.org.", "\"hello\"", 60),
        ];

        let report = provider_for(&server)
            .write_records("example.org", &records)
            .await
            .unwrap();

        ok.assert_async().await;
        rejected.assert_async().await;
        ok_after.assert_async().await;

        assert_eq!(report.provider, "pdns");
        assert_eq!(report.len(), 3);
        assert!(!report.is_success());
        assert_eq!(report.applied().count(), 2);
        assert_eq!(
            report.entries[1].outcome,
            RecordOutcome::Rejected {
                status: 422,
                body: "{\"error\": \"invalid content\"}".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_write_records_treats_200_as_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", ZONE_PATH)
            .with_status(200)
            .create_async()
            .await;

        let report = provider_for(&server)
            .write_records(
                "example.org",
                &[GenericRecord::new("A", "a.example.org.", "1.2.3.4", 300)],
            )
            .await
            .unwrap();

        assert!(matches!(
            report.entries[0].outcome,
            RecordOutcome::Rejected { status: 200, .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_records_sends_delete_changetype() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", ZONE_PATH)
            .match_body(Matcher::Json(json!({
                "rrsets": [{
                    "name": "old.example.org.", "type": "CNAME", "ttl": 300,
                    "changetype": "DELETE", "records": []
                }]
            })))
            .with_status(204)
            .create_async()
            .await;

        let report = provider_for(&server)
            .delete_records(
                "example.org",
                &[GenericRecord::new("CNAME", "old.example.org.", "x.example.net.", 300)],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(report.is_success());
        assert_eq!(report.applied().count(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", ZONE_PATH)
            .expect(0)
            .create_async()
            .await;

        let provider =
            PdnsProvider::new(PdnsConfig::new(server.url(), "k").with_dry_run(true)).unwrap();
        assert!(provider.is_dry_run());

        let report = provider
            .write_records(
                "example.org",
                &[GenericRecord::new("A", "a.example.org.", "1.2.3.4", 300)],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(report.is_success());
        assert_eq!(report.entries[0].outcome, RecordOutcome::DryRun);
    }

    #[tokio::test]
    async fn test_pruned_sync_keeps_rewritten_rrsets() {
        use zonesync_core::{OverlayTemplate, SyncConfig, SyncEngine};

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", ZONE_PATH)
            .with_status(200)
            .with_body(
                json!({
                    "rrsets": [{
                        "name": "www.example.org.", "type": "CNAME", "ttl": 300,
                        "records": [{"content": "example.org.", "disabled": false}]
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let replace = server
            .mock("PATCH", ZONE_PATH)
            .match_body(Matcher::Json(json!({
                "rrsets": [{
                    "name": "www.example.org.", "type": "CNAME", "ttl": 300,
                    "changetype": "REPLACE",
                    "records": [{"content": "ghs.example.net.", "disabled": false}]
                }]
            })))
            .with_status(204)
            .expect(1)
            .create_async()
            .await;
        let delete = server
            .mock("PATCH", ZONE_PATH)
            .match_body(Matcher::Regex(r#""changetype":"DELETE""#.to_string()))
            .with_status(204)
            .expect(0)
            .create_async()
            .await;

        let pdns = PdnsConfig::new(server.url(), "secret_key_111");
        let mut config = SyncConfig::pdns_round_trip("example.org", pdns.clone());
        config.prune_deleted = true;

        let engine = SyncEngine::new(
            Box::new(PdnsProvider::new(pdns.clone()).unwrap()),
            Box::new(OverlayTemplate::new(vec![GenericRecord::new(
                "CNAME",
                "www",
                "ghs.example.net.",
                300,
            )])),
            Box::new(PdnsProvider::new(pdns).unwrap()),
            config,
        )
        .unwrap();

        let report = engine.run_once().await.unwrap();

        replace.assert_async().await;
        delete.assert_async().await;
        assert!(report.is_success());
        assert!(report.deleted.is_none());
    }

    #[test]
    fn test_writer_supports_delete() {
        let provider = PdnsProvider::new(PdnsConfig::new("http://127.0.0.1:8081", "k")).unwrap();
        assert!(ZoneWriter::supports_delete(&provider));
    }
}
