// # Zone Reader Trait
//
// Defines the interface for fetching the records of a zone from a
// zone-hosting API.
//
// ## Implementations
//
// - PowerDNS-style API: `zonesync-provider-pdns` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::ZoneReader;
//
// let records = reader.fetch_records("example.org").await?;
// for record in &records {
//     println!("{} {} {}", record.name, record.record_type, record.data);
// }
// ```

use crate::record::GenericRecord;
use async_trait::async_trait;

/// Trait for record sources
///
/// # Contract
///
/// - One read per call, no retries, no caching between calls
/// - A non-success HTTP answer is returned as [`crate::Error::Status`]
///   carrying the literal status code and body
/// - Transport failures are returned as [`crate::Error::Http`]
#[async_trait]
pub trait ZoneReader: Send + Sync {
    /// Fetch every record of `domain` in the generic shape
    async fn fetch_records(&self, domain: &str) -> Result<Vec<GenericRecord>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing zone readers from configuration
pub trait ZoneReaderFactory: Send + Sync {
    /// Create a ZoneReader instance from configuration
    fn create(
        &self,
        config: &crate::config::ReaderConfig,
    ) -> Result<Box<dyn ZoneReader>, crate::Error>;
}
