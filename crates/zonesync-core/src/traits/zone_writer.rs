// # Zone Writer Trait
//
// Defines the interface for submitting generic records to a provider.
//
// ## Implementations
//
// - PowerDNS-style API: `zonesync-provider-pdns` crate (one PATCH per record,
//   best effort)
// - Registrar API: `zonesync-provider-registrar` crate (one bulk PUT,
//   all or nothing)
//
// Both report what happened to each record through a [`WriteReport`]
// instead of only logging it.

use crate::record::GenericRecord;
use async_trait::async_trait;

/// What happened to a single submitted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The provider accepted the change
    Applied,
    /// The provider answered with an unexpected status
    Rejected {
        /// Literal status code
        status: u16,
        /// Raw response body
        body: String,
    },
    /// Dry-run mode: nothing was sent
    DryRun,
}

/// Outcome for one record of a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReport {
    /// Owner name of the record
    pub name: String,
    /// Record type
    pub record_type: String,
    /// What happened
    pub outcome: RecordOutcome,
}

impl RecordReport {
    /// Create a report entry for `record`
    pub fn new(record: &GenericRecord, outcome: RecordOutcome) -> Self {
        Self {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            outcome,
        }
    }
}

/// Aggregated per-record outcomes of one write call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Provider that handled the write
    pub provider: &'static str,
    /// One entry per submitted record, in submission order
    pub entries: Vec<RecordReport>,
}

impl WriteReport {
    /// Create an empty report for `provider`
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn push(&mut self, record: &GenericRecord, outcome: RecordOutcome) {
        self.entries.push(RecordReport::new(record, outcome));
    }

    /// `true` when no record was rejected
    pub fn is_success(&self) -> bool {
        self.rejected().next().is_none()
    }

    /// Entries the provider accepted
    pub fn applied(&self) -> impl Iterator<Item = &RecordReport> {
        self.entries
            .iter()
            .filter(|e| e.outcome == RecordOutcome::Applied)
    }

    /// Entries the provider rejected
    pub fn rejected(&self) -> impl Iterator<Item = &RecordReport> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RecordOutcome::Rejected { .. }))
    }

    /// Number of submitted records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing was submitted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trait for record destinations
///
/// # Contract
///
/// - Stateless: every call is an independent exchange with the provider
/// - No retries: rejected records are reported, not resubmitted
/// - Transport failures abort the call with [`crate::Error::Http`]
#[async_trait]
pub trait ZoneWriter: Send + Sync {
    /// Submit `records` so the provider holds them for `domain`
    async fn write_records(
        &self,
        domain: &str,
        records: &[GenericRecord],
    ) -> Result<WriteReport, crate::Error>;

    /// Whether [`ZoneWriter::delete_records`] is implemented
    fn supports_delete(&self) -> bool {
        false
    }

    /// Remove the rrsets `records` live in
    ///
    /// Writers whose update call already replaces the full record set do not
    /// need this and keep the default.
    async fn delete_records(
        &self,
        _domain: &str,
        _records: &[GenericRecord],
    ) -> Result<WriteReport, crate::Error> {
        Err(crate::Error::unsupported(format!(
            "record deletion on {}",
            self.provider_name()
        )))
    }

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing zone writers from configuration
pub trait ZoneWriterFactory: Send + Sync {
    /// Create a ZoneWriter instance from configuration
    fn create(
        &self,
        config: &crate::config::WriterConfig,
    ) -> Result<Box<dyn ZoneWriter>, crate::Error>;
}
