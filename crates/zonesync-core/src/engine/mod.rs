//! Zone sync engine
//!
//! The SyncEngine is responsible for:
//! - Reading the zone via ZoneReader
//! - Applying the template via TemplateEngine
//! - Writing the final record set via ZoneWriter
//! - Optionally deleting records the template removed
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   records   ┌────────────────┐   final    ┌─────────────┐
//! │ ZoneReader  │────────────▶│ TemplateEngine │───────────▶│ ZoneWriter  │
//! └─────────────┘             └────────────────┘            └─────────────┘
//! ```
//!
//! Every step is awaited before the next one starts. There are no retries:
//! a read failure aborts the run, rejected writes are reported per record.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::record::GenericRecord;
use crate::traits::{
    RecordReport, TemplateEngine, TemplateOutcome, WriteReport, ZoneReader, ZoneWriter,
};
use tracing::{debug, info, warn};

/// Everything one sync run did
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Number of records read from the source
    pub fetched: usize,
    /// What the template step produced
    pub outcome: TemplateOutcome,
    /// Result of writing the final record set
    pub written: WriteReport,
    /// Result of deleting removed records, when pruning is enabled
    pub deleted: Option<WriteReport>,
}

impl SyncReport {
    /// `true` when no write or delete was rejected
    pub fn is_success(&self) -> bool {
        self.written.is_success() && self.deleted.as_ref().is_none_or(WriteReport::is_success)
    }

    /// Rejected entries of both the write and the delete step
    pub fn rejected(&self) -> impl Iterator<Item = &RecordReport> {
        self.written
            .rejected()
            .chain(self.deleted.iter().flat_map(WriteReport::rejected))
    }
}

/// Core sync engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::run_once()`] (or [`SyncEngine::fetch_only()`])
/// 3. Inspect the returned report
pub struct SyncEngine {
    /// Where records come from
    reader: Box<dyn ZoneReader>,

    /// Template step
    template: Box<dyn TemplateEngine>,

    /// Where records go
    writer: Box<dyn ZoneWriter>,

    /// Sync settings
    config: SyncConfig,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Parameters
    ///
    /// - `reader`: ZoneReader implementation
    /// - `template`: TemplateEngine implementation
    /// - `writer`: ZoneWriter implementation
    /// - `config`: Sync configuration (validated here)
    ///
    /// Pruning needs a writer that can delete; asking for it with one that
    /// cannot is a configuration error, raised before anything is written.
    pub fn new(
        reader: Box<dyn ZoneReader>,
        template: Box<dyn TemplateEngine>,
        writer: Box<dyn ZoneWriter>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        if config.prune_deleted && !writer.supports_delete() {
            return Err(Error::config(format!(
                "prune_deleted is set but the {} writer cannot delete records",
                writer.provider_name()
            )));
        }

        Ok(Self {
            reader,
            template,
            writer,
            config,
        })
    }

    /// Domain this engine synchronizes
    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Read the zone without applying or writing anything
    pub async fn fetch_only(&self) -> Result<Vec<GenericRecord>> {
        let records = self.reader.fetch_records(&self.config.domain).await?;
        info!(
            "Fetched {} record(s) for {} from {}",
            records.len(),
            self.config.domain,
            self.reader.provider_name()
        );
        Ok(records)
    }

    /// Run one full read → template → write cycle
    pub async fn run_once(&self) -> Result<SyncReport> {
        let domain = &self.config.domain;
        let records = self.fetch_only().await?;

        let outcome = self
            .template
            .apply(
                &records,
                domain,
                &self.config.template.host,
                &self.config.template.params,
            )
            .await?;

        info!(
            "Template {} produced {} new, {} deleted, {} final record(s)",
            self.template.name(),
            outcome.new_records.len(),
            outcome.deleted_records.len(),
            outcome.final_records.len()
        );
        for record in &outcome.new_records {
            debug!(
                "New record: {} {} {} (ttl {})",
                record.name, record.record_type, record.data, record.ttl
            );
        }

        let written = self
            .writer
            .write_records(domain, &outcome.final_records)
            .await?;
        log_report("write", &written);

        let prunable = if self.config.prune_deleted {
            vacated_slots(&outcome)
        } else {
            Vec::new()
        };

        let deleted = if prunable.is_empty() {
            None
        } else {
            let report = self.writer.delete_records(domain, &prunable).await?;
            log_report("delete", &report);
            Some(report)
        };

        Ok(SyncReport {
            fetched: records.len(),
            outcome,
            written,
            deleted,
        })
    }
}

/// Deleted records whose `(name, type)` slot no final record occupies
///
/// Deletes act on whole rrsets, so a slot the write step just filled must
/// not be deleted afterwards.
fn vacated_slots(outcome: &TemplateOutcome) -> Vec<GenericRecord> {
    outcome
        .deleted_records
        .iter()
        .filter(|deleted| {
            let kept = outcome
                .final_records
                .iter()
                .any(|record| record.same_slot(*deleted));
            if kept {
                debug!(
                    "Not deleting {} {}: slot rewritten by the write step",
                    deleted.name, deleted.record_type
                );
            }
            !kept
        })
        .cloned()
        .collect()
}

fn log_report(action: &str, report: &WriteReport) {
    let rejected = report.rejected().count();
    if rejected == 0 {
        info!(
            "{} {}: {} record(s) submitted",
            report.provider,
            action,
            report.len()
        );
    } else {
        warn!(
            "{} {}: {} of {} record(s) rejected",
            report.provider,
            action,
            rejected,
            report.len()
        );
    }
}
