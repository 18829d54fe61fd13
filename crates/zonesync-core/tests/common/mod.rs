//! Test doubles and common utilities for sync contract tests
//!
//! Minimal readers and writers that record how the engine drives them
//! without talking to any server.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use zonesync_core::config::{PdnsConfig, SyncConfig};
use zonesync_core::error::{Error, Result};
use zonesync_core::record::GenericRecord;
use zonesync_core::traits::{
    RecordOutcome, TemplateEngine, TemplateOutcome, TemplateParams, WriteReport, ZoneReader,
    ZoneWriter,
};

/// A reader that returns a fixed zone, or a fixed failure status
pub struct StaticReader {
    records: Vec<GenericRecord>,
    /// When set, every read fails with this status and body
    failure: Option<(u16, String)>,
    /// Call counter for fetch_records()
    fetch_call_count: Arc<AtomicUsize>,
}

impl StaticReader {
    pub fn new(records: Vec<GenericRecord>) -> Self {
        Self {
            records,
            failure: None,
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            records: Vec::new(),
            failure: Some((status, body.to_string())),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times fetch_records() was called
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ZoneReader for StaticReader {
    async fn fetch_records(&self, _domain: &str) -> Result<Vec<GenericRecord>> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some((status, body)) => Err(Error::status("static", *status, body.clone())),
            None => Ok(self.records.clone()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}

/// A writer that records every call and rejects records by name
pub struct RecordingWriter {
    /// Records passed to write_records(), one Vec per call
    writes: Arc<std::sync::Mutex<Vec<Vec<GenericRecord>>>>,
    /// Records passed to delete_records(), one Vec per call
    deletes: Arc<std::sync::Mutex<Vec<Vec<GenericRecord>>>>,
    /// Owner names answered with a 422
    reject_names: Vec<String>,
    /// Whether delete_records() is implemented
    supports_delete: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self {
            writes: Arc::new(std::sync::Mutex::new(Vec::new())),
            deletes: Arc::new(std::sync::Mutex::new(Vec::new())),
            reject_names: Vec::new(),
            supports_delete: true,
        }
    }

    pub fn rejecting(mut self, name: &str) -> Self {
        self.reject_names.push(name.to_string());
        self
    }

    pub fn without_delete(mut self) -> Self {
        self.supports_delete = false;
        self
    }

    /// Create a writer that shares its call log with an existing one
    pub fn sharing_log_with(other: &Self) -> Self {
        Self {
            writes: Arc::clone(&other.writes),
            deletes: Arc::clone(&other.deletes),
            reject_names: other.reject_names.clone(),
            supports_delete: other.supports_delete,
        }
    }

    pub fn writes(&self) -> Vec<Vec<GenericRecord>> {
        self.writes.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<Vec<GenericRecord>> {
        self.deletes.lock().unwrap().clone()
    }

    fn report(&self, records: &[GenericRecord]) -> WriteReport {
        let mut report = WriteReport::new("recording");
        for record in records {
            let outcome = if self.reject_names.contains(&record.name) {
                RecordOutcome::Rejected {
                    status: 422,
                    body: "rejected".to_string(),
                }
            } else {
                RecordOutcome::Applied
            };
            report.push(record, outcome);
        }
        report
    }
}

#[async_trait::async_trait]
impl ZoneWriter for RecordingWriter {
    async fn write_records(&self, _domain: &str, records: &[GenericRecord]) -> Result<WriteReport> {
        self.writes.lock().unwrap().push(records.to_vec());
        Ok(self.report(records))
    }

    async fn delete_records(
        &self,
        _domain: &str,
        records: &[GenericRecord],
    ) -> Result<WriteReport> {
        if !self.supports_delete {
            return Err(Error::unsupported("record deletion on recording"));
        }
        self.deletes.lock().unwrap().push(records.to_vec());
        Ok(self.report(records))
    }

    fn supports_delete(&self) -> bool {
        self.supports_delete
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// A template that removes every record owned by the given names
pub struct DroppingTemplate {
    names: Vec<String>,
}

impl DroppingTemplate {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

#[async_trait::async_trait]
impl TemplateEngine for DroppingTemplate {
    async fn apply(
        &self,
        records: &[GenericRecord],
        _domain: &str,
        _host: &str,
        _params: &TemplateParams,
    ) -> Result<TemplateOutcome> {
        let (deleted_records, final_records): (Vec<_>, Vec<_>) = records
            .iter()
            .cloned()
            .partition(|r| self.names.contains(&r.name));
        Ok(TemplateOutcome {
            new_records: Vec::new(),
            deleted_records,
            final_records,
        })
    }

    fn name(&self) -> &'static str {
        "dropping"
    }
}

/// The zone most tests start from
pub fn sample_zone() -> Vec<GenericRecord> {
    vec![
        GenericRecord::new("A", "example.org.", "1.2.3.4", 300),
        GenericRecord::new("TXT", "example.org.", "\"old\"", 3600),
        GenericRecord::new("CNAME", "www.example.org.", "example.org.", 300),
    ]
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(domain: &str) -> SyncConfig {
    SyncConfig::pdns_round_trip(domain, PdnsConfig::new("http://127.0.0.1:8081", "test-key"))
}
