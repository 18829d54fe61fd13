//! Record shapes and conversions
//!
//! Two representations travel through a sync:
//!
//! - [`PdnsRrset`]: the PowerDNS-style rrset as returned by the zone API
//! - [`GenericRecord`]: the flat `{type, name, data, ttl}` shape used by
//!   Domain Connect templates and by registrar APIs
//!
//! [`PdnsPatch`] is the write body for the PowerDNS-style PATCH endpoint.
//!
//! ## Narrowing
//!
//! An rrset may hold several record contents, a generic record holds one.
//! Converting keeps the first content only and logs how many were dropped.
//!
//! SRV-style fields (`service`, `protocol`, `port`, `weight`, `priority`)
//! are not modelled; SRV rrsets pass through with their raw content string.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single record content inside an rrset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRecord {
    /// Record content in presentation format (e.g. "1.2.3.4")
    pub content: String,

    /// Whether the server ignores this record
    #[serde(default)]
    pub disabled: bool,
}

impl PdnsRecord {
    /// Create an enabled record with the given content
    pub fn enabled(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            disabled: false,
        }
    }
}

/// A resource-record set as returned by the PowerDNS-style zone API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRrset {
    /// Owner name (usually fully qualified with a trailing dot)
    pub name: String,

    /// Record type ("A", "MX", "TXT", ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Time-to-live in seconds
    pub ttl: u32,

    /// Record contents sharing this name and type
    #[serde(default)]
    pub records: Vec<PdnsRecord>,
}

/// Body of `GET /api/v1/servers/{server_id}/zones/{zone}`
///
/// Only the rrsets are read, everything else the server sends is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdnsZone {
    /// All rrsets of the zone
    #[serde(default)]
    pub rrsets: Vec<PdnsRrset>,
}

/// Record in the generic `{type, name, data, ttl}` shape
///
/// This is also the exact wire shape of the registrar record API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericRecord {
    /// Record type ("A", "CNAME", "TXT", ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Owner name
    pub name: String,

    /// Single content value
    pub data: String,

    /// Time-to-live in seconds
    pub ttl: u32,
}

impl GenericRecord {
    /// Create a new generic record
    pub fn new(
        record_type: impl Into<String>,
        name: impl Into<String>,
        data: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            name: name.into(),
            data: data.into(),
            ttl,
        }
    }

    /// Whether this record occupies the same `(name, type)` slot as `other`
    ///
    /// Names compare case-insensitively and ignore a trailing dot.
    pub fn same_slot(&self, other: &GenericRecord) -> bool {
        self.record_type.eq_ignore_ascii_case(&other.record_type)
            && normalize_name(&self.name) == normalize_name(&other.name)
    }
}

impl TryFrom<&PdnsRrset> for GenericRecord {
    type Error = Error;

    fn try_from(rrset: &PdnsRrset) -> Result<Self> {
        let first = rrset.records.first().ok_or_else(|| Error::EmptyRrset {
            name: rrset.name.clone(),
            record_type: rrset.record_type.clone(),
        })?;

        if rrset.records.len() > 1 {
            tracing::warn!(
                "rrset {} ({}) holds {} records, keeping the first and dropping {}",
                rrset.name,
                rrset.record_type,
                rrset.records.len(),
                rrset.records.len() - 1
            );
        }

        if rrset.record_type.eq_ignore_ascii_case("SRV") {
            tracing::debug!(
                "SRV rrset {} converted without service/protocol/port/weight/priority fields",
                rrset.name
            );
        }

        Ok(Self {
            record_type: rrset.record_type.clone(),
            name: rrset.name.clone(),
            data: first.content.clone(),
            ttl: rrset.ttl,
        })
    }
}

impl TryFrom<PdnsRrset> for GenericRecord {
    type Error = Error;

    fn try_from(rrset: PdnsRrset) -> Result<Self> {
        GenericRecord::try_from(&rrset)
    }
}

/// How the server should treat a patched rrset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    /// Replace all records of the rrset
    Replace,
    /// Remove the rrset
    Delete,
}

/// One rrset entry of a PATCH body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRrsetChange {
    /// Owner name
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,

    /// Time-to-live in seconds
    pub ttl: u32,

    /// Change to apply
    pub changetype: ChangeType,

    /// New record contents (empty for deletions)
    pub records: Vec<PdnsRecord>,
}

/// Body of `PATCH /api/v1/servers/{server_id}/zones/{zone}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsPatch {
    /// Rrsets to change
    pub rrsets: Vec<PdnsRrsetChange>,
}

impl PdnsPatch {
    /// Build a patch replacing the rrset of `record` with its single content
    pub fn replace(record: &GenericRecord) -> Self {
        Self {
            rrsets: vec![PdnsRrsetChange {
                name: record.name.clone(),
                record_type: record.record_type.clone(),
                ttl: record.ttl,
                changetype: ChangeType::Replace,
                records: vec![PdnsRecord::enabled(record.data.clone())],
            }],
        }
    }

    /// Build a patch deleting the rrset `record` lives in
    pub fn delete(record: &GenericRecord) -> Self {
        Self {
            rrsets: vec![PdnsRrsetChange {
                name: record.name.clone(),
                record_type: record.record_type.clone(),
                ttl: record.ttl,
                changetype: ChangeType::Delete,
                records: Vec::new(),
            }],
        }
    }
}

/// Convert every rrset of a zone, failing on the first empty one
pub fn convert_rrsets(rrsets: &[PdnsRrset]) -> Result<Vec<GenericRecord>> {
    rrsets.iter().map(GenericRecord::try_from).collect()
}

fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
