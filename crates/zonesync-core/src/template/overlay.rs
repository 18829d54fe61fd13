// # Overlay Template
//
// Applies a fixed list of template records on top of a zone.
//
// ## Template File Format
//
// ```json
// {
//   "records": [
//     { "type": "TXT", "name": "@", "data": "%verifytxt%", "ttl": 3600 },
//     { "type": "CNAME", "name": "mail", "data": "ghs.example.net.", "ttl": 3600 }
//   ]
// }
// ```
//
// ## Rules
//
// - `%var%` in `name` or `data` is replaced from the template params; an
//   unknown variable fails the whole application. `%%` is a literal `%`.
// - Name `@` is the target apex: the domain, or `host.domain` when a host is
//   given. Other names without a trailing dot are relative to that apex.
//   Resolved names are fully qualified with a trailing dot.
// - Each template record claims its `(name, type)` slot. Existing records in
//   a claimed slot that the template does not also contain are deleted;
//   template records not already present are new. Re-applying the same
//   template to its own output changes nothing.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use crate::Error;
use crate::record::GenericRecord;
use crate::traits::template::{TemplateEngine, TemplateOutcome, TemplateParams};

/// Serializable template file format
#[derive(Debug, Deserialize)]
struct OverlayFile {
    records: Vec<GenericRecord>,
}

/// Template engine applying a fixed record list
#[derive(Debug, Clone)]
pub struct OverlayTemplate {
    records: Vec<GenericRecord>,
}

impl OverlayTemplate {
    /// Create an overlay from template records
    pub fn new(records: Vec<GenericRecord>) -> Self {
        Self { records }
    }

    /// Load an overlay from a JSON template file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::template(format!(
                "Failed to read template file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: OverlayFile = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded overlay template {} ({} records)",
            path.display(),
            file.records.len()
        );

        Ok(Self::new(file.records))
    }

    /// Template records as loaded (unresolved)
    pub fn records(&self) -> &[GenericRecord] {
        &self.records
    }

    fn resolve(
        &self,
        domain: &str,
        host: &str,
        params: &TemplateParams,
    ) -> Result<Vec<GenericRecord>, Error> {
        let apex = if host.is_empty() {
            domain.trim_end_matches('.').to_string()
        } else {
            format!("{}.{}", host, domain.trim_end_matches('.'))
        };

        self.records
            .iter()
            .map(|record| {
                let name = substitute(&record.name, params)?;
                let data = substitute(&record.data, params)?;
                Ok(GenericRecord {
                    record_type: record.record_type.clone(),
                    name: qualify(&name, &apex),
                    data,
                    ttl: record.ttl,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TemplateEngine for OverlayTemplate {
    async fn apply(
        &self,
        records: &[GenericRecord],
        domain: &str,
        host: &str,
        params: &TemplateParams,
    ) -> Result<TemplateOutcome, Error> {
        let template = self.resolve(domain, host, params)?;

        let claimed = |record: &GenericRecord| template.iter().any(|t| t.same_slot(record));
        let in_template = |record: &GenericRecord| template.iter().any(|t| same_record(t, record));
        let in_zone = |record: &GenericRecord| records.iter().any(|r| same_record(r, record));

        let deleted_records: Vec<GenericRecord> = records
            .iter()
            .filter(|r| claimed(*r) && !in_template(*r))
            .cloned()
            .collect();

        let new_records: Vec<GenericRecord> =
            template.iter().filter(|t| !in_zone(*t)).cloned().collect();

        let final_records = records
            .iter()
            .filter(|r| !(claimed(*r) && !in_template(*r)))
            .chain(new_records.iter())
            .cloned()
            .collect();

        tracing::debug!(
            "Overlay on {}: {} new, {} deleted",
            domain,
            new_records.len(),
            deleted_records.len()
        );

        Ok(TemplateOutcome {
            new_records,
            deleted_records,
            final_records,
        })
    }

    fn name(&self) -> &'static str {
        "overlay"
    }
}

fn same_record(a: &GenericRecord, b: &GenericRecord) -> bool {
    a.same_slot(b) && a.data == b.data && a.ttl == b.ttl
}

fn qualify(name: &str, apex: &str) -> String {
    if name == "@" || name.is_empty() {
        format!("{}.", apex)
    } else if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.{}.", name, apex)
    }
}

/// Replace `%var%` placeholders from `params`
fn substitute(input: &str, params: &TemplateParams) -> Result<String, Error> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('%') else {
            // unterminated, keep as-is
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let key = &after[..end];
        if key.is_empty() {
            out.push('%');
        } else {
            let value = params
                .get(key)
                .ok_or_else(|| Error::template(format!("Missing template variable: {}", key)))?;
            out.push_str(value);
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
