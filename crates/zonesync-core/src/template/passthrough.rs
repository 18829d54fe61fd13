// # Passthrough Template
//
// Returns the zone unchanged: nothing new, nothing deleted, the final set is
// the input. Used for plain copies between providers.

use async_trait::async_trait;

use crate::Error;
use crate::record::GenericRecord;
use crate::traits::template::{TemplateEngine, TemplateOutcome, TemplateParams};

/// Template engine that changes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTemplate;

impl PassthroughTemplate {
    /// Create a passthrough engine
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TemplateEngine for PassthroughTemplate {
    async fn apply(
        &self,
        records: &[GenericRecord],
        _domain: &str,
        _host: &str,
        _params: &TemplateParams,
    ) -> Result<TemplateOutcome, Error> {
        Ok(TemplateOutcome {
            new_records: Vec::new(),
            deleted_records: Vec::new(),
            final_records: records.to_vec(),
        })
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
