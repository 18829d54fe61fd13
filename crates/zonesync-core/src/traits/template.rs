// # Template Engine Trait
//
// Domain Connect templates are applied by an external engine. The sync only
// needs its contract: take the current records, return what is new, what was
// removed and the final record set.
//
// Local engines live in `crate::template`.

use crate::record::GenericRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Template variables, e.g. `{"verifytxt": "...", "spftxt": "..."}`
pub type TemplateParams = BTreeMap<String, String>;

/// Result of applying a template to a zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateOutcome {
    /// Records the template added or changed
    pub new_records: Vec<GenericRecord>,
    /// Records the template removed or replaced
    pub deleted_records: Vec<GenericRecord>,
    /// The complete record set after applying the template
    pub final_records: Vec<GenericRecord>,
}

/// Trait for template engines
#[async_trait]
pub trait TemplateEngine: Send + Sync {
    /// Apply the template to `records` of `domain`
    ///
    /// `host` is the label the template is applied under; an empty string
    /// means the zone apex.
    async fn apply(
        &self,
        records: &[GenericRecord],
        domain: &str,
        host: &str,
        params: &TemplateParams,
    ) -> Result<TemplateOutcome, crate::Error>;

    /// Engine name (for logging/debugging)
    fn name(&self) -> &'static str;
}
