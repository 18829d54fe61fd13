// # zonesync-core
//
// Core library for synchronizing DNS zones between a PowerDNS-style zone API
// and a registrar API.
//
// ## Architecture Overview
//
// - **ZoneReader**: Trait for fetching zone records as generic records
// - **TemplateEngine**: Trait for the Domain Connect template step
// - **ZoneWriter**: Trait for submitting records to a provider
// - **SyncEngine**: Runs read → template → write once
// - **ProviderRegistry**: Plugin-based registry for readers and writers
//
// ## Record Shapes
//
// Zone APIs speak rrsets (`{name, type, ttl, records: [...]}`); templates and
// registrars speak the generic `{type, name, data, ttl}` shape. Conversions
// live in [`record`].

pub mod traits;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;
pub mod record;
pub mod template;

// Re-export core types for convenience
pub use traits::{TemplateEngine, ZoneReader, ZoneWriter};
pub use traits::{RecordOutcome, RecordReport, TemplateOutcome, TemplateParams, WriteReport};
pub use engine::{SyncEngine, SyncReport};
pub use registry::ProviderRegistry;
pub use config::{PdnsConfig, ReaderConfig, RegistrarConfig, SyncConfig, TemplateConfig, WriterConfig};
pub use error::{Error, Result};
pub use record::{GenericRecord, PdnsPatch, PdnsRrset};
pub use template::{OverlayTemplate, PassthroughTemplate};
