//! Core traits for zone synchronization
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ZoneReader`]: Fetch zone records from a zone-hosting API
//! - [`ZoneWriter`]: Submit records to a provider
//! - [`TemplateEngine`]: Apply a record template between read and write

pub mod zone_reader;
pub mod zone_writer;
pub mod template;

pub use zone_reader::{ZoneReader, ZoneReaderFactory};
pub use zone_writer::{RecordOutcome, RecordReport, WriteReport, ZoneWriter, ZoneWriterFactory};
pub use template::{TemplateEngine, TemplateOutcome, TemplateParams};
