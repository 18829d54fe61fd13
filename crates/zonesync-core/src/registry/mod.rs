//! Plugin-based provider registry
//!
//! The registry allows zone readers and writers to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Registration
//!
//! Provider crates register themselves during initialization:
//!
//! ```rust,ignore
//! let registry = ProviderRegistry::new();
//! zonesync_provider_pdns::register(&registry);
//! zonesync_provider_registrar::register(&registry);
//!
//! let reader = registry.create_reader(&config.reader)?;
//! let writer = registry.create_writer(&config.writer)?;
//! ```

use crate::config::{ReaderConfig, WriterConfig};
use crate::error::{Error, Result};
use crate::traits::{ZoneReader, ZoneReaderFactory, ZoneWriter, ZoneWriterFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Provider registry for plugin-based reader and writer creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered zone reader factories
    readers: RwLock<HashMap<String, Box<dyn ZoneReaderFactory>>>,

    /// Registered zone writer factories
    writers: RwLock<HashMap<String, Box<dyn ZoneWriterFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone reader factory
    ///
    /// # Parameters
    ///
    /// - `name`: Reader type name, matching [`ReaderConfig::type_name`]
    /// - `factory`: Factory object for creating reader instances
    pub fn register_reader(&self, name: impl Into<String>, factory: Box<dyn ZoneReaderFactory>) {
        let mut readers = self.readers.write().unwrap_or_else(PoisonError::into_inner);
        readers.insert(name.into(), factory);
    }

    /// Register a zone writer factory
    ///
    /// # Parameters
    ///
    /// - `name`: Writer type name, matching [`WriterConfig::type_name`]
    /// - `factory`: Factory object for creating writer instances
    pub fn register_writer(&self, name: impl Into<String>, factory: Box<dyn ZoneWriterFactory>) {
        let mut writers = self.writers.write().unwrap_or_else(PoisonError::into_inner);
        writers.insert(name.into(), factory);
    }

    /// Create a zone reader from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ZoneReader>)`: Created reader instance
    /// - `Err(Error)`: If the reader type is not registered or creation fails
    pub fn create_reader(&self, config: &ReaderConfig) -> Result<Box<dyn ZoneReader>> {
        let reader_type = config.type_name();
        let readers = self.readers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = readers
            .get(reader_type)
            .ok_or_else(|| Error::config(format!("Unknown reader type: {}", reader_type)))?;

        factory.create(config)
    }

    /// Create a zone writer from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ZoneWriter>)`: Created writer instance
    /// - `Err(Error)`: If the writer type is not registered or creation fails
    pub fn create_writer(&self, config: &WriterConfig) -> Result<Box<dyn ZoneWriter>> {
        let writer_type = config.type_name();
        let writers = self.writers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = writers
            .get(writer_type)
            .ok_or_else(|| Error::config(format!("Unknown writer type: {}", writer_type)))?;

        factory.create(config)
    }

    /// List all registered reader types
    pub fn list_readers(&self) -> Vec<String> {
        let readers = self.readers.read().unwrap_or_else(PoisonError::into_inner);
        readers.keys().cloned().collect()
    }

    /// List all registered writer types
    pub fn list_writers(&self) -> Vec<String> {
        let writers = self.writers.read().unwrap_or_else(PoisonError::into_inner);
        writers.keys().cloned().collect()
    }

    /// Check if a reader type is registered
    pub fn has_reader(&self, name: &str) -> bool {
        let readers = self.readers.read().unwrap_or_else(PoisonError::into_inner);
        readers.contains_key(name)
    }

    /// Check if a writer type is registered
    pub fn has_writer(&self, name: &str) -> bool {
        let writers = self.writers.read().unwrap_or_else(PoisonError::into_inner);
        writers.contains_key(name)
    }
}
