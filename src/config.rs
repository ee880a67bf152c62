//! Configuration for rowdb collections
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Configuration for a single collection
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the collection's data file
    /// Internal structure:
    ///   {dir}/
    ///     └── data.db          (fixed-width rows, no header)
    ///
    /// Blob columns keep their own directories (see `Field::binary`).
    pub dir: PathBuf,

    // -------------------------------------------------------------------------
    // Identifier Configuration
    // -------------------------------------------------------------------------
    /// How row ids are presented to callers
    pub id_mode: IdMode,
}

/// Row id presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMode {
    /// Ids are the raw row index (0, 1, 2, ...)
    #[default]
    Numeric,

    /// Ids are surrogate strings produced by `id::encode`
    Surrogate,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./rowdb_data"),
            id_mode: IdMode::Numeric,
        }
    }
}

impl CollectionConfig {
    /// Create a new config builder
    pub fn builder() -> CollectionConfigBuilder {
        CollectionConfigBuilder::default()
    }
}

/// Builder for CollectionConfig
#[derive(Default)]
pub struct CollectionConfigBuilder {
    config: CollectionConfig,
}

impl CollectionConfigBuilder {
    /// Set the collection directory
    pub fn dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dir = path.into();
        self
    }

    /// Set the id presentation mode
    pub fn id_mode(mut self, mode: IdMode) -> Self {
        self.config.id_mode = mode;
        self
    }

    /// Shorthand for `id_mode(IdMode::Surrogate)` when `enabled`
    pub fn string_ids(self, enabled: bool) -> Self {
        self.id_mode(if enabled { IdMode::Surrogate } else { IdMode::Numeric })
    }

    pub fn build(self) -> CollectionConfig {
        self.config
    }
}
