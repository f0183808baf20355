//! Configuration file for the varscope host.
//!
//! The file is TOML with a `[search]` table for the backend and cache
//! parameters and a `[dataset]` table naming the default dataset. Every
//! field is optional; missing fields take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use varscope_search::{Dataset, ReferenceGenome, SearchConfig};

use crate::error::{Result, VarscopeError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarscopeConfig {
    /// Backend, paging, cache and throttle settings.
    pub search: SearchSection,
    /// Dataset queried when none is given on the command line.
    pub dataset: DatasetSection,
}

/// `[search]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Base URL of the Elasticsearch-compatible backend.
    pub base_url: String,
    pub grch37_variant_index: String,
    pub grch38_variant_index: String,
    pub liftover_index: String,
    /// Hits per page; should match the backend's result window.
    pub page_size: usize,
    pub timeout_seconds: u64,
    /// Bases of padding around each exon.
    pub region_padding: u64,
    pub gene_cache_ttl_seconds: u64,
    pub transcript_cache_ttl_seconds: u64,
    /// Minimum seconds between release-date checks.
    pub metadata_refresh_seconds: u64,
    pub liftover_max_results: usize,
    pub cache_capacity: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSection {
    fn from(config: &SearchConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            grch37_variant_index: config.grch37_variant_index.clone(),
            grch38_variant_index: config.grch38_variant_index.clone(),
            liftover_index: config.liftover_index.clone(),
            page_size: config.page_size,
            timeout_seconds: config.timeout_seconds,
            region_padding: config.region_padding,
            gene_cache_ttl_seconds: config.gene_cache_ttl_seconds,
            transcript_cache_ttl_seconds: config.transcript_cache_ttl_seconds,
            metadata_refresh_seconds: config.metadata_refresh_seconds,
            liftover_max_results: config.liftover_max_results,
            cache_capacity: config.cache_capacity,
        }
    }
}

impl From<&SearchSection> for SearchConfig {
    fn from(section: &SearchSection) -> Self {
        Self {
            base_url: section.base_url.clone(),
            grch37_variant_index: section.grch37_variant_index.clone(),
            grch38_variant_index: section.grch38_variant_index.clone(),
            liftover_index: section.liftover_index.clone(),
            page_size: section.page_size,
            timeout_seconds: section.timeout_seconds,
            region_padding: section.region_padding,
            gene_cache_ttl_seconds: section.gene_cache_ttl_seconds,
            transcript_cache_ttl_seconds: section.transcript_cache_ttl_seconds,
            metadata_refresh_seconds: section.metadata_refresh_seconds,
            liftover_max_results: section.liftover_max_results,
            cache_capacity: section.cache_capacity,
        }
    }
}

/// `[dataset]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSection {
    /// Identifier scoping cache keys; distinct per genome build.
    pub dataset_id: String,
    pub reference_genome: ReferenceGenome,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            dataset_id: "clinvar_grch38".into(),
            reference_genome: ReferenceGenome::GRCh38,
        }
    }
}

impl VarscopeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| VarscopeError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VarscopeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/varscope/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::varscope_dirs::config_file()
    }

    /// Load from `path` if given, otherwise from the default path if that
    /// file exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or existing file cannot be loaded,
    /// or the resulting search settings are invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(path = %default_path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.search_config().validate()?;
        Ok(config)
    }

    /// The search layer configuration described by the `[search]` table.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::from(&self.search)
    }

    /// The default dataset described by the `[dataset]` table.
    pub fn dataset(&self) -> Dataset {
        Dataset::new(self.dataset.dataset_id.clone(), self.dataset.reference_genome)
    }
}
