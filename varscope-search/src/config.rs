//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] names the backend and its indices and carries the
//! paging, padding, cache and throttle parameters. The defaults match the
//! production ClinVar variant indices.

use std::time::Duration;

use url::Url;

use crate::error::SearchError;
use crate::types::ReferenceGenome;

/// Configuration for the variant search layer.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the Elasticsearch-compatible backend.
    pub base_url: String,
    /// Variant index holding GRCh37 documents.
    pub grch37_variant_index: String,
    /// Variant index holding GRCh38 documents.
    pub grch38_variant_index: String,
    /// Index of directed liftover correspondences.
    pub liftover_index: String,
    /// Hits requested per page. Should equal the backend's result window.
    pub page_size: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Bases added on each side of an exon before merging.
    pub region_padding: u64,
    /// How long gene-scoped results stay cached.
    pub gene_cache_ttl_seconds: u64,
    /// How long transcript-scoped results stay cached.
    pub transcript_cache_ttl_seconds: u64,
    /// Minimum interval between two release-date metadata fetches.
    pub metadata_refresh_seconds: u64,
    /// Maximum number of liftover documents returned per lookup.
    pub liftover_max_results: usize,
    /// Maximum number of entity result sets held by the in-memory store.
    pub cache_capacity: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".into(),
            grch37_variant_index: "clinvar_grch37_variants".into(),
            grch38_variant_index: "clinvar_grch38_variants".into(),
            liftover_index: "liftover".into(),
            page_size: 10_000,
            timeout_seconds: 30,
            region_padding: 75,
            gene_cache_ttl_seconds: 7 * 24 * 60 * 60,
            transcript_cache_ttl_seconds: 60 * 60,
            metadata_refresh_seconds: 5 * 60,
            liftover_max_results: 100,
            cache_capacity: 1_000,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` must parse as an absolute URL
    /// - index names must not be empty
    /// - `page_size`, `timeout_seconds` and `liftover_max_results` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("base_url is not a valid URL: {e}")))?;
        for (name, value) in [
            ("grch37_variant_index", &self.grch37_variant_index),
            ("grch38_variant_index", &self.grch38_variant_index),
            ("liftover_index", &self.liftover_index),
        ] {
            if value.trim().is_empty() {
                return Err(SearchError::Config(format!("{name} must not be empty")));
            }
        }
        if self.page_size == 0 {
            return Err(SearchError::Config(
                "page_size must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.liftover_max_results == 0 {
            return Err(SearchError::Config(
                "liftover_max_results must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The variant index holding documents for `genome`.
    pub fn variant_index(&self, genome: ReferenceGenome) -> &str {
        match genome {
            ReferenceGenome::GRCh37 => &self.grch37_variant_index,
            ReferenceGenome::GRCh38 => &self.grch38_variant_index,
        }
    }

    pub fn gene_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.gene_cache_ttl_seconds)
    }

    pub fn transcript_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.transcript_cache_ttl_seconds)
    }

    pub fn metadata_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.metadata_refresh_seconds)
    }
}
