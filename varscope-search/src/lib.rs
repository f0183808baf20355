//! # varscope-search
//!
//! Region-aware variant search and caching over an Elasticsearch-compatible
//! backend holding GRCh37 and GRCh38 variant indices.
//!
//! ## Design
//!
//! - Exons are padded and merged into a minimal set of query ranges
//! - Result sets larger than the backend's page cap are fetched completely
//!   with search-after cursors and a stable `variant_id` tiebreaker
//! - Full records are shaped into summaries with one representative
//!   consequence before caching
//! - Gene and transcript results are cached with per-context TTLs and at
//!   most one computation in flight per key
//! - The cross-build release date is refreshed at most once per window;
//!   a mismatch between builds is logged, never fatal
//!
//! ## Errors
//!
//! Every fallible operation returns [`SearchError`]. A variant that does not
//! exist is `Ok(None)`, not an error. Data-quality problems are logged with
//! `tracing` and do not fail the request.

pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod liftover;
pub mod query;
pub mod region;
pub mod service;
pub mod shaping;
pub mod throttle;
pub mod types;

#[cfg(test)]
mod test_support;

pub use backend::{Hit, SearchBackend};
pub use cache::{CacheStore, MemoryStore, SingleFlightCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use http::ElasticsearchBackend;
pub use service::{Dataset, SummaryList, VariantSearch};
pub use types::{
    Exon, Gene, GenomicRegion, LiftoverCorrespondence, QueryContext, ReferenceGenome, Transcript,
    VariantRecord, VariantSummary,
};

/// Connect a [`VariantSearch`] to the HTTP backend named in `config`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid, or
/// [`SearchError::Http`] if the HTTP client cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> varscope_search::Result<()> {
/// use varscope_search::{Dataset, GenomicRegion, ReferenceGenome, SearchConfig};
///
/// let search = varscope_search::connect(SearchConfig::default())?;
/// let dataset = Dataset::new("clinvar_grch38", ReferenceGenome::GRCh38);
/// let region = GenomicRegion::new("13", 32_315_000, 32_316_000)?;
/// for variant in search.fetch_variants_by_region(&dataset, &region).await? {
///     println!("{} {:?}", variant.variant_id, variant.clinical_significance);
/// }
/// # Ok(())
/// # }
/// ```
pub fn connect(config: SearchConfig) -> Result<VariantSearch<ElasticsearchBackend>> {
    config.validate()?;
    let backend = ElasticsearchBackend::new(&config)?;
    VariantSearch::new(backend, config)
}
