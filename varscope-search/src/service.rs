//! Entry point that wires the search layer together.
//!
//! [`VariantSearch`] owns the backend, the entity cache, the release-date
//! refresher and the liftover resolver. Gene and transcript fetches go
//! through region merging, exhaustive paging, shaping and the single-flight
//! cache; region and identifier lookups go straight to the backend.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{Hit, SearchBackend};
use crate::cache::{CacheStore, MemoryStore, SingleFlightCache};
use crate::clock::{Clock, SystemClock};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::fetch::fetch_all_hits;
use crate::liftover::LiftoverResolver;
use crate::query::{region_query, regions_query, variant_id_query};
use crate::region::entity_regions;
use crate::shaping::shape;
use crate::throttle::ThrottledMetadataRefresher;
use crate::types::{
    canonical_chrom, Exon, Gene, GenomicRegion, QueryContext, ReferenceGenome, Transcript,
    VariantRecord, VariantSummary,
};

/// A shared, immutable list of summaries as held by the entity cache.
pub type SummaryList = Arc<Vec<VariantSummary>>;

/// A dataset: an identifier plus the genome build its variants are on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub dataset_id: String,
    pub reference_genome: ReferenceGenome,
}

impl Dataset {
    pub fn new(dataset_id: impl Into<String>, reference_genome: ReferenceGenome) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            reference_genome,
        }
    }

    /// Scope of this dataset's cache entries. Includes the build, so the
    /// same identifier on two builds never shares an entry.
    pub fn cache_scope(&self) -> String {
        format!("{}@{}", self.dataset_id, self.reference_genome)
    }
}

/// Region-aware variant search over a [`SearchBackend`].
pub struct VariantSearch<B, S = MemoryStore<SummaryList>> {
    backend: Arc<B>,
    config: SearchConfig,
    cache: SingleFlightCache<SummaryList, S>,
    refresher: ThrottledMetadataRefresher<B>,
    liftover: LiftoverResolver<B>,
}

impl<B> VariantSearch<B>
where
    B: SearchBackend + 'static,
{
    /// Build a search service with an in-memory cache and the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(backend: B, config: SearchConfig) -> Result<Self, SearchError> {
        Self::with_clock(backend, config, Arc::new(SystemClock))
    }

    /// Like [`Self::new`] but with an explicit time source.
    pub fn with_clock(
        backend: B,
        config: SearchConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SearchError> {
        let store = MemoryStore::new(config.cache_capacity, Arc::clone(&clock));
        Self::with_store(backend, config, store, clock)
    }
}

impl<B, S> VariantSearch<B, S>
where
    B: SearchBackend + 'static,
    S: CacheStore<SummaryList> + 'static,
{
    /// Build a search service on top of an external cache store.
    pub fn with_store(
        backend: B,
        config: SearchConfig,
        store: S,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let backend = Arc::new(backend);
        let refresher = ThrottledMetadataRefresher::new(
            Arc::clone(&backend),
            config.grch37_variant_index.clone(),
            config.grch38_variant_index.clone(),
            config.metadata_refresh_interval(),
            clock,
        );
        let liftover = LiftoverResolver::new(
            Arc::clone(&backend),
            config.liftover_index.clone(),
            config.liftover_max_results,
        );
        Ok(Self {
            backend,
            config,
            cache: SingleFlightCache::new(store),
            refresher,
            liftover,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache(&self) -> &SingleFlightCache<SummaryList, S> {
        &self.cache
    }

    /// All variants overlapping the gene's exons, each with the most
    /// severe consequence for that gene.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if any page fails or a document cannot be
    /// decoded. Failures are not cached.
    pub async fn fetch_variants_by_gene(
        &self,
        dataset: &Dataset,
        gene: &Gene,
    ) -> Result<SummaryList, SearchError> {
        self.fetch_entity(
            dataset,
            QueryContext::Gene(gene.gene_id.clone()),
            &gene.chrom,
            &gene.exons,
            self.config.gene_cache_ttl(),
        )
        .await
    }

    /// All variants overlapping the transcript's exons, each with its
    /// consequence on that transcript.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_variants_by_gene`].
    pub async fn fetch_variants_by_transcript(
        &self,
        dataset: &Dataset,
        transcript: &Transcript,
    ) -> Result<SummaryList, SearchError> {
        self.fetch_entity(
            dataset,
            QueryContext::Transcript(transcript.transcript_id.clone()),
            &transcript.chrom,
            &transcript.exons,
            self.config.transcript_cache_ttl(),
        )
        .await
    }

    /// All variants inside `region`. Not cached.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if any page fails or a document cannot be
    /// decoded.
    pub async fn fetch_variants_by_region(
        &self,
        dataset: &Dataset,
        region: &GenomicRegion,
    ) -> Result<Vec<VariantSummary>, SearchError> {
        let index = self.config.variant_index(dataset.reference_genome);
        let hits = fetch_all_hits(
            &*self.backend,
            index,
            &region_query(region),
            self.config.page_size,
        )
        .await?;
        tracing::debug!(region = %region, variants = hits.len(), "region fetch complete");
        shape_hits(hits, &QueryContext::Region)
    }

    /// The full record for `variant_id`, or `None` if the index has no such
    /// variant.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the document cannot
    /// be decoded.
    pub async fn fetch_variant_by_id(
        &self,
        dataset: &Dataset,
        variant_id: &str,
    ) -> Result<Option<VariantRecord>, SearchError> {
        let index = self.config.variant_index(dataset.reference_genome);
        let hits = self
            .backend
            .search(index, &variant_id_query(variant_id), 1, None)
            .await?;
        hits.into_iter()
            .next()
            .map(|hit| decode_record(hit.source))
            .transpose()
    }

    /// Number of variants inside `region`, counted by the backend.
    pub async fn count_variants_in_region(
        &self,
        dataset: &Dataset,
        region: &GenomicRegion,
    ) -> Result<u64, SearchError> {
        let index = self.config.variant_index(dataset.reference_genome);
        self.backend.count(index, &region_query(region)).await
    }

    /// Release date of the variant indices, refreshed at most once per
    /// configured window.
    pub async fn release_date(&self) -> Result<String, SearchError> {
        self.refresher.release_date().await
    }

    pub fn liftover(&self) -> &LiftoverResolver<B> {
        &self.liftover
    }

    async fn fetch_entity(
        &self,
        dataset: &Dataset,
        context: QueryContext,
        chrom: &str,
        exons: &[Exon],
        ttl: Duration,
    ) -> Result<SummaryList, SearchError> {
        let chrom = canonical_chrom(chrom)
            .ok_or_else(|| SearchError::Config(format!("unknown chromosome: {chrom}")))?;
        let regions = entity_regions(&chrom, exons, self.config.region_padding);
        let backend = Arc::clone(&self.backend);
        let index = self.config.variant_index(dataset.reference_genome).to_string();
        let page_size = self.config.page_size;
        let key = context.cache_key(&dataset.cache_scope());

        let compute = move || async move {
            if regions.is_empty() {
                return Ok(Arc::new(Vec::new()));
            }
            tracing::debug!(
                context = context.tag(),
                chrom = %chrom,
                regions = regions.len(),
                "fetching entity variants"
            );
            let query = regions_query(&chrom, &regions);
            let hits = fetch_all_hits(&*backend, &index, &query, page_size).await?;
            shape_hits(hits, &context).map(Arc::new)
        };

        match key {
            Some(key) => self.cache.get_or_compute(key, ttl, compute).await,
            None => compute().await,
        }
    }
}

fn decode_record(source: serde_json::Value) -> Result<VariantRecord, SearchError> {
    serde_json::from_value(source)
        .map_err(|e| SearchError::Parse(format!("malformed variant document: {e}")))
}

fn shape_hits(hits: Vec<Hit>, context: &QueryContext) -> Result<Vec<VariantSummary>, SearchError> {
    hits.into_iter()
        .map(|hit| decode_record(hit.source).map(|record| shape(record, context)))
        .collect()
}
