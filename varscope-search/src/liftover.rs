//! Lookup of variant correspondences between the two genome builds.
//!
//! The liftover index stores directed edges `source -> liftover`. A
//! variant can be resolved from either end. Entries whose counterpart
//! identifier is malformed are index noise and are dropped.

use std::sync::Arc;

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::query::liftover_query;
use crate::types::{is_variant_id, LiftoverCorrespondence, ReferenceGenome};

/// Which end of the correspondence the lookup matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Liftover,
}

impl Side {
    fn field(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Liftover => "liftover",
        }
    }
}

/// Resolves liftover correspondences from the liftover index.
pub struct LiftoverResolver<B> {
    backend: Arc<B>,
    index: String,
    max_results: usize,
}

impl<B: SearchBackend> LiftoverResolver<B> {
    pub fn new(backend: Arc<B>, index: impl Into<String>, max_results: usize) -> Self {
        Self {
            backend,
            index: index.into(),
            max_results,
        }
    }

    /// Correspondences whose source is `variant_id` in `reference_genome`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the backend request fails or a document
    /// does not have the correspondence shape.
    pub async fn resolve_by_source(
        &self,
        variant_id: &str,
        reference_genome: ReferenceGenome,
    ) -> Result<Vec<LiftoverCorrespondence>, SearchError> {
        self.resolve(Side::Source, variant_id, reference_genome).await
    }

    /// Correspondences whose lifted-over target is `variant_id` in
    /// `reference_genome`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve_by_source`].
    pub async fn resolve_by_target(
        &self,
        variant_id: &str,
        reference_genome: ReferenceGenome,
    ) -> Result<Vec<LiftoverCorrespondence>, SearchError> {
        self.resolve(Side::Liftover, variant_id, reference_genome).await
    }

    async fn resolve(
        &self,
        side: Side,
        variant_id: &str,
        reference_genome: ReferenceGenome,
    ) -> Result<Vec<LiftoverCorrespondence>, SearchError> {
        let query = liftover_query(side.field(), variant_id, reference_genome);
        let hits = self
            .backend
            .search(&self.index, &query, self.max_results, None)
            .await?;

        let total = hits.len();
        let mut resolved = Vec::with_capacity(total);
        for hit in hits {
            let doc: LiftoverCorrespondence = serde_json::from_value(hit.source)
                .map_err(|e| SearchError::Parse(format!("malformed liftover document: {e}")))?;
            let counterpart = match side {
                Side::Source => &doc.liftover.variant_id,
                Side::Liftover => &doc.source.variant_id,
            };
            if is_variant_id(counterpart) {
                resolved.push(doc);
            }
        }

        let dropped = total - resolved.len();
        if dropped > 0 {
            tracing::debug!(
                variant_id,
                reference_genome = %reference_genome,
                dropped,
                "dropped liftover entries with malformed variant ids"
            );
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBackend;
    use serde_json::{json, Value};

    const INDEX: &str = "liftover";

    fn edge(source: &str, source_genome: &str, target: &str, target_genome: &str) -> Value {
        json!({
            "source": { "variant_id": source, "reference_genome": source_genome },
            "liftover": { "variant_id": target, "reference_genome": target_genome }
        })
    }

    fn resolver(docs: Vec<Value>, max: usize) -> (Arc<FakeBackend>, LiftoverResolver<FakeBackend>) {
        let backend = Arc::new(FakeBackend::new().with_docs(INDEX, docs));
        (Arc::clone(&backend), LiftoverResolver::new(backend, INDEX, max))
    }

    #[tokio::test]
    async fn resolves_by_source_and_drops_malformed_targets() {
        let (_, resolver) = resolver(
            vec![
                edge("1-55516888-G-GA", "GRCh37", "1-55051215-G-GA", "GRCh38"),
                edge("1-55516888-G-GA", "GRCh37", "1-55051215-G", "GRCh38"),
                edge("2-100-A-T", "GRCh37", "2-200-A-T", "GRCh38"),
            ],
            100,
        );

        let found = resolver
            .resolve_by_source("1-55516888-G-GA", ReferenceGenome::GRCh37)
            .await
            .expect("resolve");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].liftover.variant_id, "1-55051215-G-GA");
        assert_eq!(found[0].liftover.reference_genome, ReferenceGenome::GRCh38);
    }

    #[tokio::test]
    async fn resolves_by_target_and_checks_source_ids() {
        let (_, resolver) = resolver(
            vec![
                edge("1-55516888-G-GA", "GRCh37", "1-55051215-G-GA", "GRCh38"),
                edge("not-a-variant", "GRCh37", "1-55051215-G-GA", "GRCh38"),
            ],
            100,
        );

        let found = resolver
            .resolve_by_target("1-55051215-G-GA", ReferenceGenome::GRCh38)
            .await
            .expect("resolve");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source.variant_id, "1-55516888-G-GA");
    }

    #[tokio::test]
    async fn build_must_match() {
        let (_, resolver) = resolver(
            vec![edge("1-55516888-G-GA", "GRCh37", "1-55051215-G-GA", "GRCh38")],
            100,
        );
        let found = resolver
            .resolve_by_source("1-55516888-G-GA", ReferenceGenome::GRCh38)
            .await
            .expect("resolve");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn request_is_bounded_by_max_results() {
        let docs = (1..=5)
            .map(|i| edge("3-10-C-T", "GRCh37", &format!("3-{}-C-T", 100 + i), "GRCh38"))
            .collect();
        let (backend, resolver) = resolver(docs, 3);

        let found = resolver
            .resolve_by_source("3-10-C-T", ReferenceGenome::GRCh37)
            .await
            .expect("resolve");
        assert_eq!(found.len(), 3);
        let searches = backend.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].size, 3);
        assert_eq!(searches[0].index, INDEX);
    }

    #[tokio::test]
    async fn malformed_document_is_parse_error() {
        let (_, resolver) = resolver(
            vec![json!({ "source": { "variant_id": "1-1-A-T", "reference_genome": "GRCh37" } })],
            100,
        );
        let err = resolver
            .resolve_by_source("1-1-A-T", ReferenceGenome::GRCh37)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
