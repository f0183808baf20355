//! Trait definition for the document-search backend.
//!
//! The backend answers structured boolean/range queries over named
//! indices. [`crate::http::ElasticsearchBackend`] talks to a live
//! Elasticsearch-compatible cluster; tests substitute an in-memory double.

use serde_json::Value;

use crate::error::SearchError;
use crate::query::VariantQuery;
use crate::types::IndexMetadata;

/// One document returned by a search request.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// The stored document, restricted to the requested projection.
    pub source: Value,
    /// Sort values of this document, used as the next page's cursor.
    pub sort: Vec<Value>,
}

/// A document store answering variant queries.
///
/// Implementations own transport concerns (timeouts, connection reuse)
/// and map every failure to a [`SearchError`]. They never retry on their
/// own: a failed request fails the operation that issued it.
///
/// All implementations must be `Send + Sync` so a single backend can serve
/// concurrent queries.
pub trait SearchBackend: Send + Sync {
    /// Return up to `size` hits matching `query` in its sort order,
    /// starting strictly after `search_after` when given.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the response cannot
    /// be interpreted.
    fn search(
        &self,
        index: &str,
        query: &VariantQuery,
        size: usize,
        search_after: Option<&[Value]>,
    ) -> impl std::future::Future<Output = Result<Vec<Hit>, SearchError>> + Send;

    /// Count the documents matching `query`, ignoring sort and projection.
    fn count(
        &self,
        index: &str,
        query: &VariantQuery,
    ) -> impl std::future::Future<Output = Result<u64, SearchError>> + Send;

    /// Read the metadata published on `index`.
    fn index_metadata(
        &self,
        index: &str,
    ) -> impl std::future::Future<Output = Result<IndexMetadata, SearchError>> + Send;
}
