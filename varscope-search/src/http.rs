//! HTTP client for an Elasticsearch-compatible search backend.
//!
//! Provides a configured [`reqwest::Client`] and [`ElasticsearchBackend`],
//! the production implementation of [`SearchBackend`].

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::backend::{Hit, SearchBackend};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::query::VariantQuery;
use crate::types::IndexMetadata;

/// Longest backend error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Build a [`reqwest::Client`] configured for backend requests.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(concat!("varscope-search/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Search backend speaking the Elasticsearch `_search`, `_count` and
/// `_mapping` APIs.
#[derive(Debug, Clone)]
pub struct ElasticsearchBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl ElasticsearchBackend {
    /// Create a backend for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the base URL is invalid, or
    /// [`SearchError::Http`] if the client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        Ok(Self {
            client: build_client(config)?,
            base_url,
        })
    }

    fn endpoint(&self, index: &str, action: &str) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SearchError::Config(format!("base_url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(index)
            .push(action);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, SearchError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(SearchError::Backend(format!("{status}: {excerpt}")));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::Parse(format!("invalid backend response: {e}")))
    }
}

fn transport_error(e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout(e.to_string())
    } else {
        SearchError::Http(format!("backend request failed: {e}"))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_source", default)]
    source: Value,
    #[serde(default)]
    sort: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// Parse a `_search` response body into hits.
pub(crate) fn parse_search_response(body: Value) -> Result<Vec<Hit>, SearchError> {
    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| SearchError::Parse(format!("unexpected search response: {e}")))?;
    Ok(response
        .hits
        .hits
        .into_iter()
        .map(|raw| Hit {
            source: raw.source,
            sort: raw.sort,
        })
        .collect())
}

/// Read `_meta.release_date` from a `_mapping` response.
///
/// The response is keyed by concrete index name, which differs from the
/// requested name when an alias is used; the first entry is taken.
pub(crate) fn parse_mapping_response(body: &Value) -> Result<IndexMetadata, SearchError> {
    let release_date = body
        .as_object()
        .and_then(|indices| indices.values().next())
        .and_then(|index| index.pointer("/mappings/_meta/release_date"))
        .and_then(Value::as_str)
        .ok_or_else(|| SearchError::Parse("mapping has no _meta.release_date".into()))?;
    Ok(IndexMetadata {
        release_date: release_date.to_string(),
    })
}

impl SearchBackend for ElasticsearchBackend {
    async fn search(
        &self,
        index: &str,
        query: &VariantQuery,
        size: usize,
        search_after: Option<&[Value]>,
    ) -> Result<Vec<Hit>, SearchError> {
        let url = self.endpoint(index, "_search")?;
        let body = query.search_body(size, search_after);
        tracing::trace!(index, size, cursor = search_after.is_some(), "search request");
        let response = self.send(self.client.post(url).json(&body)).await?;
        parse_search_response(response)
    }

    async fn count(&self, index: &str, query: &VariantQuery) -> Result<u64, SearchError> {
        let url = self.endpoint(index, "_count")?;
        let response = self
            .send(self.client.post(url).json(&query.count_body()))
            .await?;
        let parsed: CountResponse = serde_json::from_value(response)
            .map_err(|e| SearchError::Parse(format!("unexpected count response: {e}")))?;
        Ok(parsed.count)
    }

    async fn index_metadata(&self, index: &str) -> Result<IndexMetadata, SearchError> {
        let url = self.endpoint(index, "_mapping")?;
        let response = self.send(self.client.get(url)).await?;
        parse_mapping_response(&response)
    }
}
