//! Exhaustive retrieval of result sets larger than one backend page.
//!
//! The backend caps every response at its result window. [`fetch_all_hits`]
//! walks the full result set with a search-after cursor: each request asks
//! for the hits sorting strictly after the last hit of the previous page,
//! until a short page signals exhaustion.

use crate::backend::{Hit, SearchBackend};
use crate::error::SearchError;
use crate::query::VariantQuery;

/// Fetch every hit matching `query` from `index`, in sort order.
///
/// The query's sort is extended with the unique tiebreaker field, so the
/// cursor advances deterministically and no hit is skipped or repeated at
/// a page boundary. Pages are requested strictly one after another.
///
/// # Errors
///
/// Any failed page fails the whole fetch; hits from earlier pages are
/// discarded rather than returned as a partial result. A full page whose
/// last hit carries no sort values is a [`SearchError::Parse`] because the
/// cursor cannot advance.
pub async fn fetch_all_hits<B: SearchBackend>(
    backend: &B,
    index: &str,
    query: &VariantQuery,
    page_size: usize,
) -> Result<Vec<Hit>, SearchError> {
    if page_size == 0 {
        return Err(SearchError::Config(
            "page_size must be greater than 0".into(),
        ));
    }
    let query = query.clone().with_tiebreaker();

    let mut all_hits: Vec<Hit> = Vec::new();
    let mut cursor: Option<Vec<serde_json::Value>> = None;
    let mut pages = 0usize;

    loop {
        let page = backend
            .search(index, &query, page_size, cursor.as_deref())
            .await?;
        pages += 1;
        let page_len = page.len();
        tracing::trace!(index, page = pages, hits = page_len, "fetched result page");

        if page_len < page_size {
            all_hits.extend(page);
            break;
        }

        let next_cursor = page
            .last()
            .map(|hit| hit.sort.clone())
            .filter(|sort| !sort.is_empty())
            .ok_or_else(|| {
                SearchError::Parse(format!(
                    "page {pages} of {index} has no sort values to continue from"
                ))
            })?;
        all_hits.extend(page);
        cursor = Some(next_cursor);
    }

    tracing::debug!(index, pages, hits = all_hits.len(), "exhaustive fetch complete");
    Ok(all_hits)
}
