//! In-memory [`SearchBackend`] double for unit tests.
//!
//! Evaluates [`VariantQuery`] filters, sort order and search-after cursors
//! over JSON documents, caps every page at a configurable result window,
//! and records each call so tests can assert on round trips.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};

use crate::backend::{Hit, SearchBackend};
use crate::error::SearchError;
use crate::query::{Clause, VariantQuery};
use crate::types::IndexMetadata;

/// One recorded search request.
#[derive(Debug, Clone)]
pub(crate) struct RecordedSearch {
    pub index: String,
    pub size: usize,
    pub search_after: Option<Vec<Value>>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    docs: HashMap<String, Vec<Value>>,
    release_dates: HashMap<String, String>,
    page_cap: Option<usize>,
    delay: Option<Duration>,
    fail_search_call: Option<usize>,
    fail_metadata_index: Mutex<Option<String>>,
    searches: Mutex<Vec<RecordedSearch>>,
    search_calls: AtomicUsize,
    count_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docs(mut self, index: &str, docs: Vec<Value>) -> Self {
        self.docs.entry(index.to_string()).or_default().extend(docs);
        self
    }

    pub fn with_release_date(mut self, index: &str, date: &str) -> Self {
        self.release_dates
            .insert(index.to_string(), date.to_string());
        self
    }

    /// Cap every page at `cap` hits regardless of the requested size.
    pub fn with_page_cap(mut self, cap: usize) -> Self {
        self.page_cap = Some(cap);
        self
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail the `n`th search call (1-based).
    pub fn failing_search_call(mut self, n: usize) -> Self {
        self.fail_search_call = Some(n);
        self
    }

    pub fn failing_metadata_for(self, index: &str) -> Self {
        self.fail_metadata_for(index);
        self
    }

    /// Start failing metadata requests for `index` from now on.
    pub fn fail_metadata_for(&self, index: &str) {
        if let Ok(mut failing) = self.fail_metadata_index.lock() {
            *failing = Some(index.to_string());
        }
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn searches(&self) -> Vec<RecordedSearch> {
        self.searches
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn matching<'a>(&'a self, index: &str, query: &VariantQuery) -> Vec<&'a Value> {
        self.docs
            .get(index)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| query.filter.iter().all(|c| clause_matches(c, doc)))
                    .filter(|doc| {
                        query.any_of.is_empty() || query.any_of.iter().any(|c| clause_matches(c, doc))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, key| value.get(key))
}

fn clause_matches(clause: &Clause, doc: &Value) -> bool {
    match clause {
        Clause::Term { field: name, value } => field(doc, name) == Some(value),
        Clause::Range {
            field: name,
            gte,
            lte,
        } => field(doc, name)
            .and_then(Value::as_u64)
            .is_some_and(|v| *gte <= v && v <= *lte),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn compare_keys(a: &[Value], b: &[Value]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_values(x, y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn project(doc: &Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return doc.clone();
    }
    let mut out = serde_json::Map::new();
    for name in fields {
        if let Some(value) = doc.get(name) {
            out.insert(name.clone(), value.clone());
        }
    }
    Value::Object(out)
}

impl SearchBackend for FakeBackend {
    async fn search(
        &self,
        index: &str,
        query: &VariantQuery,
        size: usize,
        search_after: Option<&[Value]>,
    ) -> Result<Vec<Hit>, SearchError> {
        let call = self.search_calls.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        if let Ok(mut searches) = self.searches.lock() {
            searches.push(RecordedSearch {
                index: index.to_string(),
                size,
                search_after: search_after.map(<[Value]>::to_vec),
            });
        }
        self.pause().await;
        if self.fail_search_call == Some(call) {
            return Err(SearchError::Timeout(format!("search call {call} timed out")));
        }

        let mut keyed: Vec<(Vec<Value>, &Value)> = self
            .matching(index, query)
            .into_iter()
            .map(|doc| {
                let key = query
                    .sort
                    .iter()
                    .map(|f| field(doc, f).cloned().unwrap_or(Value::Null))
                    .collect();
                (key, doc)
            })
            .collect();
        keyed.sort_by(|a, b| compare_keys(&a.0, &b.0));

        let limit = self.page_cap.map_or(size, |cap| cap.min(size));
        Ok(keyed
            .into_iter()
            .filter(|(key, _)| {
                search_after.is_none_or(|after| compare_keys(key, after) == Ordering::Greater)
            })
            .take(limit)
            .map(|(sort, doc)| Hit {
                source: project(doc, &query.source),
                sort,
            })
            .collect())
    }

    async fn count(&self, index: &str, query: &VariantQuery) -> Result<u64, SearchError> {
        self.count_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.pause().await;
        Ok(self.matching(index, query).len() as u64)
    }

    async fn index_metadata(&self, index: &str) -> Result<IndexMetadata, SearchError> {
        self.metadata_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.pause().await;
        let failing = self
            .fail_metadata_index
            .lock()
            .map(|f| f.as_deref() == Some(index))
            .unwrap_or(false);
        if failing {
            return Err(SearchError::Http(format!("{index} unreachable")));
        }
        self.release_dates
            .get(index)
            .map(|date| IndexMetadata {
                release_date: date.clone(),
            })
            .ok_or_else(|| SearchError::Parse(format!("{index} has no release date")))
    }
}

/// A minimal variant document at `pos` on `chrom`.
pub(crate) fn variant_doc(chrom: &str, pos: u64, alt: &str) -> Value {
    json!({
        "variant_id": format!("{chrom}-{pos}-A-{alt}"),
        "reference_genome": "GRCh38",
        "chrom": chrom,
        "pos": pos,
        "ref": "A",
        "alt": alt,
        "clinical_significance": "Uncertain significance",
        "gold_stars": 1,
        "in_gnomad": false,
        "review_status": "criteria provided, single submitter",
        "major_consequence": "missense_variant",
        "transcript_consequences": [
            {
                "gene_id": "ENSG00000169174",
                "transcript_id": "ENST00000302118",
                "major_consequence": "missense_variant"
            }
        ]
    })
}
