//! Structured variant queries and their Elasticsearch request bodies.
//!
//! A [`VariantQuery`] is a conjunction of term/range filters, an optional
//! disjunction of range clauses (one per merged region), an ascending sort
//! and a field projection. It renders to `_search` and `_count` bodies.

use serde_json::{json, Value};

use crate::types::{GenomicRegion, ReferenceGenome};

/// Fields returned for every variant summary query.
pub const SUMMARY_FIELDS: &[&str] = &[
    "alt",
    "chrom",
    "clinical_significance",
    "clinvar_variation_id",
    "gnomad",
    "gold_stars",
    "in_gnomad",
    "major_consequence",
    "pos",
    "ref",
    "reference_genome",
    "review_status",
    "transcript_consequences",
    "variant_id",
];

/// Primary sort field for variant queries.
pub const POSITION_FIELD: &str = "pos";

/// Unique per-document sort field appended after the primary key.
pub const TIEBREAKER_FIELD: &str = "variant_id";

/// A single filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact match on a keyword field.
    Term { field: String, value: Value },
    /// Inclusive range on a numeric field.
    Range { field: String, gte: u64, lte: u64 },
}

impl Clause {
    pub fn term(field: &str, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn range(field: &str, gte: u64, lte: u64) -> Self {
        Self::Range {
            field: field.to_string(),
            gte,
            lte,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Self::Range { field, gte, lte } => {
                json!({ "range": { field.as_str(): { "gte": gte, "lte": lte } } })
            }
        }
    }
}

/// A boolean variant query with ascending sort and field projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantQuery {
    pub filter: Vec<Clause>,
    pub any_of: Vec<Clause>,
    pub sort: Vec<String>,
    pub source: Vec<String>,
}

impl VariantQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause every document must match.
    pub fn filter(mut self, clause: Clause) -> Self {
        self.filter.push(clause);
        self
    }

    /// Add a clause of which at least one must match.
    pub fn any_of(mut self, clause: Clause) -> Self {
        self.any_of.push(clause);
        self
    }

    /// Append an ascending sort key.
    pub fn sort_by(mut self, field: &str) -> Self {
        self.sort.push(field.to_string());
        self
    }

    /// Restrict the returned `_source` to `fields`.
    pub fn project(mut self, fields: &[&str]) -> Self {
        self.source = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    /// Ensure the sort ends in the unique tiebreaker so a search-after
    /// cursor never lands between two documents with equal sort values.
    pub fn with_tiebreaker(mut self) -> Self {
        if self.sort.last().map(String::as_str) != Some(TIEBREAKER_FIELD) {
            self.sort.retain(|f| f != TIEBREAKER_FIELD);
            self.sort.push(TIEBREAKER_FIELD.to_string());
        }
        self
    }

    /// The `query` object shared by search and count requests.
    pub fn query_json(&self) -> Value {
        let mut bool_query = serde_json::Map::new();
        bool_query.insert(
            "filter".into(),
            Value::Array(self.filter.iter().map(Clause::to_json).collect()),
        );
        if !self.any_of.is_empty() {
            bool_query.insert(
                "should".into(),
                Value::Array(self.any_of.iter().map(Clause::to_json).collect()),
            );
            bool_query.insert("minimum_should_match".into(), json!(1));
        }
        json!({ "bool": bool_query })
    }

    /// Body for one `_search` page.
    pub fn search_body(&self, size: usize, search_after: Option<&[Value]>) -> Value {
        let sort: Vec<Value> = self
            .sort
            .iter()
            .map(|field| json!({ field.as_str(): { "order": "asc" } }))
            .collect();
        let mut body = json!({
            "query": self.query_json(),
            "sort": sort,
            "size": size,
        });
        if !self.source.is_empty() {
            body["_source"] = json!(self.source);
        }
        if let Some(after) = search_after {
            body["search_after"] = Value::Array(after.to_vec());
        }
        body
    }

    /// Body for a `_count` request over the same filter.
    pub fn count_body(&self) -> Value {
        json!({ "query": self.query_json() })
    }
}

/// Variants whose position lies inside `region`.
pub fn region_query(region: &GenomicRegion) -> VariantQuery {
    VariantQuery::new()
        .filter(Clause::term("chrom", region.chrom.as_str()))
        .filter(Clause::range(POSITION_FIELD, region.start, region.stop))
        .sort_by(POSITION_FIELD)
        .project(SUMMARY_FIELDS)
}

/// Variants on `chrom` inside any of the merged `regions`.
pub fn regions_query(chrom: &str, regions: &[GenomicRegion]) -> VariantQuery {
    regions
        .iter()
        .fold(
            VariantQuery::new().filter(Clause::term("chrom", chrom)),
            |query, r| query.any_of(Clause::range(POSITION_FIELD, r.start, r.stop)),
        )
        .sort_by(POSITION_FIELD)
        .project(SUMMARY_FIELDS)
}

/// A single variant by identifier, full document.
pub fn variant_id_query(variant_id: &str) -> VariantQuery {
    VariantQuery::new().filter(Clause::term(TIEBREAKER_FIELD, variant_id))
}

/// Liftover documents whose `side` (`source` or `liftover`) matches.
pub fn liftover_query(side: &str, variant_id: &str, genome: ReferenceGenome) -> VariantQuery {
    VariantQuery::new()
        .filter(Clause::term(&format!("{side}.variant_id"), variant_id))
        .filter(Clause::term(&format!("{side}.reference_genome"), genome.name()))
}
