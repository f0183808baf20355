//! Core types for genomic regions, variant documents and liftover edges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Width of one chromosome slot on the genome-wide coordinate axis.
const XPOS_CHROM_STRIDE: u64 = 1_000_000_000;

/// Largest position that fits inside one chromosome slot.
pub const MAX_POSITION: u64 = XPOS_CHROM_STRIDE - 1;

/// Genome builds served by the variant indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceGenome {
    GRCh37,
    GRCh38,
}

impl ReferenceGenome {
    /// Returns the canonical name of this build.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GRCh37 => "GRCh37",
            Self::GRCh38 => "GRCh38",
        }
    }
}

impl fmt::Display for ReferenceGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceGenome {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grch37" => Ok(Self::GRCh37),
            "grch38" => Ok(Self::GRCh38),
            other => Err(SearchError::Config(format!(
                "unknown reference genome: {other}"
            ))),
        }
    }
}

fn strip_chr_prefix(chrom: &str) -> &str {
    chrom
        .strip_prefix("chr")
        .or_else(|| chrom.strip_prefix("CHR"))
        .unwrap_or(chrom)
}

/// Map a chromosome name to its slot on the genome-wide axis.
///
/// Accepts `1`..`22`, `X`, `Y`, `M` and `MT`, with or without a `chr` prefix.
pub fn chrom_number(chrom: &str) -> Option<u64> {
    match strip_chr_prefix(chrom).to_ascii_uppercase().as_str() {
        "X" => Some(23),
        "Y" => Some(24),
        "M" | "MT" => Some(25),
        numeric => match numeric.parse::<u64>() {
            Ok(n) if (1..=22).contains(&n) => Some(n),
            _ => None,
        },
    }
}

/// The chromosome name as stored in the variant indices: no `chr` prefix,
/// upper-case letters, numbers without leading zeros.
pub fn canonical_chrom(chrom: &str) -> Option<String> {
    let n = chrom_number(chrom)?;
    if n <= 22 {
        return Some(n.to_string());
    }
    Some(strip_chr_prefix(chrom).to_ascii_uppercase())
}

/// Fold a chromosome-local position into the genome-wide coordinate.
///
/// `None` for an unknown chromosome or a position beyond [`MAX_POSITION`].
pub fn xpos(chrom: &str, pos: u64) -> Option<u64> {
    if pos > MAX_POSITION {
        return None;
    }
    chrom_number(chrom).map(|n| n * XPOS_CHROM_STRIDE + pos)
}

/// A closed interval on one chromosome, carrying both local and
/// genome-wide coordinates.
///
/// `xstop - xstart == stop - start` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicRegion {
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
    pub xstart: u64,
    pub xstop: u64,
}

impl GenomicRegion {
    /// Build a region from chromosome-local 1-based coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an unknown chromosome, a zero
    /// start, `start > stop`, or `stop` beyond [`MAX_POSITION`].
    ///
    /// The chromosome is stored in canonical form, so `chr17` and `17`
    /// give the same region.
    pub fn new(chrom: &str, start: u64, stop: u64) -> Result<Self, SearchError> {
        if start == 0 || start > stop || stop > MAX_POSITION {
            return Err(SearchError::Config(format!(
                "invalid region {chrom}:{start}-{stop}"
            )));
        }
        let canonical = canonical_chrom(chrom)
            .ok_or_else(|| SearchError::Config(format!("unknown chromosome: {chrom}")))?;
        let xstart = xpos(&canonical, start)
            .ok_or_else(|| SearchError::Config(format!("unknown chromosome: {chrom}")))?;
        Ok(Self {
            chrom: canonical,
            start,
            stop,
            xstart,
            xstop: xstart + (stop - start),
        })
    }

    /// Number of positions covered by this region.
    pub fn width(&self) -> u64 {
        self.stop - self.start + 1
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.stop)
    }
}

/// One exon (or UTR/CDS segment) of a gene or transcript model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    /// `CDS`, `UTR` or `exon`.
    pub feature_type: String,
    pub start: u64,
    pub stop: u64,
    pub xstart: u64,
    pub xstop: u64,
}

impl Exon {
    pub fn is_cds(&self) -> bool {
        self.feature_type == "CDS"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub gene_id: String,
    pub chrom: String,
    pub exons: Vec<Exon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub transcript_id: String,
    pub gene_id: String,
    pub chrom: String,
    pub exons: Vec<Exon>,
}

/// One VEP annotation of a variant against a single transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptConsequence {
    pub gene_id: String,
    #[serde(default)]
    pub gene_symbol: Option<String>,
    pub transcript_id: String,
    #[serde(default)]
    pub major_consequence: Option<String>,
    #[serde(default)]
    pub consequence_terms: Vec<String>,
    #[serde(default)]
    pub hgvsc: Option<String>,
    #[serde(default)]
    pub hgvsp: Option<String>,
    #[serde(default)]
    pub is_canonical: Option<bool>,
    /// Remaining annotation fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A variant document as stored in the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub variant_id: String,
    pub reference_genome: ReferenceGenome,
    pub chrom: String,
    pub pos: u64,
    #[serde(rename = "ref")]
    pub reference: String,
    pub alt: String,
    #[serde(default)]
    pub clinical_significance: Option<String>,
    #[serde(default)]
    pub clinvar_variation_id: Option<String>,
    #[serde(default)]
    pub gnomad: Option<serde_json::Value>,
    #[serde(default)]
    pub gold_stars: Option<u8>,
    #[serde(default)]
    pub in_gnomad: bool,
    #[serde(default)]
    pub major_consequence: Option<String>,
    #[serde(default)]
    pub review_status: Option<String>,
    #[serde(default)]
    pub transcript_consequences: Option<Vec<TranscriptConsequence>>,
}

/// A cache-safe projection of a [`VariantRecord`].
///
/// Holds at most one consequence, never the full list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub variant_id: String,
    pub reference_genome: ReferenceGenome,
    pub chrom: String,
    pub pos: u64,
    #[serde(rename = "ref")]
    pub reference: String,
    pub alt: String,
    pub clinical_significance: Option<String>,
    pub clinvar_variation_id: Option<String>,
    pub gnomad: Option<serde_json::Value>,
    pub gold_stars: Option<u8>,
    pub in_gnomad: bool,
    pub major_consequence: Option<String>,
    pub review_status: Option<String>,
    pub transcript_consequence: Option<TranscriptConsequence>,
}

/// The entity a variant query is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryContext {
    Gene(String),
    Region,
    Transcript(String),
}

impl QueryContext {
    /// Tag used in cache keys and log fields.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Gene(_) => "gene",
            Self::Region => "region",
            Self::Transcript(_) => "transcript",
        }
    }

    /// Cache key for results fetched in this context, or `None` when
    /// results in this context are not cached.
    pub fn cache_key(&self, dataset_scope: &str) -> Option<String> {
        match self {
            Self::Gene(gene_id) => {
                Some(crate::cache::cache_key(dataset_scope, self.tag(), gene_id))
            }
            Self::Transcript(transcript_id) => {
                Some(crate::cache::cache_key(dataset_scope, self.tag(), transcript_id))
            }
            Self::Region => None,
        }
    }
}

/// One side of a liftover correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftoverVariant {
    pub variant_id: String,
    pub reference_genome: ReferenceGenome,
}

/// A directed edge between a variant in one build and its counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftoverCorrespondence {
    pub source: LiftoverVariant,
    pub liftover: LiftoverVariant,
}

/// Metadata published on each variant index mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub release_date: String,
}

/// Whether `id` has the `CHROM-POS-REF-ALT` shape of a variant identifier.
pub fn is_variant_id(id: &str) -> bool {
    let parts: Vec<&str> = id.split('-').collect();
    let [chrom, pos, reference, alt] = parts.as_slice() else {
        return false;
    };
    let is_bases = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T'))
    };
    chrom_number(chrom).is_some()
        && !pos.starts_with('0')
        && pos.parse::<u64>().is_ok_and(|p| p > 0)
        && is_bases(reference)
        && is_bases(alt)
}
