//! Projection of full variant records into cache-safe summaries.
//!
//! A [`VariantRecord`] may carry hundreds of transcript consequences. The
//! summary drops that list and keeps a single representative consequence
//! chosen by the query context, which keeps cached payloads small.

use crate::types::{QueryContext, TranscriptConsequence, VariantRecord, VariantSummary};

/// VEP consequence terms, most severe first.
pub const CONSEQUENCE_TERMS: &[&str] = &[
    "transcript_ablation",
    "splice_acceptor_variant",
    "splice_donor_variant",
    "stop_gained",
    "frameshift_variant",
    "stop_lost",
    "start_lost",
    "initiator_codon_variant",
    "transcript_amplification",
    "inframe_insertion",
    "inframe_deletion",
    "missense_variant",
    "protein_altering_variant",
    "splice_donor_5th_base_variant",
    "splice_region_variant",
    "splice_donor_region_variant",
    "splice_polypyrimidine_tract_variant",
    "incomplete_terminal_codon_variant",
    "start_retained_variant",
    "stop_retained_variant",
    "synonymous_variant",
    "coding_sequence_variant",
    "mature_miRNA_variant",
    "5_prime_UTR_variant",
    "3_prime_UTR_variant",
    "non_coding_transcript_exon_variant",
    "non_coding_exon_variant",
    "intron_variant",
    "NMD_transcript_variant",
    "non_coding_transcript_variant",
    "nc_transcript_variant",
    "upstream_gene_variant",
    "downstream_gene_variant",
    "TFBS_ablation",
    "TFBS_amplification",
    "TF_binding_site_variant",
    "regulatory_region_ablation",
    "regulatory_region_amplification",
    "feature_elongation",
    "regulatory_region_variant",
    "feature_truncation",
    "intergenic_variant",
];

/// Rank of a consequence term; lower is more severe. Unknown terms rank
/// after every known term.
pub fn term_rank(term: &str) -> usize {
    CONSEQUENCE_TERMS
        .iter()
        .position(|t| *t == term)
        .unwrap_or(CONSEQUENCE_TERMS.len())
}

/// Severity rank of one transcript consequence.
///
/// Uses `major_consequence` when present, otherwise the most severe of
/// its `consequence_terms`.
pub fn consequence_rank(csq: &TranscriptConsequence) -> usize {
    match &csq.major_consequence {
        Some(major) => term_rank(major),
        None => csq
            .consequence_terms
            .iter()
            .map(|t| term_rank(t))
            .min()
            .unwrap_or(CONSEQUENCE_TERMS.len()),
    }
}

/// The most severe consequence among `candidates`; the first one wins ties.
fn most_severe<'a, I>(candidates: I) -> Option<&'a TranscriptConsequence>
where
    I: IntoIterator<Item = &'a TranscriptConsequence>,
{
    // min_by_key returns the first of several equal minima.
    candidates.into_iter().min_by_key(|csq| consequence_rank(csq))
}

/// Select the representative consequence for `context`.
pub fn representative_consequence<'a>(
    consequences: &'a [TranscriptConsequence],
    context: &QueryContext,
) -> Option<&'a TranscriptConsequence> {
    match context {
        QueryContext::Gene(gene_id) => {
            most_severe(consequences.iter().filter(|c| &c.gene_id == gene_id))
        }
        QueryContext::Transcript(transcript_id) => consequences
            .iter()
            .find(|c| &c.transcript_id == transcript_id),
        QueryContext::Region => most_severe(consequences),
    }
}

/// Shape a full record into a summary for `context`.
///
/// The full consequence list is always dropped.
pub fn shape(record: VariantRecord, context: &QueryContext) -> VariantSummary {
    let VariantRecord {
        variant_id,
        reference_genome,
        chrom,
        pos,
        reference,
        alt,
        clinical_significance,
        clinvar_variation_id,
        gnomad,
        gold_stars,
        in_gnomad,
        major_consequence,
        review_status,
        transcript_consequences,
    } = record;

    let transcript_consequence = transcript_consequences
        .as_deref()
        .and_then(|list| representative_consequence(list, context))
        .cloned();

    VariantSummary {
        variant_id,
        reference_genome,
        chrom,
        pos,
        reference,
        alt,
        clinical_significance,
        clinvar_variation_id,
        gnomad,
        gold_stars,
        in_gnomad,
        major_consequence,
        review_status,
        transcript_consequence,
    }
}
