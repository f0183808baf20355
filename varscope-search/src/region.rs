//! Padding and merging of genomic intervals into a minimal query plan.
//!
//! Entity-scoped queries turn a gene or transcript's exons into one range
//! clause per merged region. Exons are padded first so that variants just
//! outside an exon boundary are still returned, then overlapping intervals
//! are collapsed on the genome-wide axis.

use crate::types::{Exon, GenomicRegion, MAX_POSITION};

/// Widen `region` by `padding` bases on each side.
///
/// The local start is clamped at 1 and the stop at [`MAX_POSITION`], so a
/// padded region never leaves its chromosome slot. Genome-wide coordinates
/// move by the same amounts and keep the same width.
pub fn pad(region: &GenomicRegion, padding: u64) -> GenomicRegion {
    let left = padding.min(region.start.saturating_sub(1));
    let start = region.start - left;
    let stop = region
        .stop
        .saturating_add(padding)
        .min(MAX_POSITION)
        .max(start);
    let xstart = region.xstart - left;
    GenomicRegion {
        chrom: region.chrom.clone(),
        start,
        stop,
        xstart,
        xstop: xstart + (stop - start),
    }
}

/// Merge overlapping regions into the minimal covering set.
///
/// The output is sorted by `xstart`, contains no two overlapping entries,
/// and covers exactly the positions covered by the input. Merging an
/// already merged set returns it unchanged.
pub fn merge_overlapping_regions(regions: &[GenomicRegion]) -> Vec<GenomicRegion> {
    let mut sorted: Vec<&GenomicRegion> = regions.iter().collect();
    sorted.sort_by_key(|r| r.xstart);

    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current = first.clone();

    for next in iter {
        if next.xstart <= current.xstop {
            if next.xstop > current.xstop {
                current.xstop = next.xstop;
                current.stop = next.stop;
            }
        } else {
            merged.push(current);
            current = next.clone();
        }
    }
    merged.push(current);
    merged
}

/// Build the padded, merged query regions for an entity's exons.
///
/// Coding exons are used when the entity has any; otherwise every exon
/// (UTRs included) contributes.
pub fn entity_regions(chrom: &str, exons: &[Exon], padding: u64) -> Vec<GenomicRegion> {
    let has_cds = exons.iter().any(Exon::is_cds);
    let padded: Vec<GenomicRegion> = exons
        .iter()
        .filter(|exon| !has_cds || exon.is_cds())
        .map(|exon| {
            pad(
                &GenomicRegion {
                    chrom: chrom.to_string(),
                    start: exon.start,
                    stop: exon.stop,
                    xstart: exon.xstart,
                    xstop: exon.xstop,
                },
                padding,
            )
        })
        .collect();
    merge_overlapping_regions(&padded)
}
