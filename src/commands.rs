//! CLI commands and their JSON output.

use clap::Subcommand;
use serde_json::{json, Value};
use varscope_search::{Dataset, GenomicRegion, SearchBackend, VariantSearch};

use crate::error::Result;

/// Available commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List every variant inside a region.
    Region {
        /// Chromosome (1-22, X, Y, MT; `chr` prefix accepted).
        chrom: String,
        /// First position, 1-based.
        start: u64,
        /// Last position, inclusive.
        stop: u64,
    },

    /// Count the variants inside a region.
    Count {
        chrom: String,
        start: u64,
        stop: u64,
    },

    /// Show the full record of one variant.
    Variant {
        /// Identifier in `CHROM-POS-REF-ALT` form.
        variant_id: String,
    },

    /// Find the variant's counterparts in the other genome build.
    Liftover {
        variant_id: String,
        /// Match on the lifted-over side instead of the source side.
        #[arg(long)]
        target: bool,
    },

    /// Show the release date of the variant indices.
    ReleaseDate,
}

/// Run `command` against `search` and render the result as JSON.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the search fails.
pub async fn execute<B>(
    search: &VariantSearch<B>,
    dataset: &Dataset,
    command: &Command,
) -> Result<Value>
where
    B: SearchBackend + 'static,
{
    let output = match command {
        Command::Region { chrom, start, stop } => {
            let region = GenomicRegion::new(chrom, *start, *stop)?;
            let variants = search.fetch_variants_by_region(dataset, &region).await?;
            tracing::info!(region = %region, variants = variants.len(), "region query complete");
            serde_json::to_value(&variants)?
        }
        Command::Count { chrom, start, stop } => {
            let region = GenomicRegion::new(chrom, *start, *stop)?;
            let count = search.count_variants_in_region(dataset, &region).await?;
            json!({ "region": region.to_string(), "count": count })
        }
        Command::Variant { variant_id } => {
            let record = search.fetch_variant_by_id(dataset, variant_id).await?;
            if record.is_none() {
                tracing::info!(variant_id = %variant_id, "variant not found");
            }
            serde_json::to_value(&record)?
        }
        Command::Liftover { variant_id, target } => {
            let resolver = search.liftover();
            let genome = dataset.reference_genome;
            let found = if *target {
                resolver.resolve_by_target(variant_id, genome).await?
            } else {
                resolver.resolve_by_source(variant_id, genome).await?
            };
            serde_json::to_value(&found)?
        }
        Command::ReleaseDate => json!({ "release_date": search.release_date().await? }),
    };
    Ok(output)
}
