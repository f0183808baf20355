//! CLI binary for varscope.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use varscope::{Command, VarscopeConfig};
use varscope_search::ReferenceGenome;

/// varscope: region-aware ClinVar variant search.
#[derive(Parser)]
#[command(name = "varscope", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset identifier; overrides `[dataset] dataset_id`.
    #[arg(long)]
    dataset: Option<String>,

    /// Genome build (GRCh37 or GRCh38); overrides `[dataset] reference_genome`.
    #[arg(long)]
    reference_genome: Option<ReferenceGenome>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("varscope=info,varscope_search=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = VarscopeConfig::load(cli.config.as_deref())?;

    let mut dataset = config.dataset();
    if let Some(dataset_id) = cli.dataset {
        dataset.dataset_id = dataset_id;
    }
    if let Some(genome) = cli.reference_genome {
        dataset.reference_genome = genome;
    }

    let search = varscope_search::connect(config.search_config())?;
    let output = varscope::commands::execute(&search, &dataset, &cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
