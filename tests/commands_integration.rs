//! Command integration tests.
//!
//! Loads a config file pointing at a wiremock backend and runs each CLI
//! command through [`varscope::commands::execute`].

use serde_json::json;
use varscope::commands::execute;
use varscope::{Command, VarscopeConfig, VarscopeError};
use varscope_search::{ReferenceGenome, SearchError};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRCH37: &str = "clinvar_grch37_variants";
const GRCH38: &str = "clinvar_grch38_variants";

fn write_config(dir: &tempfile::TempDir, server: &MockServer) -> VarscopeConfig {
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[search]\nbase_url = \"{}\"\npage_size = 100\n\n[dataset]\ndataset_id = \"clinvar_grch38\"\n",
            server.uri()
        ),
    )
    .expect("write config");
    VarscopeConfig::load(Some(&path)).expect("load config")
}

fn variant(pos: u64) -> serde_json::Value {
    json!({
        "variant_id": format!("17-{pos}-C-T"),
        "reference_genome": "GRCh38",
        "chrom": "17",
        "pos": pos,
        "ref": "C",
        "alt": "T",
        "clinical_significance": "Pathogenic",
        "gold_stars": 3,
        "in_gnomad": false,
        "transcript_consequences": [
            { "gene_id": "ENSG00000012048", "transcript_id": "ENST00000357654", "major_consequence": "stop_gained" }
        ]
    })
}

#[tokio::test]
async fn test_region_command_lists_summaries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{GRCH38}/_search")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": { "hits": [
                { "_source": variant(43_045_700), "sort": [43_045_700, "17-43045700-C-T"] },
                { "_source": variant(43_045_800), "sort": [43_045_800, "17-43045800-C-T"] }
            ] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, &mock_server);
    let search = varscope_search::connect(config.search_config()).expect("connect");
    let command = Command::Region {
        chrom: "17".into(),
        start: 43_044_295,
        stop: 43_125_483,
    };

    let output = execute(&search, &config.dataset(), &command).await.expect("execute");
    let variants = output.as_array().expect("array");
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0]["variant_id"], "17-43045700-C-T");
    assert_eq!(variants[0]["transcript_consequence"]["transcript_id"], "ENST00000357654");
    assert!(variants[0].get("transcript_consequences").is_none());
}

#[tokio::test]
async fn test_count_command_reports_region_and_count() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{GRCH38}/_count")))
        .and(body_partial_json(json!({
            "query": { "bool": { "filter": [ { "term": { "chrom": "17" } } ] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 1234 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, &mock_server);
    let search = varscope_search::connect(config.search_config()).expect("connect");
    let command = Command::Count {
        chrom: "chr17".into(),
        start: 1,
        stop: 1_000_000,
    };

    let output = execute(&search, &config.dataset(), &command).await.expect("execute");
    assert_eq!(output, json!({ "region": "17:1-1000000", "count": 1234 }));
}

#[tokio::test]
async fn test_variant_command_returns_null_when_missing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{GRCH38}/_search")))
        .and(body_partial_json(json!({ "size": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, &mock_server);
    let search = varscope_search::connect(config.search_config()).expect("connect");
    let command = Command::Variant {
        variant_id: "17-1-C-T".into(),
    };

    let output = execute(&search, &config.dataset(), &command).await.expect("execute");
    assert!(output.is_null());
}

#[tokio::test]
async fn test_release_date_command_reads_both_builds() {
    let mock_server = MockServer::start().await;
    for index in [GRCH37, GRCH38] {
        Mock::given(method("GET"))
            .and(path(format!("/{index}/_mapping")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                index: { "mappings": { "_meta": { "release_date": "2024-09-01" } } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, &mock_server);
    let search = varscope_search::connect(config.search_config()).expect("connect");

    let output = execute(&search, &config.dataset(), &Command::ReleaseDate)
        .await
        .expect("execute");
    assert_eq!(output, json!({ "release_date": "2024-09-01" }));
}

#[tokio::test]
async fn test_liftover_command_uses_dataset_build() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/liftover/_search"))
        .and(body_partial_json(json!({
            "query": { "bool": { "filter": [
                { "term": { "liftover.variant_id": "17-43045700-C-T" } },
                { "term": { "liftover.reference_genome": "GRCh38" } }
            ] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": { "hits": [ { "_source": {
                "source": { "variant_id": "17-41197717-C-T", "reference_genome": "GRCh37" },
                "liftover": { "variant_id": "17-43045700-C-T", "reference_genome": "GRCh38" }
            } } ] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, &mock_server);
    let search = varscope_search::connect(config.search_config()).expect("connect");
    let command = Command::Liftover {
        variant_id: "17-43045700-C-T".into(),
        target: true,
    };

    let output = execute(&search, &config.dataset(), &command).await.expect("execute");
    assert_eq!(output[0]["source"]["variant_id"], "17-41197717-C-T");
    assert_eq!(config.dataset().reference_genome, ReferenceGenome::GRCh38);
}

#[tokio::test]
async fn test_invalid_region_is_rejected_before_any_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(&dir, &mock_server);
    let search = varscope_search::connect(config.search_config()).expect("connect");
    let command = Command::Region {
        chrom: "17".into(),
        start: 500,
        stop: 100,
    };

    let err = execute(&search, &config.dataset(), &command).await.unwrap_err();
    assert!(matches!(err, VarscopeError::Search(SearchError::Config(_))));
}
