//! End-to-end tests for `run_pipeline_with`
//!
//! A local HTTP server plays the vendor: it serves a zip built in the test and
//! the SHA-256 checksum of that zip. Every run uses its own output directory
//! and scratch parent so cleanup can be asserted.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use geo_denylist::initialization::init_client;
use geo_denylist::{run_pipeline_with, BlockedSet, Config, Endpoints, PipelineError, Stage};
use httptest::{matchers::*, responders::*, Expectation, Server};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const LOCATIONS: &str = "\
geoname_id,locale_code,continent_code,continent_name,country_iso_code,country_name,is_in_european_union
1,en,NA,\"North America\",US,\"United States\",0
2,en,EU,Europe,DE,Germany,1
";

const BLOCKS: &str = "\
network,geoname_id,registered_country_geoname_id,represented_country_geoname_id,is_anonymous_proxy,is_satellite_provider,is_anycast
1.2.3.0/24,1,0,0,0,0,
5.6.7.0/24,2,0,0,0,0,
";

const LOCATIONS_MEMBER: &str = "GeoLite2-Country-CSV_20240102/GeoLite2-Country-Locations-en.csv";
const BLOCKS_MEMBER: &str = "GeoLite2-Country-CSV_20240102/GeoLite2-Country-Blocks-IPv4.csv";

/// Builds an in-memory zip with the given members.
fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip member");
        writer
            .write_all(content.as_bytes())
            .expect("Failed to write zip member");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

fn standard_zip() -> Vec<u8> {
    build_zip(&[(LOCATIONS_MEMBER, LOCATIONS), (BLOCKS_MEMBER, BLOCKS)])
}

/// Checksum payload in the vendor's `<hex>  <filename>` format.
fn checksum_for(bytes: &[u8]) -> String {
    format!(
        "{}  GeoLite2-Country-CSV_20240102.zip\n",
        hex::encode(Sha256::digest(bytes))
    )
}

/// Serves `archive` and `checksum` at the paths used by `endpoints_for`.
fn vendor_server(archive: Vec<u8>, checksum: String) -> Server {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/db.zip"))
            .times(..)
            .respond_with(status_code(200).body(archive)),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/db.zip.sha256"))
            .times(..)
            .respond_with(status_code(200).body(checksum)),
    );
    server
}

fn endpoints_for(server: &Server) -> Endpoints {
    Endpoints {
        archive_url: server.url_str("/db.zip"),
        checksum_url: server.url_str("/db.zip.sha256"),
    }
}

struct TestDirs {
    output: TempDir,
    scratch: TempDir,
}

impl TestDirs {
    fn new() -> Self {
        TestDirs {
            output: TempDir::new().expect("Failed to create output directory"),
            scratch: TempDir::new().expect("Failed to create scratch parent"),
        }
    }

    fn config(&self, countries: &[&str]) -> Config {
        Config {
            account_id: "12345".to_string(),
            license_key: "license".to_string(),
            blocked_countries: BlockedSet::from_codes(countries),
            output_filename: "blocked.txt".to_string(),
            output_dir: self.output.path().to_path_buf(),
            scratch_parent: Some(self.scratch.path().to_path_buf()),
            ..Default::default()
        }
    }

    fn output_file(&self) -> PathBuf {
        self.output.path().join("blocked.txt")
    }

    fn assert_scratch_removed(&self) {
        let leftovers: Vec<_> = fs::read_dir(self.scratch.path())
            .expect("scratch parent readable")
            .collect();
        assert!(
            leftovers.is_empty(),
            "scratch directory was not removed: {leftovers:?}"
        );
    }
}

async fn run(dirs: &TestDirs, server: &Server, countries: &[&str]) -> Result<PathBuf, PipelineError> {
    let client = init_client().expect("Failed to build HTTP client");
    run_pipeline_with(&dirs.config(countries), &endpoints_for(server), &client)
        .await
        .map(|report| report.output_path)
}

fn data_lines(path: &Path) -> Vec<String> {
    let content = fs::read_to_string(path).expect("output readable");
    let mut lines = content.lines();
    let header = lines.next().expect("header line present");
    assert!(header.starts_with("# list generated "), "bad header: {header}");
    lines.map(str::to_string).collect()
}

#[tokio::test]
async fn test_pipeline_writes_blocked_networks() {
    let archive = standard_zip();
    let server = vendor_server(archive.clone(), checksum_for(&archive));
    let dirs = TestDirs::new();

    let client = init_client().expect("Failed to build HTTP client");
    let report = run_pipeline_with(&dirs.config(&["US"]), &endpoints_for(&server), &client)
        .await
        .expect("pipeline succeeds");

    assert_eq!(report.output_path, dirs.output_file());
    assert_eq!(report.blocked_geonames, 1);
    assert_eq!(report.rows_scanned, 2);
    assert_eq!(report.lines_emitted, 1);
    assert_eq!(report.archive_bytes, archive.len() as u64);
    assert_eq!(report.archive_sha256, hex::encode(Sha256::digest(&archive)));
    assert_eq!(data_lines(&report.output_path), vec!["1.2.3.0/24 ; US"]);
    dirs.assert_scratch_removed();
}

#[tokio::test]
async fn test_pipeline_lowercase_country_filter() {
    let archive = standard_zip();
    let server = vendor_server(archive.clone(), checksum_for(&archive));
    let dirs = TestDirs::new();

    let path = run(&dirs, &server, &["de"]).await.expect("pipeline succeeds");
    assert_eq!(data_lines(&path), vec!["5.6.7.0/24 ; DE"]);
}

#[tokio::test]
async fn test_pipeline_replaces_previous_output() {
    let archive = standard_zip();
    let server = vendor_server(archive.clone(), checksum_for(&archive));
    let dirs = TestDirs::new();
    fs::write(dirs.output_file(), "stale list\n").unwrap();

    run(&dirs, &server, &["US", "DE"]).await.expect("pipeline succeeds");
    assert_eq!(
        data_lines(&dirs.output_file()),
        vec!["1.2.3.0/24 ; US", "5.6.7.0/24 ; DE"]
    );
}

#[tokio::test]
async fn test_pipeline_checksum_mismatch_leaves_output_untouched() {
    let archive = standard_zip();
    let mut tampered = archive.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    let server = vendor_server(tampered, checksum_for(&archive));
    let dirs = TestDirs::new();
    fs::write(dirs.output_file(), "previous list\n").unwrap();

    let err = run(&dirs, &server, &["US"]).await.unwrap_err();
    assert!(matches!(err, PipelineError::ChecksumMismatchError { .. }));
    assert_eq!(err.stage(), Stage::Verify);
    assert_eq!(
        fs::read_to_string(dirs.output_file()).unwrap(),
        "previous list\n"
    );
    dirs.assert_scratch_removed();
}

#[tokio::test]
async fn test_pipeline_malformed_checksum_payload() {
    let archive = standard_zip();
    let server = vendor_server(archive, "not-a-digest\n".to_string());
    let dirs = TestDirs::new();

    let err = run(&dirs, &server, &["US"]).await.unwrap_err();
    assert!(matches!(err, PipelineError::IntegrityFormatError(_)));
    assert!(!dirs.output_file().exists());
}

#[tokio::test]
async fn test_pipeline_rejected_credentials() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/db.zip"))
            .respond_with(status_code(401)),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/db.zip.sha256"))
            .times(..)
            .respond_with(status_code(401)),
    );
    let dirs = TestDirs::new();

    let err = run(&dirs, &server, &["US"]).await.unwrap_err();
    assert!(matches!(err, PipelineError::RemoteFetchError { .. }));
    assert_eq!(err.stage(), Stage::Fetch);
    assert!(!dirs.output_file().exists());
    dirs.assert_scratch_removed();
}

#[tokio::test]
async fn test_pipeline_missing_blocks_member() {
    let archive = build_zip(&[(LOCATIONS_MEMBER, LOCATIONS)]);
    let server = vendor_server(archive.clone(), checksum_for(&archive));
    let dirs = TestDirs::new();

    let err = run(&dirs, &server, &["US"]).await.unwrap_err();
    match err {
        PipelineError::MissingMemberError { ref missing } => {
            assert_eq!(missing, &vec!["GeoLite2-Country-Blocks-IPv4.csv".to_string()]);
        }
        other => panic!("expected MissingMemberError, got {other:?}"),
    }
    assert!(!dirs.output_file().exists());
    dirs.assert_scratch_removed();
}

#[tokio::test]
async fn test_pipeline_blocks_schema_error_keeps_previous_output() {
    let blocks = "network,geoname_id,registered_country_geoname_id\n1.2.3.0/24,1,0\n";
    let archive = build_zip(&[(LOCATIONS_MEMBER, LOCATIONS), (BLOCKS_MEMBER, blocks)]);
    let server = vendor_server(archive.clone(), checksum_for(&archive));
    let dirs = TestDirs::new();
    fs::write(dirs.output_file(), "previous list\n").unwrap();

    let err = run(&dirs, &server, &["US"]).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::SchemaError { ref column, .. } if column == "represented_country_geoname_id"
    ));
    assert_eq!(err.stage(), Stage::Blocks);
    assert_eq!(
        fs::read_to_string(dirs.output_file()).unwrap(),
        "previous list\n"
    );
    dirs.assert_scratch_removed();
}

#[tokio::test]
async fn test_pipeline_rejects_invalid_config_before_any_request() {
    // No expectations: any request would fail the test when the server drops
    let server = Server::run();
    let dirs = TestDirs::new();

    let err = run(&dirs, &server, &[]).await.unwrap_err();
    assert!(matches!(err, PipelineError::ConfigValidationError(_)));
    assert_eq!(err.stage(), Stage::Config);
    dirs.assert_scratch_removed();
}

#[tokio::test]
async fn test_pipeline_output_named_like_scratch_files() {
    let archive = standard_zip();
    let server = vendor_server(archive.clone(), checksum_for(&archive));
    let client = init_client().expect("Failed to build HTTP client");

    for name in [
        "GeoLite2-Country-Blocks-IPv4.csv",
        "GeoLite2-Country-Locations-en.csv",
        "db.zip",
        "db.zip.tmp",
    ] {
        let dirs = TestDirs::new();
        let config = Config {
            output_filename: name.to_string(),
            ..dirs.config(&["US"])
        };

        let report = run_pipeline_with(&config, &endpoints_for(&server), &client)
            .await
            .unwrap_or_else(|e| panic!("pipeline failed for output name {name}: {e}"));

        assert_eq!(report.output_path, dirs.output.path().join(name));
        assert_eq!(report.lines_emitted, 1, "output name {name}");
        assert_eq!(data_lines(&report.output_path), vec!["1.2.3.0/24 ; US"]);
        dirs.assert_scratch_removed();
    }
}
