//! Test configuration helpers: temporary data directories and mock archives

use nhanes_dl::{Config, CycleConfig, DatasetConfig};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Cycle used throughout the integration tests
pub const CYCLE: &str = "2017-2018";

/// Config rooted in `temp` with a single cycle of `datasets`
///
/// `datasets` pairs a dataset name with a filename served by `server`.
pub fn test_config(temp: &TempDir, server: &MockServer, datasets: &[(&str, &str)]) -> Config {
    let mut config = Config {
        data_dir: temp.path().join("raw"),
        cycles: vec![cycle(server, CYCLE, datasets)],
        ..Default::default()
    };
    config.fetch.timeout = Duration::from_secs(5);
    config
}

/// A cycle whose datasets are served from `/{id}/{file}` on `server`
pub fn cycle(server: &MockServer, id: &str, datasets: &[(&str, &str)]) -> CycleConfig {
    CycleConfig {
        id: id.to_string(),
        datasets: datasets
            .iter()
            .map(|(name, file)| DatasetConfig::new(*name, format!("{}/{id}/{file}", server.uri())))
            .collect(),
    }
}

/// Serve `body` at `/{cycle}/{file}`, expecting exactly `times` requests
pub async fn serve(server: &MockServer, cycle: &str, file: &str, body: Vec<u8>, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{cycle}/{file}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Answer `/{cycle}/{file}` with 404, expecting exactly `times` requests
pub async fn serve_not_found(server: &MockServer, cycle: &str, file: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{cycle}/{file}")))
        .respond_with(ResponseTemplate::new(404))
        .expect(times)
        .mount(server)
        .await;
}

/// Number of lines in the text file at `path`
pub fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|text| text.lines().count())
        .unwrap_or(0)
}
