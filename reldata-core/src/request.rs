//! Download relational dataset releases
//!
//! Archives are published as release assets of the `srlearn/datasets`
//! repository and cached in the data home as `{name}_{version}.zip`.
//! [`ArchiveSource`] is the seam between loading and fetching, so callers
//! (and tests) can supply archives from anywhere.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::archive::deserialize_zipfile;
use crate::config::{DatasetsConfig, ReleaseConfig};
use crate::error::Result;
use crate::home::get_data_home;
use crate::models::RelationalDataset;

/// Release fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {code} for {url}")]
    Status { code: u16, url: String },

    #[error("Unknown dataset `{0}`")]
    UnknownDataset(String),

    #[error("Missing tag_name in latest release response")]
    MissingTag,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// ArchiveSource trait
// ============================================================================

/// Something that can hand out local copies of dataset archives.
pub trait ArchiveSource {
    /// Local path to the archive for `name` at `version` (latest known default when `None`).
    fn fetch(&self, name: &str, version: Option<&str>) -> std::result::Result<PathBuf, FetchError>;

    /// Newest published version tag, e.g. `v0.0.3`.
    fn latest_version(&self) -> std::result::Result<String, FetchError>;
}

/// Fetch a dataset archive and deserialize the requested fold.
pub fn load<S: ArchiveSource + ?Sized>(
    source: &S,
    name: &str,
    version: Option<&str>,
    fold: usize,
) -> Result<(RelationalDataset, RelationalDataset)> {
    let archive = source.fetch(name, version)?;
    deserialize_zipfile(&archive, name, fold)
}

// ============================================================================
// ReleaseClient
// ============================================================================

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: Option<String>,
}

/// Fetches archives from the release repository over HTTP, caching them in the data home.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: Client,
    release: ReleaseConfig,
    datasets: Vec<String>,
    data_home: PathBuf,
}

impl ReleaseClient {
    pub fn new(config: &DatasetsConfig) -> std::result::Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.release.timeout_seconds))
            .user_agent(concat!("reldata/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            release: config.release.clone(),
            datasets: config.datasets.clone(),
            data_home: get_data_home(config.data_home.as_deref())?,
        })
    }

    /// Create a client with custom download and API base URLs (for testing / mirrors)
    pub fn with_base_urls(
        config: &DatasetsConfig,
        download_url: String,
        api_url: String,
    ) -> std::result::Result<Self, FetchError> {
        let mut client = Self::new(config)?;
        client.release.download_url = download_url;
        client.release.api_url = api_url;
        Ok(client)
    }

    /// `version`, or the configured default when absent or empty.
    pub fn resolve_version(&self, version: Option<&str>) -> String {
        match version {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => self.release.default_version.clone(),
        }
    }

    /// Download URL of a dataset archive.
    pub fn data_url(&self, name: &str, version: Option<&str>) -> std::result::Result<String, FetchError> {
        if !self.datasets.iter().any(|d| d == name) {
            return Err(FetchError::UnknownDataset(name.to_string()));
        }
        Ok(format!(
            "{}/{}/{}.zip",
            self.release.download_url.trim_end_matches('/'),
            self.resolve_version(version),
            name
        ))
    }

    pub fn cache_path(&self, name: &str, version: &str) -> PathBuf {
        self.data_home.join(format!("{}_{}.zip", name, version))
    }
}

impl ArchiveSource for ReleaseClient {
    fn fetch(&self, name: &str, version: Option<&str>) -> std::result::Result<PathBuf, FetchError> {
        let version = self.resolve_version(version);
        let url = self.data_url(name, Some(&version))?;

        let data_file = self.cache_path(name, &version);
        if data_file.is_file() {
            tracing::info!(dataset = name, version = %version, path = %data_file.display(), "Using cached archive");
            return Ok(data_file);
        }

        tracing::info!(dataset = name, version = %version, url = %url, "Downloading archive");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(code = status.as_u16(), url = %url, "Archive download failed");
            return Err(FetchError::Status {
                code: status.as_u16(),
                url,
            });
        }

        let bytes = response.bytes()?;

        // Write beside the final name so an interrupted download never looks cached.
        let partial = data_file.with_extension("zip.part");
        std::fs::write(&partial, &bytes)?;
        std::fs::rename(&partial, &data_file)?;

        tracing::info!(path = %data_file.display(), bytes = bytes.len(), "Cached archive");
        Ok(data_file)
    }

    fn latest_version(&self) -> std::result::Result<String, FetchError> {
        let url = format!(
            "{}/repos/{}/releases/latest",
            self.release.api_url.trim_end_matches('/'),
            self.release.repository
        );

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                url,
            });
        }

        let latest: LatestRelease = response.json()?;
        latest.tag_name.ok_or(FetchError::MissingTag)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::SimpleFileOptions;

    fn test_config(home: &Path) -> DatasetsConfig {
        DatasetsConfig {
            data_home: Some(home.to_string_lossy().into_owned()),
            ..DatasetsConfig::default()
        }
    }

    fn toy_cancer_zip() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let entries = [
            ("toy_cancer/train/train_pos.txt", "cancer(alice).\ncancer(bob).\n"),
            ("toy_cancer/train/train_neg.txt", "cancer(dan).\n"),
            ("toy_cancer/train/train_facts.txt", "smokes(alice).\nfriends(alice,bob).\n"),
            ("toy_cancer/test/test_pos.txt", "cancer(earl).\n"),
            ("toy_cancer/test/test_neg.txt", "cancer(frank).\n"),
            ("toy_cancer/test/test_facts.txt", "smokes(earl).\n"),
        ];
        for (name, body) in entries {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_data_url_uses_default_version() {
        let home = tempfile::tempdir().unwrap();
        let client = ReleaseClient::new(&test_config(home.path())).unwrap();

        assert_eq!(
            client.data_url("toy_cancer", None).unwrap(),
            "https://github.com/srlearn/datasets/releases/download/v0.0.3/toy_cancer.zip"
        );
        assert_eq!(
            client.data_url("webkb", Some("v0.0.1")).unwrap(),
            "https://github.com/srlearn/datasets/releases/download/v0.0.1/webkb.zip"
        );
        assert_eq!(client.resolve_version(Some("")), "v0.0.3");
    }

    #[test]
    fn test_data_url_rejects_unknown_dataset() {
        let home = tempfile::tempdir().unwrap();
        let client = ReleaseClient::new(&test_config(home.path())).unwrap();
        match client.data_url("imdb", None) {
            Err(FetchError::UnknownDataset(name)) => assert_eq!(name, "imdb"),
            other => panic!("Expected UnknownDataset, got {:?}", other),
        }
    }

    #[test]
    fn test_cached_archive_is_returned_without_network() {
        let home = tempfile::tempdir().unwrap();
        // Unroutable base URL: any request would fail.
        let client = ReleaseClient::with_base_urls(
            &test_config(home.path()),
            "http://127.0.0.1:9".to_string(),
            "http://127.0.0.1:9".to_string(),
        )
        .unwrap();

        let cached = client.cache_path("toy_cancer", "v0.0.3");
        std::fs::write(&cached, toy_cancer_zip()).unwrap();

        let path = client.fetch("toy_cancer", Some("v0.0.3")).unwrap();
        assert_eq!(path, cached);
    }

    #[tokio::test]
    async fn test_fetch_downloads_once_then_uses_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/v0.0.3/toy_cancer.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(toy_cancer_zip()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let home = tempfile::tempdir().unwrap();
        let config = test_config(home.path());
        let base = mock_server.uri();

        let (first, second, train) = tokio::task::spawn_blocking(move || {
            let client = ReleaseClient::with_base_urls(
                &config,
                format!("{}/download", base),
                base.clone(),
            )
            .unwrap();
            let first = client.fetch("toy_cancer", None).unwrap();
            let second = client.fetch("toy_cancer", Some("v0.0.3")).unwrap();
            let (train, _) = load(&client, "toy_cancer", None, 1).unwrap();
            (first, second, train)
        })
        .await
        .unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with("toy_cancer_v0.0.3.zip"));
        assert!(!first.with_extension("zip.part").exists());
        assert_eq!(train.pos, vec!["cancer(alice).", "cancer(bob)."]);
    }

    #[tokio::test]
    async fn test_fetch_returns_status_error_on_404() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let home = tempfile::tempdir().unwrap();
        let config = test_config(home.path());
        let base = mock_server.uri();

        let result = tokio::task::spawn_blocking(move || {
            let client = ReleaseClient::with_base_urls(&config, base.clone(), base).unwrap();
            let result = client.fetch("cora", Some("v9.9.9"));
            let cached = client.cache_path("cora", "v9.9.9").exists();
            (result, cached)
        })
        .await
        .unwrap();

        match result {
            (Err(FetchError::Status { code, url }), cached) => {
                assert_eq!(code, 404);
                assert!(url.ends_with("/v9.9.9/cora.zip"));
                assert!(!cached, "failed download must not be cached");
            }
            (other, _) => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_latest_version_reads_tag_name() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/srlearn/datasets/releases/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tag_name": "v0.0.5",
                "name": "Release v0.0.5"
            })))
            .mount(&mock_server)
            .await;

        let home = tempfile::tempdir().unwrap();
        let config = test_config(home.path());
        let base = mock_server.uri();

        let version = tokio::task::spawn_blocking(move || {
            let client = ReleaseClient::with_base_urls(&config, base.clone(), base).unwrap();
            client.latest_version()
        })
        .await
        .unwrap();

        assert_eq!(version.unwrap(), "v0.0.5");
    }

    #[tokio::test]
    async fn test_latest_version_without_tag_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let home = tempfile::tempdir().unwrap();
        let config = test_config(home.path());
        let base = mock_server.uri();

        let version = tokio::task::spawn_blocking(move || {
            let client = ReleaseClient::with_base_urls(&config, base.clone(), base).unwrap();
            client.latest_version()
        })
        .await
        .unwrap();

        assert!(matches!(version, Err(FetchError::MissingTag)));
    }
}
