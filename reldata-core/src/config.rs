use config::{Config, ConfigError, File};
use serde::Deserialize;

pub const DEFAULT_DOWNLOAD_URL: &str = "https://github.com/srlearn/datasets/releases/download";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REPOSITORY: &str = "srlearn/datasets";
pub const DEFAULT_VERSION: &str = "v0.0.3";

/// Datasets published in the release repository.
pub const KNOWN_DATASETS: &[&str] = &[
    "toy_cancer",
    "toy_father",
    "citeseer",
    "cora",
    "uwcse",
    "webkb",
];

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetsConfig {
    /// Cache directory. `None` falls back to `RELATIONAL_DATASETS`, then `~/relational_datasets`.
    pub data_home: Option<String>,
    pub datasets: Vec<String>,
    pub release: ReleaseConfig,
    pub logging: LoggingConfig,
}

impl Default for DatasetsConfig {
    fn default() -> Self {
        Self {
            data_home: None,
            datasets: KNOWN_DATASETS.iter().map(|s| s.to_string()).collect(),
            release: ReleaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReleaseConfig {
    pub download_url: String,
    pub api_url: String,
    pub repository: String,
    pub default_version: String,
    pub timeout_seconds: u64,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            default_version: DEFAULT_VERSION.to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DatasetsConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }

    /// Like [`DatasetsConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let s = Config::builder()
                    .add_source(File::with_name(p).required(false))
                    .build()?;
                s.try_deserialize()
            }
            None => Ok(Self::default()),
        }
    }
}
