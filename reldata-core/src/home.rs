//! Local cache directory for downloaded releases.

use shellexpand::tilde;
use std::path::PathBuf;

/// Environment variable overriding the default data home.
pub const DATA_HOME_ENV: &str = "RELATIONAL_DATASETS";

const DEFAULT_DATA_HOME: &str = "~/relational_datasets";

/// Resolve the data home without touching the filesystem.
///
/// Precedence: `data_home`, then `$RELATIONAL_DATASETS`, then `~/relational_datasets`.
pub fn resolve_data_home(data_home: Option<&str>) -> PathBuf {
    let raw = match data_home {
        Some(d) => d.to_string(),
        None => std::env::var(DATA_HOME_ENV).unwrap_or_else(|_| DEFAULT_DATA_HOME.to_string()),
    };
    PathBuf::from(tilde(&raw).into_owned())
}

/// Return the path to the data home directory, creating it if needed.
pub fn get_data_home(data_home: Option<&str>) -> std::io::Result<PathBuf> {
    let dir = resolve_data_home(data_home);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Delete the data home and everything cached in it.
pub fn clear_data_home(data_home: Option<&str>) -> std::io::Result<()> {
    let dir = get_data_home(data_home)?;
    tracing::info!(path = %dir.display(), "Clearing data home");
    std::fs::remove_dir_all(dir)
}
