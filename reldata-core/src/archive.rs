//! Deserialize dataset release archives
//!
//! A release is a zip file laid out as:
//!
//! ```text
//! {name}/train/train_{pos,neg,facts}.txt
//! {name}/test/test_{pos,neg,facts}.txt
//! ```
//!
//! or, for cross-validated datasets, the same six files under
//! `{name}/fold{K}/` for `K = 1..N`.

use regex::Regex;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{DatasetError, Result};
use crate::models::RelationalDataset;

/// Fold returned when the caller does not ask for one.
pub const DEFAULT_FOLD: usize = 1;

fn fold_segment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^fold(\d+)$").expect("fold pattern is valid"))
}

/// Collect the fold indices present in a list of archive entry names.
///
/// Only path segments that are exactly `fold{K}` count; an empty set means
/// the archive has no folds.
pub fn fold_indices<'a, I>(entry_names: I) -> BTreeSet<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut folds = BTreeSet::new();
    for entry in entry_names {
        for segment in entry.split('/') {
            if !segment.contains("fold") {
                continue;
            }
            match fold_segment()
                .captures(segment)
                .and_then(|c| c[1].parse::<usize>().ok())
            {
                Some(k) => {
                    folds.insert(k);
                }
                None => {
                    tracing::warn!(entry = %entry, segment = %segment, "Ignoring malformed fold segment");
                }
            }
        }
    }
    folds
}

/// Read the train and test splits of dataset `name` from the archive at `path`.
///
/// For fold-partitioned archives `fold` selects the partition (1-based); it
/// is ignored for archives without folds.
pub fn deserialize_zipfile(
    path: impl AsRef<Path>,
    name: &str,
    fold: usize,
) -> Result<(RelationalDataset, RelationalDataset)> {
    let path = path.as_ref();
    let unreadable = |source: ZipError| DatasetError::ArchiveUnreadable {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(|e| unreadable(ZipError::Io(e)))?;
    let mut archive = ZipArchive::new(file).map_err(unreadable)?;

    let folds = fold_indices(archive.file_names());
    tracing::debug!(
        path = %path.display(),
        entries = archive.len(),
        folds = folds.len(),
        "Opened dataset archive"
    );

    let prefix = match folds.last() {
        None => name.to_string(),
        Some(&available) => {
            if fold == 0 || fold > available {
                return Err(DatasetError::FoldNotFound {
                    requested: fold,
                    available,
                });
            }
            format!("{}/fold{}", name, fold)
        }
    };

    let mut split = |part: &str| -> Result<RelationalDataset> {
        let mut read = |kind: &str| {
            read_lines(
                &mut archive,
                &format!("{}/{p}/{p}_{}.txt", prefix, kind, p = part),
                path,
            )
        };
        Ok(RelationalDataset::new(read("pos")?, read("neg")?, read("facts")?))
    };

    let train = split("train")?;
    let test = split("test")?;
    Ok((train, test))
}

fn read_lines(archive: &mut ZipArchive<File>, entry: &str, archive_path: &Path) -> Result<Vec<String>> {
    let mut file = match archive.by_name(entry) {
        Ok(f) => f,
        Err(ZipError::FileNotFound) => return Err(DatasetError::EntryNotFound(entry.to_string())),
        Err(source) => {
            return Err(DatasetError::ArchiveUnreadable {
                path: archive_path.display().to_string(),
                source,
            })
        }
    };

    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|source| DatasetError::InvalidEntry {
            path: entry.to_string(),
            source,
        })?;

    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    tracing::debug!(entry = %entry, lines = lines.len(), "Read archive entry");
    Ok(lines)
}
