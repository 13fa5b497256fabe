//! JSON export of a finished crawl.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use hkfood_core::Dataset;

/// `hkfood_hk_{name}_{YYYYmmdd_HHMMSS}.json`, stamped in local time.
///
/// Characters in `name` that are unsafe in file names become `_`.
pub(crate) fn export_file_name(name: &str, collected_at: DateTime<Utc>) -> String {
    let name: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let name = if name.is_empty() { "coordinates" } else { name.as_str() };
    let stamp = collected_at.with_timezone(&Local).format("%Y%m%d_%H%M%S");
    format!("hkfood_hk_{name}_{stamp}.json")
}

/// Writes `dataset` as pretty JSON under `dir`, creating it if needed.
///
/// Returns `Ok(None)` without touching the filesystem when the dataset is
/// empty.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub(crate) fn write_dataset(
    dataset: &Dataset,
    dir: &Path,
    name: &str,
) -> anyhow::Result<Option<PathBuf>> {
    if dataset.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(export_file_name(name, dataset.collected_at));

    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, dataset)
        .with_context(|| format!("failed to serialize dataset to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), records = dataset.records.len(), "exported dataset");
    Ok(Some(path))
}
