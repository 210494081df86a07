//! Snapshot writer.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use gwcal_core::Dataset;

/// Writes `dataset` as pretty-printed JSON to `path`, replacing any previous
/// snapshot atomically: the JSON goes to a sibling temp file which is then
/// renamed over the target. Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written or renamed into place.
pub(crate) async fn write_dataset(path: &Path, dataset: &Dataset) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(dataset).context("failed to serialize dataset")?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp = temp_path_for(path);
    if let Err(err) = tokio::fs::write(&tmp, json).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err).with_context(|| format!("failed to write {}", tmp.display()));
    }

    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err).with_context(|| {
            format!("failed to move {} into place at {}", tmp.display(), path.display())
        });
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("dataset"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}
