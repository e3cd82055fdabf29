// Whole-file JSON I/O. Writes go to a sibling temp file and are renamed into place,
// so readers never observe a half-written file.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads and parses `path`. A missing file is `Ok(None)`; unreadable or malformed is an error.
pub(super) async fn read<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(anyhow::anyhow!("read {}: {}", path.display(), e)),
    };
    let value = serde_json::from_slice(&bytes)
        .map_err(|e| anyhow::anyhow!("parse {}: {}", path.display(), e))?;
    Ok(Some(value))
}

/// Serializes `value` and atomically replaces `path` with it.
pub(super) async fn write_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec(value)?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| anyhow::anyhow!("write {}: {}", tmp.display(), e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| anyhow::anyhow!("rename {} -> {}: {}", tmp.display(), path.display(), e))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
