use std::path::{Path, PathBuf};

use eyre::{Context as _, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt as _;

pub(super) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub(super) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write a file holding secret material, readable by the owner only.
///
/// With `create_new` an existing file is never replaced. Otherwise the contents go to
/// a fresh owner-only file in the same directory that is renamed over `path`, so the
/// target never keeps an older mode and is never left half written.
pub(super) async fn write_private_json<T: Serialize>(
    path: &Path,
    value: &T,
    create_new: bool,
) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if create_new {
        return write_new_private(path, json.as_bytes()).await;
    }

    let staging = staging_path(path)?;
    if let Err(e) = write_new_private(&staging, json.as_bytes()).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

/// Create `path` owner-only and write `contents`; a failed write removes the file.
async fn write_new_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let written = async {
        file.write_all(contents).await?;
        file.sync_all().await
    }
    .await;
    if let Err(e) = written {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Hidden sibling of `path` with a random suffix.
fn staging_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("{} is not a file path", path.display()))?;
    let mut staging = std::ffi::OsString::from(".");
    staging.push(name);
    staging.push(format!(".{:016x}.tmp", rand::random::<u64>()));
    Ok(path.with_file_name(staging))
}

/// Read a raw transaction stored either as hex text or as binary.
///
/// # Errors
/// Returns an error if the file cannot be read or is empty.
pub async fn read_transaction_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let bytes = std::str::from_utf8(&contents)
        .ok()
        .and_then(|text| hex::decode(text.trim()).ok())
        .unwrap_or(contents);
    eyre::ensure!(!bytes.is_empty(), "{} is empty", path.display());
    Ok(bytes)
}
