//! Manual data movement for sessions without a directory grant. The cache is
//! the sole durable target; export is the only way data leaves.

use crate::app_error::{AppError, AppResult};
use crate::cache_store::CacheStore;
use crate::types::{FileName, RecordOrigin};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PickedFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub filename: String,
    pub error: AppError,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub failed: Vec<ImportFailure>,
}

/// Store each picked file as a cache-only record. Per-item isolation: one
/// failed put never aborts the rest.
pub fn import_from_picker(
    cache: &CacheStore,
    files: &[PickedFile],
    now_ms: i64,
) -> ImportReport {
    let mut report = ImportReport::default();
    for file in files {
        let name = FileName(file.name.clone());
        match cache.put(&name, &file.content, now_ms, RecordOrigin::CacheOnly, now_ms) {
            Ok(_) => report.imported.push(file.name.clone()),
            Err(error) => report.failed.push(ImportFailure {
                filename: file.name.clone(),
                error,
            }),
        }
    }
    report
}

/// Read-only with respect to the store: the cached bytes, exactly.
pub fn export_bytes(cache: &CacheStore, filename: &FileName) -> AppResult<String> {
    Ok(cache.get_required(filename)?.content)
}

/// Emit the record as a host-level file download into `dest_dir`.
pub fn export_to_download(
    cache: &CacheStore,
    filename: &FileName,
    dest_dir: &Path,
) -> AppResult<PathBuf> {
    let record = cache.get_required(filename)?;

    fs::create_dir_all(dest_dir).map_err(|e| {
        AppError::new(
            "BV_DOWNLOAD_WRITE_FAILED",
            "transfer",
            "failed creating download destination",
            false,
            serde_json::json!({ "error": e.to_string(), "path": dest_dir }),
        )
    })?;

    let dest = dest_dir.join(filename.as_str());
    fs::write(&dest, record.content.as_bytes()).map_err(|e| {
        AppError::new(
            "BV_DOWNLOAD_WRITE_FAILED",
            "transfer",
            "failed writing download file",
            false,
            serde_json::json!({ "error": e.to_string(), "path": dest }),
        )
    })?;
    Ok(dest)
}
