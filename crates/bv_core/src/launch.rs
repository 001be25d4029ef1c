use crate::app_error::{AppError, AppResult};
use crate::cache_store::CacheStore;
use crate::mirror::DirectoryMirror;
use crate::types::{FileName, RecordOrigin};
use log::warn;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Absorbs OS-level "open with this app" file events. The one ingest path
/// that can run before any directory grant exists; the cache alone is a
/// sufficient target.
pub struct LaunchIngestor<'a> {
    cache: &'a CacheStore,
    mirror: Option<(&'a DirectoryMirror, &'a Path)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchFailure {
    pub filename: String,
    pub error: AppError,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LaunchReport {
    pub ingested: Vec<String>,
    pub failed: Vec<LaunchFailure>,
}

impl<'a> LaunchIngestor<'a> {
    pub fn new(cache: &'a CacheStore) -> Self {
        Self {
            cache,
            mirror: None,
        }
    }

    pub fn with_mirror(cache: &'a CacheStore, mirror: &'a DirectoryMirror, root: &'a Path) -> Self {
        Self {
            cache,
            mirror: Some((mirror, root)),
        }
    }

    /// Ingest each referenced file independently; one bad item never aborts
    /// the rest.
    pub fn ingest(&self, paths: &[PathBuf], now_ms: i64) -> LaunchReport {
        let mut report = LaunchReport::default();
        for path in paths {
            match self.ingest_one(path, now_ms) {
                Ok(name) => report.ingested.push(name.0),
                Err(error) => report.failed.push(LaunchFailure {
                    filename: path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or(&path.to_string_lossy())
                        .to_string(),
                    error,
                }),
            }
        }
        report
    }

    fn ingest_one(&self, path: &Path, now_ms: i64) -> AppResult<FileName> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| FileName(n.to_string()))
            .ok_or_else(|| {
                AppError::new(
                    "BV_LAUNCH_READ_FAILED",
                    "ingest",
                    "launch file reference has no usable filename",
                    false,
                    serde_json::json!({ "path": path }),
                )
            })?;

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::new(
                "BV_LAUNCH_READ_FAILED",
                "ingest",
                "failed reading launch file",
                false,
                serde_json::json!({ "error": e.to_string(), "path": path }),
            )
        })?;

        self.cache
            .put(&name, &content, now_ms, RecordOrigin::CacheOnly, now_ms)?;

        // Best effort: a mirror failure downgrades the record to cache-only
        // rather than failing the item.
        if let Some((mirror, root)) = self.mirror {
            if let Err(err) = mirror.write_file(self.cache, root, &name, &content, now_ms, now_ms)
            {
                warn!(
                    "launch ingest: mirror write failed for {} ({}), record kept cache-only",
                    name.0, err.code
                );
            }
        }

        Ok(name)
    }
}
