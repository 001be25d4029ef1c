use crate::app_error::{AppError, AppResult};
use crate::cache_store::CacheStore;
use crate::config::FilterConfig;
use crate::hashing::blake3_hex_prefixed;
use crate::types::{FileName, PutOutcome, RecordOrigin};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Projects cache state onto a granted directory root and imports changes
/// made to the directory by other means. Best-effort secondary writer; the
/// cache stays the authoritative view.
pub struct DirectoryMirror {
    filter: FilterConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileFailure {
    pub filename: String,
    pub error: AppError,
}

/// Aggregate outcome of a reconciliation pass. Per-item failures never abort
/// the batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub imported: Vec<String>,
    pub exported: Vec<String>,
    pub unchanged: Vec<String>,
    pub failed: Vec<ReconcileFailure>,
}

enum Step {
    Imported,
    Exported,
    Unchanged,
}

fn ensure_root(root: &Path) -> AppResult<()> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(AppError::new(
            "BV_ROOT_UNAVAILABLE",
            "access",
            "storage root is not a directory",
            true,
            serde_json::json!({ "path": root }),
        )),
        Err(e) => Err(AppError::new(
            "BV_ACCESS_REVOKED",
            "access",
            "storage root is no longer reachable",
            true,
            serde_json::json!({ "error": e.to_string(), "path": root }),
        )),
    }
}

fn map_file_error(e: std::io::Error, code: &str, message: &str, path: &Path) -> AppError {
    match e.kind() {
        ErrorKind::NotFound => AppError::new(
            "BV_FILE_NOT_FOUND",
            "not_found",
            "file does not exist in the storage root",
            false,
            serde_json::json!({ "path": path }),
        ),
        ErrorKind::PermissionDenied => AppError::new(
            "BV_ACCESS_REVOKED",
            "access",
            "storage root access was revoked",
            true,
            serde_json::json!({ "error": e.to_string(), "path": path }),
        ),
        _ => AppError::new(
            code,
            "mirror",
            message,
            false,
            serde_json::json!({ "error": e.to_string(), "path": path }),
        ),
    }
}

impl DirectoryMirror {
    pub fn new(filter: FilterConfig) -> Self {
        Self { filter }
    }

    /// Depth-1 listing of recognized filenames, sorted. Safe to call
    /// repeatedly; each call walks the directory afresh.
    pub fn enumerate(&self, root: &Path) -> AppResult<Vec<FileName>> {
        ensure_root(root)?;
        let mut names = Vec::new();
        for entry in walkdir::WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                // Unreadable entries are skipped, not fatal to the listing.
                Err(e) => {
                    warn!("skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.filter.matches(name) {
                    names.push(FileName(name.to_string()));
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn read_file(&self, root: &Path, filename: &FileName) -> AppResult<String> {
        ensure_root(root)?;
        let path = root.join(filename.as_str());
        fs::read_to_string(&path).map_err(|e| {
            map_file_error(e, "BV_MIRROR_READ_FAILED", "failed reading file from storage root", &path)
        })
    }

    pub fn file_modified_ms(&self, root: &Path, filename: &FileName) -> AppResult<i64> {
        ensure_root(root)?;
        let path = root.join(filename.as_str());
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| {
                map_file_error(e, "BV_MIRROR_READ_FAILED", "failed reading file mtime", &path)
            })?;
        Ok(modified
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0))
    }

    /// Write the file fully (create or overwrite), then `put` the cache with
    /// the same timestamp. All-or-nothing from the caller's perspective: a
    /// failed directory write returns before the cache is touched, and a
    /// write the cache's stale guard would reject returns before the
    /// directory is touched. Both stores move together or not at all.
    pub fn write_file(
        &self,
        cache: &CacheStore,
        root: &Path,
        filename: &FileName,
        content: &str,
        last_modified_ms: i64,
        now_ms: i64,
    ) -> AppResult<PutOutcome> {
        if let Some(existing) = cache.get(filename)? {
            if last_modified_ms < existing.last_modified_ms {
                return Ok(PutOutcome::StaleIgnored);
            }
        }
        self.write_bytes(root, filename, content)?;
        cache.put(
            filename,
            content,
            last_modified_ms,
            RecordOrigin::DirectoryBacked,
            now_ms,
        )
    }

    fn write_bytes(&self, root: &Path, filename: &FileName, content: &str) -> AppResult<()> {
        ensure_root(root)?;
        let path = root.join(filename.as_str());
        fs::write(&path, content).map_err(|e| {
            map_file_error(e, "BV_MIRROR_WRITE_FAILED", "failed writing file to storage root", &path)
        })
    }

    /// Run on every grant activation. Direction rules: the directory wins
    /// only when its mtime is strictly newer than the cached record (or the
    /// record is absent); an equal-hash pair fast-forwards the cache clock
    /// without counting as a change; records marked directory-backed but
    /// missing from the directory are written back out; cache-only records
    /// are never forced onto the directory.
    pub fn reconcile(
        &self,
        cache: &CacheStore,
        root: &Path,
        now_ms: i64,
    ) -> AppResult<ReconcileReport> {
        let names = self.enumerate(root)?;
        let mut report = ReconcileReport::default();
        let mut seen: BTreeSet<FileName> = BTreeSet::new();

        for name in names {
            seen.insert(name.clone());
            match self.reconcile_one(cache, root, &name, now_ms) {
                Ok(Step::Imported) => report.imported.push(name.0),
                Ok(Step::Exported) => report.exported.push(name.0),
                Ok(Step::Unchanged) => report.unchanged.push(name.0),
                Err(error) => report.failed.push(ReconcileFailure {
                    filename: name.0,
                    error,
                }),
            }
        }

        let records = cache.list()?;
        for record in records {
            if seen.contains(&record.filename) {
                continue;
            }
            if record.origin != RecordOrigin::DirectoryBacked {
                continue;
            }
            match self.write_bytes(root, &record.filename, &record.content) {
                Ok(()) => report.exported.push(record.filename.0),
                Err(error) => report.failed.push(ReconcileFailure {
                    filename: record.filename.0,
                    error,
                }),
            }
        }

        debug!(
            "reconcile: {} imported, {} exported, {} unchanged, {} failed",
            report.imported.len(),
            report.exported.len(),
            report.unchanged.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn reconcile_one(
        &self,
        cache: &CacheStore,
        root: &Path,
        name: &FileName,
        now_ms: i64,
    ) -> AppResult<Step> {
        let dir_ms = self.file_modified_ms(root, name)?;
        let cached = cache.get(name)?;

        let record = match cached {
            None => {
                let content = self.read_file(root, name)?;
                cache.put(name, &content, dir_ms, RecordOrigin::DirectoryBacked, now_ms)?;
                return Ok(Step::Imported);
            }
            Some(record) => record,
        };

        let content = self.read_file(root, name)?;
        let dir_hash = blake3_hex_prefixed(content.as_bytes());

        if dir_hash == record.content_hash {
            // Same bytes on both sides; fast-forward the timestamp and make
            // sure the record is marked directory-backed.
            let ts = record.last_modified_ms.max(dir_ms);
            cache.put(name, &content, ts, RecordOrigin::DirectoryBacked, now_ms)?;
            return Ok(Step::Unchanged);
        }

        if dir_ms > record.last_modified_ms {
            cache.put(name, &content, dir_ms, RecordOrigin::DirectoryBacked, now_ms)?;
            Ok(Step::Imported)
        } else {
            // Cache wins on equal or newer timestamps; project it back out.
            self.write_bytes(root, name, &record.content)?;
            cache.put(
                name,
                &record.content,
                record.last_modified_ms,
                RecordOrigin::DirectoryBacked,
                now_ms,
            )?;
            Ok(Step::Exported)
        }
    }
}
