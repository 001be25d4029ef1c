use crate::app_error::{AppError, AppResult};
use crate::db::open_db;
use crate::hashing::{blake3_hex_prefixed, validate_blake3_prefixed};
use crate::types::{FileName, FileRecord, PutOutcome, RecordOrigin};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

/// Durable key-value mirror of file contents, independent of any directory
/// grant. The authoritative FileRecord set for the rest of the application.
///
/// Owns its connection: all writes serialize through `&self` on the session
/// thread, so a later call's effect cannot be clobbered by an earlier one.
/// Reads fall back to an in-memory overlay of previously loaded records when
/// the underlying database degrades; writes in that state still fail.
pub struct CacheStore {
    conn: Connection,
    overlay: RefCell<BTreeMap<FileName, FileRecord>>,
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let origin: String = row.get(3)?;
    let content: String = row.get(1)?;
    let stored_hash: String = row.get(4)?;
    // A stored hash that fails format validation is recomputed from the
    // content instead of trusted.
    let content_hash = match validate_blake3_prefixed(&stored_hash) {
        Ok(()) => stored_hash,
        Err(err) => {
            warn!("stored content hash is invalid ({}), recomputing", err.code);
            blake3_hex_prefixed(content.as_bytes())
        }
    };
    Ok(FileRecord {
        filename: FileName(row.get(0)?),
        content,
        last_modified_ms: row.get(2)?,
        origin: RecordOrigin::parse(&origin).unwrap_or(RecordOrigin::CacheOnly),
        content_hash,
        updated_at_ms: row.get(5)?,
    })
}

const RECORD_COLUMNS: &str =
    "filename, content, last_modified_ms, origin, content_hash, updated_at_ms";

impl CacheStore {
    pub fn open(db_path: &Path) -> AppResult<Self> {
        let conn = open_db(db_path)?;
        let store = Self {
            conn,
            overlay: RefCell::new(BTreeMap::new()),
        };
        // Warm the overlay so degraded reads can serve records from before
        // the failure, not only ones touched this session.
        let records = store.list_from_db()?;
        let mut overlay = store.overlay.borrow_mut();
        for record in records {
            overlay.insert(record.filename.clone(), record);
        }
        drop(overlay);
        Ok(store)
    }

    /// Atomic upsert. The stale guard keeps `last_modified_ms` monotonically
    /// non-decreasing per filename: an older timestamp than the stored one
    /// leaves the record untouched and reports `StaleIgnored`.
    pub fn put(
        &self,
        filename: &FileName,
        content: &str,
        last_modified_ms: i64,
        origin: RecordOrigin,
        now_ms: i64,
    ) -> AppResult<PutOutcome> {
        let content_hash = blake3_hex_prefixed(content.as_bytes());
        let changed = self
            .conn
            .execute(
                "INSERT INTO records (filename, content, last_modified_ms, origin, content_hash, updated_at_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(filename) DO UPDATE SET
                   content=excluded.content,
                   last_modified_ms=excluded.last_modified_ms,
                   origin=excluded.origin,
                   content_hash=excluded.content_hash,
                   updated_at_ms=excluded.updated_at_ms
                 WHERE excluded.last_modified_ms >= records.last_modified_ms",
                params![
                    filename.0,
                    content,
                    last_modified_ms,
                    origin.as_str(),
                    content_hash,
                    now_ms
                ],
            )
            .map_err(|e| {
                AppError::new(
                    "BV_CACHE_WRITE_FAILED",
                    "persistence",
                    "failed to upsert record",
                    false,
                    serde_json::json!({ "error": e.to_string(), "filename": filename.0 }),
                )
            })?;

        if changed == 0 {
            return Ok(PutOutcome::StaleIgnored);
        }

        self.overlay.borrow_mut().insert(
            filename.clone(),
            FileRecord {
                filename: filename.clone(),
                content: content.to_string(),
                last_modified_ms,
                origin,
                content_hash,
                updated_at_ms: now_ms,
            },
        );
        Ok(PutOutcome::Applied)
    }

    pub fn get(&self, filename: &FileName) -> AppResult<Option<FileRecord>> {
        let fetched = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE filename=?1"),
                params![filename.0],
                row_to_record,
            )
            .optional();

        match fetched {
            Ok(Some(record)) => {
                self.overlay
                    .borrow_mut()
                    .insert(filename.clone(), record.clone());
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                let err = AppError::new(
                    "BV_CACHE_READ_FAILED",
                    "persistence",
                    "failed to read record",
                    false,
                    serde_json::json!({ "error": e.to_string(), "filename": filename.0 }),
                );
                match self.overlay.borrow().get(filename) {
                    Some(record) => {
                        warn!(
                            "cache read failed for {}, serving from memory overlay",
                            filename.0
                        );
                        Ok(Some(record.clone()))
                    }
                    None => Err(err),
                }
            }
        }
    }

    pub fn get_required(&self, filename: &FileName) -> AppResult<FileRecord> {
        self.get(filename)?.ok_or_else(|| {
            AppError::new(
                "BV_RECORD_NOT_FOUND",
                "not_found",
                "no record for filename",
                false,
                serde_json::json!({ "filename": filename.0 }),
            )
        })
    }

    /// Record order is filename order for determinism; callers must not
    /// depend on it.
    pub fn list(&self) -> AppResult<Vec<FileRecord>> {
        match self.list_from_db() {
            Ok(records) => {
                let mut overlay = self.overlay.borrow_mut();
                overlay.clear();
                for record in &records {
                    overlay.insert(record.filename.clone(), record.clone());
                }
                Ok(records)
            }
            Err(err) => {
                warn!("cache list failed ({}), serving from memory overlay", err.code);
                Ok(self.overlay.borrow().values().cloned().collect())
            }
        }
    }

    fn list_from_db(&self) -> AppResult<Vec<FileRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM records ORDER BY filename ASC"
            ))
            .map_err(|e| list_error(&e))?;
        let rows = stmt
            .query_map([], row_to_record)
            .map_err(|e| list_error(&e))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| list_error(&e))?);
        }
        Ok(records)
    }

    pub fn delete(&self, filename: &FileName) -> AppResult<()> {
        self.conn
            .execute("DELETE FROM records WHERE filename=?1", params![filename.0])
            .map_err(|e| {
                AppError::new(
                    "BV_CACHE_WRITE_FAILED",
                    "persistence",
                    "failed to delete record",
                    false,
                    serde_json::json!({ "error": e.to_string(), "filename": filename.0 }),
                )
            })?;
        self.overlay.borrow_mut().remove(filename);
        Ok(())
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn list_error(e: &rusqlite::Error) -> AppError {
    AppError::new(
        "BV_CACHE_READ_FAILED",
        "persistence",
        "failed to list records",
        false,
        serde_json::json!({ "error": e.to_string() }),
    )
}
