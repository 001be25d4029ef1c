use crate::app_error::{AppError, AppResult};
use crate::cache_store::CacheStore;
use crate::config::{store_open, store_save, StoreJsonV1};
use crate::grant::{AccessPrompt, GrantStatus, PermissionBroker, StorageGrant};
use crate::launch::{LaunchIngestor, LaunchReport};
use crate::mirror::{DirectoryMirror, ReconcileReport};
use crate::transfer::{self, ImportReport, PickedFile};
use crate::types::{FileName, FileRecord, PutOutcome, RecordOrigin};
use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which producer is live: the directory mirror (grant active) or the
/// manual transfer fallback. Mutually exclusive, selected by grant state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Mirrored,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantOutcome {
    pub status: GrantStatus,
    pub reconcile: Option<ReconcileReport>,
}

/// One application session over one store. Wires the components in their
/// startup order: cache first (leaf dependency), then the broker, which on a
/// grant triggers the mirror's initial reconciliation.
pub struct Session {
    store_root: PathBuf,
    manifest: StoreJsonV1,
    cache: CacheStore,
    mirror: DirectoryMirror,
    broker: PermissionBroker,
}

impl Session {
    pub fn open(store_root: &Path, prompt: Box<dyn AccessPrompt>) -> AppResult<Self> {
        let manifest = store_open(store_root)?;
        let cache = CacheStore::open(&store_root.join(&manifest.db.relative_path))?;
        let mirror = DirectoryMirror::new(manifest.filter.clone());
        let mut broker = PermissionBroker::new(prompt);

        if let Some(hint) = manifest.last_root.clone() {
            if broker.reuse(Path::new(&hint)) {
                debug!("session resumed mirrored mode from remembered root");
            }
        }

        let mut session = Self {
            store_root: store_root.to_path_buf(),
            manifest,
            cache,
            mirror,
            broker,
        };

        if let Some(root) = session.granted_root() {
            let report = session.mirror.reconcile(&session.cache, &root, now_ms_wall());
            match report {
                Ok(report) => debug!(
                    "startup reconcile: {} imported, {} exported",
                    report.imported.len(),
                    report.exported.len()
                ),
                Err(err) => {
                    warn!("startup reconcile failed ({}), dropping to fallback", err.code);
                    session.note_access_failure(&err);
                }
            }
        }

        Ok(session)
    }

    pub fn mode(&self) -> SessionMode {
        if self.broker.current().is_granted() {
            SessionMode::Mirrored
        } else {
            SessionMode::Fallback
        }
    }

    pub fn grant(&self) -> &StorageGrant {
        self.broker.current()
    }

    fn granted_root(&self) -> Option<PathBuf> {
        self.broker.current().root.clone()
    }

    /// Prompt for access. On grant, run the initial reconciliation and
    /// remember the root as a re-validation hint for the next session.
    pub fn request_access(&mut self, now_ms: i64) -> AppResult<GrantOutcome> {
        let status = self.broker.request()?.status;
        if status != GrantStatus::Granted {
            return Ok(GrantOutcome {
                status,
                reconcile: None,
            });
        }

        let root = self.granted_root().ok_or_else(|| {
            AppError::internal("granted state is missing its root reference")
        })?;
        let report = match self.mirror.reconcile(&self.cache, &root, now_ms) {
            Ok(report) => report,
            Err(err) => {
                self.note_access_failure(&err);
                return Err(err);
            }
        };

        self.manifest.last_root = Some(root.to_string_lossy().to_string());
        store_save(&self.store_root, &self.manifest)?;

        Ok(GrantOutcome {
            status,
            reconcile: Some(report),
        })
    }

    pub fn list_files(&self) -> AppResult<Vec<FileRecord>> {
        self.cache.list()
    }

    pub fn load_file(&self, filename: &FileName) -> AppResult<FileRecord> {
        self.cache.get_required(filename)
    }

    /// Route a save through the mirror when a grant is active, through the
    /// cache alone otherwise. A mirror access failure invalidates the grant
    /// (lazy revocation) and surfaces; the caller retries in fallback mode.
    pub fn save_file(
        &mut self,
        filename: &FileName,
        content: &str,
        now_ms: i64,
    ) -> AppResult<PutOutcome> {
        match self.granted_root() {
            Some(root) => {
                match self
                    .mirror
                    .write_file(&self.cache, &root, filename, content, now_ms, now_ms)
                {
                    Ok(outcome) => Ok(outcome),
                    Err(err) => {
                        self.note_access_failure(&err);
                        Err(err)
                    }
                }
            }
            None => self
                .cache
                .put(filename, content, now_ms, RecordOrigin::CacheOnly, now_ms),
        }
    }

    pub fn delete_file(&self, filename: &FileName) -> AppResult<()> {
        self.cache.delete(filename)
    }

    /// Host-delivered launch event: ingest each referenced file, mirroring
    /// when a grant is active.
    pub fn open_with(&self, paths: &[PathBuf], now_ms: i64) -> LaunchReport {
        match self.granted_root() {
            Some(root) => {
                LaunchIngestor::with_mirror(&self.cache, &self.mirror, &root).ingest(paths, now_ms)
            }
            None => LaunchIngestor::new(&self.cache).ingest(paths, now_ms),
        }
    }

    pub fn import_from_picker(&self, files: &[PickedFile], now_ms: i64) -> ImportReport {
        transfer::import_from_picker(&self.cache, files, now_ms)
    }

    pub fn export_to_download(&self, filename: &FileName, dest_dir: &Path) -> AppResult<PathBuf> {
        transfer::export_to_download(&self.cache, filename, dest_dir)
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn manifest(&self) -> &StoreJsonV1 {
        &self.manifest
    }

    fn note_access_failure(&mut self, err: &AppError) {
        if err.is_access() {
            self.broker.invalidate();
        }
    }
}

fn now_ms_wall() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}
