use crate::app_error::{AppError, AppResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    Unrequested,
    Pending,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantMode {
    ReadWrite,
}

/// Permission state for the storage root. Created once per session, never
/// persisted across the process boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageGrant {
    pub status: GrantStatus,
    pub root: Option<PathBuf>,
    pub mode: GrantMode,
}

impl StorageGrant {
    fn unrequested() -> Self {
        Self {
            status: GrantStatus::Unrequested,
            root: None,
            mode: GrantMode::ReadWrite,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.status == GrantStatus::Granted
    }
}

/// Outcome of prompting the host for a storage root. Dismissal is a
/// first-class answer, not a failure.
#[derive(Debug, Clone)]
pub enum PromptOutcome {
    Granted(PathBuf),
    Dismissed,
}

/// Host capability that asks the user for a storage root. Injected so tests
/// can substitute fakes.
pub trait AccessPrompt {
    fn request_root(&self) -> AppResult<PromptOutcome>;
}

pub struct PermissionBroker {
    prompt: Box<dyn AccessPrompt>,
    grant: StorageGrant,
}

impl PermissionBroker {
    pub fn new(prompt: Box<dyn AccessPrompt>) -> Self {
        Self {
            prompt,
            grant: StorageGrant::unrequested(),
        }
    }

    pub fn current(&self) -> &StorageGrant {
        &self.grant
    }

    /// Prompt the host for a storage root. User dismissal resolves to
    /// `Denied` without an error; prompt failures surface as access errors
    /// and also leave the grant denied. `Granted` is terminal for the
    /// session: repeat calls return the existing grant without prompting.
    pub fn request(&mut self) -> AppResult<&StorageGrant> {
        if self.grant.is_granted() {
            return Ok(&self.grant);
        }

        self.grant.status = GrantStatus::Pending;
        match self.prompt.request_root() {
            Ok(PromptOutcome::Granted(root)) => {
                if let Err(err) = validate_root(&root) {
                    self.grant.status = GrantStatus::Denied;
                    self.grant.root = None;
                    return Err(err);
                }
                debug!("storage root granted: {}", root.display());
                self.grant.status = GrantStatus::Granted;
                self.grant.root = Some(root);
                Ok(&self.grant)
            }
            Ok(PromptOutcome::Dismissed) => {
                self.grant.status = GrantStatus::Denied;
                self.grant.root = None;
                Ok(&self.grant)
            }
            Err(err) => {
                self.grant.status = GrantStatus::Denied;
                self.grant.root = None;
                Err(err)
            }
        }
    }

    /// Re-validate a remembered root without prompting. Only meaningful
    /// before the first `request()`; a failed probe leaves the grant
    /// unrequested so the session can still prompt later.
    pub fn reuse(&mut self, hint: &Path) -> bool {
        if self.grant.status != GrantStatus::Unrequested {
            return self.grant.is_granted();
        }
        match validate_root(hint) {
            Ok(()) => {
                debug!("reusing remembered storage root: {}", hint.display());
                self.grant.status = GrantStatus::Granted;
                self.grant.root = Some(hint.to_path_buf());
                true
            }
            Err(err) => {
                debug!(
                    "remembered storage root rejected ({}): {}",
                    err.code,
                    hint.display()
                );
                false
            }
        }
    }

    /// Lazy `granted -> denied` transition, driven by the first detected
    /// out-of-band revocation.
    pub fn invalidate(&mut self) {
        if self.grant.is_granted() {
            debug!("storage grant invalidated after access failure");
            self.grant.status = GrantStatus::Denied;
            self.grant.root = None;
        }
    }
}

/// Probe a candidate root: it must exist, be a directory, and accept writes.
pub fn validate_root(root: &Path) -> AppResult<()> {
    let meta = fs::metadata(root).map_err(|e| {
        AppError::new(
            "BV_ROOT_UNAVAILABLE",
            "access",
            "storage root is not reachable",
            true,
            serde_json::json!({ "error": e.to_string(), "path": root }),
        )
    })?;
    if !meta.is_dir() {
        return Err(AppError::new(
            "BV_ROOT_UNAVAILABLE",
            "access",
            "storage root is not a directory",
            true,
            serde_json::json!({ "path": root }),
        ));
    }

    let probe = root.join(".bv-probe");
    fs::write(&probe, b"probe").map_err(|e| {
        AppError::new(
            "BV_ACCESS_DENIED",
            "access",
            "storage root rejected a write probe",
            true,
            serde_json::json!({ "error": e.to_string(), "path": root }),
        )
    })?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

/// Concrete prompt for hosts without a native directory picker: a candidate
/// path supplied up front, or `None` when the user dismissed the request.
pub struct DirProbePrompt {
    candidate: Option<PathBuf>,
}

impl DirProbePrompt {
    pub fn granting(candidate: PathBuf) -> Self {
        Self {
            candidate: Some(candidate),
        }
    }

    pub fn dismissed() -> Self {
        Self { candidate: None }
    }
}

impl AccessPrompt for DirProbePrompt {
    fn request_root(&self) -> AppResult<PromptOutcome> {
        match &self.candidate {
            Some(path) => Ok(PromptOutcome::Granted(path.clone())),
            None => Ok(PromptOutcome::Dismissed),
        }
    }
}
