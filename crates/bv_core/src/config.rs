use crate::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreJsonV1 {
    pub schema_version: u32,
    pub store_id: String,
    pub store_slug: String,
    pub created_at_ms: i64,
    pub db: StoreDbConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    /// Re-validation hint only. Authority over the root is never persisted;
    /// each session re-probes this path before treating it as granted.
    #[serde(default)]
    pub last_root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDbConfig {
    pub relative_path: String,
}

/// Which filenames the directory mirror recognizes. Case sensitivity is
/// configuration, not behavior baked into the mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub extensions: Vec<String>,
    pub case_insensitive: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["csv".to_string()],
            case_insensitive: true,
        }
    }
}

impl FilterConfig {
    pub fn matches(&self, filename: &str) -> bool {
        let trimmed = filename.trim_end();
        let ext = match trimmed.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => return false,
        };
        self.extensions.iter().any(|allowed| {
            if self.case_insensitive {
                ext.eq_ignore_ascii_case(allowed)
            } else {
                ext == allowed
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
    pub db: PathBuf,
}

pub fn store_paths(store_path: &Path) -> StorePaths {
    StorePaths {
        root: store_path.to_path_buf(),
        db: store_path.join("db/cache.sqlite"),
    }
}

pub fn store_init(store_path: &Path, store_slug: &str, now_ms: i64) -> AppResult<StoreJsonV1> {
    let paths = store_paths(store_path);
    fs::create_dir_all(paths.db.parent().ok_or_else(|| {
        AppError::new(
            "BV_STORE_INIT_FAILED",
            "config",
            "unable to resolve db parent directory",
            false,
            serde_json::json!({ "store_path": store_path }),
        )
    })?)
    .map_err(|e| {
        AppError::new(
            "BV_STORE_INIT_FAILED",
            "config",
            "failed to create db directory",
            false,
            serde_json::json!({ "error": e.to_string() }),
        )
    })?;

    let store = StoreJsonV1 {
        schema_version: 1,
        store_id: Uuid::new_v4().to_string(),
        store_slug: store_slug.to_string(),
        created_at_ms: now_ms,
        db: StoreDbConfig {
            relative_path: "db/cache.sqlite".to_string(),
        },
        filter: FilterConfig::default(),
        last_root: None,
    };

    store_save(store_path, &store)?;

    Ok(store)
}

pub fn store_save(store_path: &Path, store: &StoreJsonV1) -> AppResult<()> {
    let bytes = serde_json::to_vec_pretty(store).map_err(|e| {
        AppError::new(
            "BV_STORE_INIT_FAILED",
            "config",
            "failed to serialize store.json",
            false,
            serde_json::json!({ "error": e.to_string() }),
        )
    })?;

    fs::write(store_path.join("store.json"), bytes).map_err(|e| {
        AppError::new(
            "BV_STORE_INIT_FAILED",
            "config",
            "failed to write store.json",
            false,
            serde_json::json!({ "error": e.to_string() }),
        )
    })?;
    Ok(())
}

pub fn store_open(store_path: &Path) -> AppResult<StoreJsonV1> {
    let path = store_path.join("store.json");
    let bytes = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::new(
                "BV_STORE_JSON_MISSING",
                "config",
                "store.json is missing",
                false,
                serde_json::json!({ "path": path }),
            )
        } else {
            AppError::new(
                "BV_STORE_JSON_INVALID",
                "config",
                "failed to read store.json",
                false,
                serde_json::json!({ "error": e.to_string(), "path": path }),
            )
        }
    })?;

    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        AppError::new(
            "BV_STORE_JSON_INVALID",
            "config",
            "failed to parse store.json",
            false,
            serde_json::json!({ "error": e.to_string(), "path": path }),
        )
    })?;

    let schema_version = value
        .get("schema_version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| {
            AppError::new(
                "BV_STORE_JSON_INVALID",
                "config",
                "store schema_version missing or invalid",
                false,
                serde_json::json!({ "path": path }),
            )
        })? as u32;

    match schema_version {
        1 => serde_json::from_value(value).map_err(|e| {
            AppError::new(
                "BV_STORE_JSON_INVALID",
                "config",
                "failed to parse store schema v1",
                false,
                serde_json::json!({ "error": e.to_string(), "path": path }),
            )
        }),
        _ => Err(AppError::new(
            "BV_STORE_JSON_UNSUPPORTED_VERSION",
            "config",
            "unsupported store schema_version",
            false,
            serde_json::json!({ "expected": [1], "actual": schema_version }),
        )),
    }
}
