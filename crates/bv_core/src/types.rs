use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileName(pub String);

impl FileName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a corresponding on-disk file is known to exist for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOrigin {
    DirectoryBacked,
    CacheOnly,
}

impl RecordOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordOrigin::DirectoryBacked => "directory-backed",
            RecordOrigin::CacheOnly => "cache-only",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "directory-backed" => Some(RecordOrigin::DirectoryBacked),
            "cache-only" => Some(RecordOrigin::CacheOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: FileName,
    pub content: String,
    pub last_modified_ms: i64,
    pub origin: RecordOrigin,
    pub content_hash: String,
    pub updated_at_ms: i64,
}

/// Result of a cache `put`. A write carrying a timestamp older than the
/// stored record leaves the record untouched and reports `StaleIgnored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Applied,
    StaleIgnored,
}
