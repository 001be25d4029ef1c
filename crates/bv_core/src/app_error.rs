use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub schema_version: u32,
    pub code: String,
    pub category: String,
    pub message: String,
    pub retryable: bool,
    pub details: Value,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(code: &str, category: &str, message: &str, retryable: bool, details: Value) -> Self {
        Self {
            schema_version: 1,
            code: code.to_string(),
            category: category.to_string(),
            message: message.to_string(),
            retryable,
            details,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self::new("BV_INTERNAL_ERROR", "internal", message, false, json!({}))
    }

    /// Directory root unavailable, revoked, or denied. Callers should fall
    /// back to manual transfer or re-prompt through the broker.
    pub fn is_access(&self) -> bool {
        self.category == "access"
    }

    /// The cache store failed to read or write. Non-fatal to the session but
    /// must be surfaced: durability is compromised.
    pub fn is_persistence(&self) -> bool {
        self.category == "persistence"
    }

    /// Requested filename does not exist in the relevant store. Never a
    /// system fault.
    pub fn is_not_found(&self) -> bool {
        self.category == "not_found"
    }
}
