use crate::commands::grant::open_session;
use bv_core::app_error::{AppError, AppResult};
use bv_core::types::FileName;
use std::fs;

pub fn run_list(store_path: &str) -> AppResult<()> {
    let session = open_session(store_path, None)?;
    let records: Vec<serde_json::Value> = session
        .list_files()?
        .into_iter()
        .map(|r| {
            serde_json::json!({
                "filename": r.filename.0,
                "last_modified_ms": r.last_modified_ms,
                "origin": r.origin,
                "bytes": r.content.len(),
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string())
    );
    Ok(())
}

pub fn run_get(store_path: &str, filename: &str) -> AppResult<()> {
    let session = open_session(store_path, None)?;
    let record = session.load_file(&FileName(filename.to_string()))?;
    print!("{}", record.content);
    Ok(())
}

pub fn run_put(store_path: &str, filename: &str, content_file: &str, now_ms: i64) -> AppResult<()> {
    let content = fs::read_to_string(content_file).map_err(|e| {
        AppError::new(
            "BV_IMPORT_READ_FAILED",
            "ingest",
            "failed reading content file",
            false,
            serde_json::json!({ "error": e.to_string(), "path": content_file }),
        )
    })?;

    let mut session = open_session(store_path, None)?;
    session.save_file(&FileName(filename.to_string()), &content, now_ms)?;
    println!("saved {}", filename);
    Ok(())
}

pub fn run_delete(store_path: &str, filename: &str) -> AppResult<()> {
    let session = open_session(store_path, None)?;
    session.delete_file(&FileName(filename.to_string()))?;
    println!("deleted {}", filename);
    Ok(())
}
