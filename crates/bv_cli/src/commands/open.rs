use crate::commands::grant::open_session;
use bv_core::app_error::AppResult;
use std::path::PathBuf;

pub fn run_open(store_path: &str, file_paths: &[String], now_ms: i64) -> AppResult<()> {
    let session = open_session(store_path, None)?;
    let paths: Vec<PathBuf> = file_paths.iter().map(PathBuf::from).collect();
    let report = session.open_with(&paths, now_ms);
    println!(
        "{}",
        serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string())
    );
    Ok(())
}
