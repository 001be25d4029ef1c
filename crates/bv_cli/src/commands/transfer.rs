use crate::commands::grant::open_session;
use bv_core::app_error::{AppError, AppResult};
use bv_core::transfer::{ImportFailure, PickedFile};
use bv_core::types::FileName;
use std::fs;
use std::path::Path;

pub fn run_import(store_path: &str, file_paths: &[String], now_ms: i64) -> AppResult<()> {
    let mut picked = Vec::new();
    let mut read_failures = Vec::new();

    for file_path in file_paths {
        let path = Path::new(file_path);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file_path)
            .to_string();
        match fs::read_to_string(path) {
            Ok(content) => picked.push(PickedFile { name, content }),
            Err(e) => read_failures.push(ImportFailure {
                filename: name,
                error: AppError::new(
                    "BV_IMPORT_READ_FAILED",
                    "ingest",
                    "failed reading picked file",
                    false,
                    serde_json::json!({ "error": e.to_string(), "path": file_path }),
                ),
            }),
        }
    }

    let session = open_session(store_path, None)?;
    let mut report = session.import_from_picker(&picked, now_ms);
    report.failed.extend(read_failures);

    println!(
        "{}",
        serde_json::to_string(&report).unwrap_or_else(|_| "{}".to_string())
    );
    Ok(())
}

pub fn run_export(store_path: &str, filename: &str, dest_dir: &str) -> AppResult<()> {
    let session = open_session(store_path, None)?;
    let dest = session.export_to_download(&FileName(filename.to_string()), Path::new(dest_dir))?;
    println!("exported {}", dest.display());
    Ok(())
}
