use bv_core::app_error::AppResult;
use bv_core::grant::DirProbePrompt;
use bv_core::session::Session;
use std::path::{Path, PathBuf};

pub fn open_session(store_path: &str, root: Option<&str>) -> AppResult<Session> {
    let prompt = match root {
        Some(candidate) => DirProbePrompt::granting(PathBuf::from(candidate)),
        None => DirProbePrompt::dismissed(),
    };
    Session::open(Path::new(store_path), Box::new(prompt))
}

pub fn run_request(store_path: &str, root: Option<&str>, now_ms: i64) -> AppResult<()> {
    let mut session = open_session(store_path, root)?;
    let outcome = session.request_access(now_ms)?;
    println!(
        "{}",
        serde_json::to_string(&outcome).unwrap_or_else(|_| "{}".to_string())
    );
    Ok(())
}

pub fn run_status(store_path: &str) -> AppResult<()> {
    let session = open_session(store_path, None)?;
    let status = serde_json::json!({
        "grant": session.grant(),
        "mode": session.mode(),
    });
    println!(
        "{}",
        serde_json::to_string(&status).unwrap_or_else(|_| "{}".to_string())
    );
    Ok(())
}
