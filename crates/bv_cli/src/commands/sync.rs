use crate::commands::grant::open_session;
use bv_core::app_error::AppResult;
use bv_core::session::SessionMode;

pub fn run_sync(store_path: &str, root: Option<&str>, now_ms: i64) -> AppResult<()> {
    let mut session = open_session(store_path, root)?;
    if root.is_none() && session.mode() == SessionMode::Fallback {
        println!("no storage root granted; nothing to reconcile");
        return Ok(());
    }
    let outcome = session.request_access(now_ms)?;
    println!(
        "{}",
        serde_json::to_string(&outcome).unwrap_or_else(|_| "{}".to_string())
    );
    Ok(())
}
