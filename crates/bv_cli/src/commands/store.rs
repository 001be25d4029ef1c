use bv_core::app_error::AppResult;
use bv_core::cache_store::CacheStore;
use bv_core::config::{store_init, store_open, store_paths};
use std::path::Path;

pub fn run_init(store_path: &str, store_slug: &str, now_ms: i64) -> AppResult<()> {
    let store = store_init(Path::new(store_path), store_slug, now_ms)?;
    // Materialize the cache db so the store is usable immediately.
    CacheStore::open(&store_paths(Path::new(store_path)).db)?;
    println!("store initialized: {} ({})", store.store_slug, store.store_id);
    Ok(())
}

pub fn run_status(store_path: &str) -> AppResult<()> {
    let store = store_open(Path::new(store_path))?;
    let cache = CacheStore::open(&Path::new(store_path).join(&store.db.relative_path))?;
    let status = serde_json::json!({
        "store_id": store.store_id,
        "store_slug": store.store_slug,
        "records": cache.len()?,
        "filter": store.filter,
        "last_root": store.last_root,
    });
    println!(
        "{}",
        serde_json::to_string(&status).unwrap_or_else(|_| "{}".to_string())
    );
    Ok(())
}
