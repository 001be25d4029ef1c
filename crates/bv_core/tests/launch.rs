use bv_core::cache_store::CacheStore;
use bv_core::config::FilterConfig;
use bv_core::launch::LaunchIngestor;
use bv_core::mirror::DirectoryMirror;
use bv_core::types::{FileName, RecordOrigin};
use std::fs;
use std::path::PathBuf;

fn name(s: &str) -> FileName {
    FileName(s.to_string())
}

#[test]
fn one_bad_item_does_not_abort_the_batch() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cache = CacheStore::open(&temp.path().join("db/cache.sqlite")).expect("open cache");

    let a = temp.path().join("a.csv");
    let b = temp.path().join("b.csv"); // never written
    let c = temp.path().join("c.csv");
    fs::write(&a, "a-data").expect("write a");
    fs::write(&c, "c-data").expect("write c");

    let report = LaunchIngestor::new(&cache).ingest(&[a, b, c], 100);

    assert_eq!(report.ingested, vec!["a.csv", "c.csv"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].filename, "b.csv");
    assert_eq!(report.failed[0].error.code, "BV_LAUNCH_READ_FAILED");

    assert!(cache.get(&name("a.csv")).expect("get a").is_some());
    assert!(cache.get(&name("b.csv")).expect("get b").is_none());
    assert!(cache.get(&name("c.csv")).expect("get c").is_some());
}

#[test]
fn launch_ingest_works_against_cache_alone() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cache = CacheStore::open(&temp.path().join("db/cache.sqlite")).expect("open cache");

    let file = temp.path().join("budget.csv");
    fs::write(&file, "x,y\n1,2").expect("write file");

    let report = LaunchIngestor::new(&cache).ingest(&[file], 100);
    assert_eq!(report.ingested, vec!["budget.csv"]);

    let record = cache
        .get(&name("budget.csv"))
        .expect("get")
        .expect("record present");
    assert_eq!(record.content, "x,y\n1,2");
    assert_eq!(record.origin, RecordOrigin::CacheOnly);
}

#[test]
fn launch_ingest_mirrors_when_grant_is_active() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("granted");
    fs::create_dir_all(&root).expect("create root");
    let cache = CacheStore::open(&temp.path().join("db/cache.sqlite")).expect("open cache");
    let mirror = DirectoryMirror::new(FilterConfig::default());

    let file = temp.path().join("budget.csv");
    fs::write(&file, "x,y\n1,2").expect("write file");

    let report = LaunchIngestor::with_mirror(&cache, &mirror, &root).ingest(&[file], 100);
    assert_eq!(report.ingested, vec!["budget.csv"]);

    assert_eq!(
        fs::read_to_string(root.join("budget.csv")).expect("read mirrored file"),
        "x,y\n1,2"
    );
    let record = cache
        .get(&name("budget.csv"))
        .expect("get")
        .expect("record present");
    assert_eq!(record.origin, RecordOrigin::DirectoryBacked);
}

#[test]
fn mirror_failure_downgrades_item_to_cache_only() {
    let temp = tempfile::tempdir().expect("tempdir");
    let gone: PathBuf = temp.path().join("revoked-root");
    let cache = CacheStore::open(&temp.path().join("db/cache.sqlite")).expect("open cache");
    let mirror = DirectoryMirror::new(FilterConfig::default());

    let file = temp.path().join("budget.csv");
    fs::write(&file, "x,y\n1,2").expect("write file");

    let report = LaunchIngestor::with_mirror(&cache, &mirror, &gone).ingest(&[file], 100);
    assert_eq!(report.ingested, vec!["budget.csv"]);
    assert!(report.failed.is_empty());

    let record = cache
        .get(&name("budget.csv"))
        .expect("get")
        .expect("record present");
    assert_eq!(record.origin, RecordOrigin::CacheOnly);
}
