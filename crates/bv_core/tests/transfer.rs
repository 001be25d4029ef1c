use bv_core::cache_store::CacheStore;
use bv_core::transfer::{export_bytes, export_to_download, import_from_picker, PickedFile};
use bv_core::types::{FileName, RecordOrigin};
use std::fs;

fn name(s: &str) -> FileName {
    FileName(s.to_string())
}

#[test]
fn import_then_export_is_byte_exact() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cache = CacheStore::open(&temp.path().join("db/cache.sqlite")).expect("open cache");

    let picked = vec![PickedFile {
        name: "a.csv".to_string(),
        content: "x,y\n1,2".to_string(),
    }];
    let report = import_from_picker(&cache, &picked, 100);
    assert_eq!(report.imported, vec!["a.csv"]);
    assert!(report.failed.is_empty());

    assert_eq!(export_bytes(&cache, &name("a.csv")).expect("export"), "x,y\n1,2");

    let downloads = temp.path().join("downloads");
    let dest = export_to_download(&cache, &name("a.csv"), &downloads).expect("download");
    assert_eq!(fs::read(&dest).expect("read download"), b"x,y\n1,2");
}

#[test]
fn imported_records_are_cache_only() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cache = CacheStore::open(&temp.path().join("db/cache.sqlite")).expect("open cache");

    import_from_picker(
        &cache,
        &[PickedFile {
            name: "a.csv".to_string(),
            content: "data".to_string(),
        }],
        100,
    );

    let record = cache
        .get(&name("a.csv"))
        .expect("get")
        .expect("record present");
    assert_eq!(record.origin, RecordOrigin::CacheOnly);
}

#[test]
fn export_of_missing_record_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cache = CacheStore::open(&temp.path().join("db/cache.sqlite")).expect("open cache");

    let err = export_to_download(&cache, &name("absent.csv"), &temp.path().join("downloads"))
        .expect_err("export should fail");
    assert!(err.is_not_found());
    assert_eq!(err.code, "BV_RECORD_NOT_FOUND");
}
