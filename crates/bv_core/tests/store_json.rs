use bv_core::config::{store_init, store_open, FilterConfig};

#[test]
fn init_then_open_round_trips() {
    let temp = tempfile::tempdir().expect("tempdir");
    let created = store_init(temp.path(), "household", 42).expect("store init");
    let opened = store_open(temp.path()).expect("store open");

    assert_eq!(opened.store_id, created.store_id);
    assert_eq!(opened.store_slug, "household");
    assert_eq!(opened.created_at_ms, 42);
    assert_eq!(opened.filter.extensions, vec!["csv"]);
    assert!(opened.filter.case_insensitive);
    assert!(opened.last_root.is_none());
}

#[test]
fn missing_store_json_is_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = store_open(temp.path()).expect_err("open without init should fail");
    assert_eq!(err.code, "BV_STORE_JSON_MISSING");
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        temp.path().join("store.json"),
        r#"{ "schema_version": 99 }"#,
    )
    .expect("write store.json");

    let err = store_open(temp.path()).expect_err("unsupported version should fail");
    assert_eq!(err.code, "BV_STORE_JSON_UNSUPPORTED_VERSION");
}

#[test]
fn default_filter_matches_csv_case_insensitively() {
    let filter = FilterConfig::default();
    assert!(filter.matches("budget.csv"));
    assert!(filter.matches("BUDGET.CSV"));
    assert!(filter.matches("budget.csv  "));
    assert!(!filter.matches("notes.txt"));
    assert!(!filter.matches("readme"));
    assert!(!filter.matches(".csv"));
}

#[test]
fn case_sensitive_filter_rejects_uppercase_extension() {
    let filter = FilterConfig {
        extensions: vec!["csv".to_string()],
        case_insensitive: false,
    };
    assert!(filter.matches("budget.csv"));
    assert!(!filter.matches("BUDGET.CSV"));
}
