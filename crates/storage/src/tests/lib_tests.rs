use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn set_get_and_overwrite() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    assert_eq!(storage.get("lg_currentSize").await.expect("get"), None);
    storage.set("lg_currentSize", "56-75").await.expect("set");
    storage.set("lg_currentSize", "over-75").await.expect("overwrite");

    assert_eq!(
        storage.get("lg_currentSize").await.expect("get"),
        Some("over-75".to_string())
    );
    assert_eq!(storage.keys().await.expect("keys"), vec!["lg_currentSize"]);
}

#[tokio::test]
async fn remove_is_idempotent() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.set("lg_editingIndex", "0").await.expect("set");

    storage.remove("lg_editingIndex").await.expect("remove");
    storage.remove("lg_editingIndex").await.expect("remove again");

    assert_eq!(storage.get("lg_editingIndex").await.expect("get"), None);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("temp dir");
    let db_path = temp_root.path().join("nested").join("quote.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.set("lg_quoteItems", "[]").await.expect("set");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(
        reopened.get("lg_quoteItems").await.expect("get"),
        Some("[]".to_string())
    );
}

#[test]
fn sqlite_path_handles_url_forms() {
    assert_eq!(sqlite_path("sqlite::memory:"), None);
    assert_eq!(sqlite_path("postgres://db"), None);
    assert_eq!(sqlite_path("sqlite://"), None);
    assert_eq!(
        sqlite_path("sqlite://data/quote.db?mode=rwc"),
        Some(PathBuf::from("data/quote.db"))
    );
    assert_eq!(
        sqlite_path("sqlite:quote.db"),
        Some(PathBuf::from("quote.db"))
    );
}
