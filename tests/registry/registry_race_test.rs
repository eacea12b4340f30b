//! Registry idempotency under concurrent creation.

use std::collections::BTreeSet;
use std::sync::Arc;

use vantage::catalog::{ColumnCategory, ColumnSpec, LogTypeCatalog, OwnerKind};
use vantage::registry::{CacheRegistry, SqliteRegistry};
use vantage::sql::DataType;

fn log_type() -> LogTypeCatalog {
    LogTypeCatalog::new("impressions", "Impressions", "raw_impressions", OwnerKind::Advertiser)
        .column(ColumnSpec::new("camp_code", ColumnCategory::Text).storage(DataType::Text))
        .column(
            ColumnSpec::new("clicks", ColumnCategory::Numeric)
                .storage(DataType::BigInt)
                .aggregate(),
        )
}

fn columns() -> BTreeSet<String> {
    ["camp_code".to_string(), "clicks".to_string()].into()
}

#[tokio::test]
async fn test_concurrent_lookup_or_create_converges_on_one_id() {
    let registry = Arc::new(SqliteRegistry::open_in_memory().unwrap());
    let log = Arc::new(log_type());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        let log = log.clone();
        handles.push(tokio::spawn(async move {
            registry
                .lookup_or_create(&log, 7, &columns(), "SELECT 1")
                .await
                .unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }

    let first = ids[0];
    assert!(ids.iter().all(|id| *id == first));

    // The winner's record is the one every lookup finds afterwards
    let found = registry.lookup("impressions", 7, &columns()).await.unwrap();
    assert_eq!(found, Some(first));
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let log = log_type();

    let id = {
        let registry = SqliteRegistry::open(&path).unwrap();
        registry
            .lookup_or_create(&log, 7, &columns(), "SELECT 1")
            .await
            .unwrap()
    };

    let reopened = SqliteRegistry::open(&path).unwrap();
    let found = reopened.lookup("impressions", 7, &columns()).await.unwrap();
    assert_eq!(found, Some(id));
    assert_eq!(
        reopened.extraction_sql(id).await.unwrap().as_deref(),
        Some("SELECT 1")
    );
}

#[tokio::test]
async fn test_request_order_does_not_change_identity() {
    let registry = SqliteRegistry::open_in_memory().unwrap();
    let log = log_type();

    let forward: BTreeSet<String> = ["camp_code".to_string(), "clicks".to_string()].into();
    let reversed: BTreeSet<String> = ["clicks".to_string(), "camp_code".to_string()].into();

    let a = registry
        .lookup_or_create(&log, 7, &forward, "SELECT 1")
        .await
        .unwrap();
    let b = registry
        .lookup_or_create(&log, 7, &reversed, "SELECT 1")
        .await
        .unwrap();
    assert_eq!(a, b);
}
