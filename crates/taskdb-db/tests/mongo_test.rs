//! Tests marked `#[ignore]` need a live server:
//! `MONGODB_URI=... cargo test -p taskdb-db -- --ignored`

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use taskdb_core::{Error, TaskFields, TaskFilter, TaskRepository};
use taskdb_db::{Database, DbConfig};
use tokio_test::{assert_err, assert_ok};

async fn repository(collection: &str) -> (TaskRepository, Database) {
    dotenv::dotenv().ok();

    let mut config = DbConfig::from_env().expect("MONGODB_URI must be set");
    config.database = "taskdb_test".to_string();
    config.collection = collection.to_string();

    let db = assert_ok!(Database::connect(&config).await);
    let repo = TaskRepository::new(Arc::new(db.tasks()));

    for task in assert_ok!(repo.list(&TaskFilter::new()).await) {
        assert_ok!(repo.delete(&task.id.to_string()).await);
    }

    (repo, db)
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_crud_round_trip() {
    let (repo, _db) = repository("crud_round_trip").await;

    let created = assert_ok!(
        repo.create(
            TaskFields::new()
                .with_title("Buy milk")
                .with_status("Pendiente")
                .with_field("qty", json!(2)),
        )
        .await
    );
    let id = created.id.to_string();

    let fetched = assert_ok!(repo.get_by_id(&id).await).unwrap();
    assert_eq!(fetched, created);

    let updated = assert_ok!(repo.update(&id, TaskFields::new().with_status("Done")).await).unwrap();
    assert_eq!(updated.status, "Done");
    assert_eq!(updated.title, "Buy milk");
    assert_eq!(updated.extra["qty"], json!(2));

    assert!(assert_ok!(repo.delete(&id).await));
    assert!(assert_ok!(repo.get_by_id(&id).await).is_none());
    assert!(!assert_ok!(repo.delete(&id).await));
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_listing_order_and_filters() {
    let (repo, _db) = repository("listing_order").await;

    assert_ok!(
        repo.create(TaskFields::new().with_title("Buy milk").with_status("Pendiente"))
            .await
    );
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    assert_ok!(
        repo.create(TaskFields::new().with_title("Pay rent").with_status("Done"))
            .await
    );

    let tasks = assert_ok!(repo.list(&TaskFilter::new()).await);
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy milk", "Pay rent"]);

    let rent = assert_ok!(repo.list(&TaskFilter::new().with_title("RENT")).await);
    assert_eq!(rent.len(), 1);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_filters_are_regular_expressions() {
    let (repo, _db) = repository("regex_filters").await;

    assert_ok!(repo.create(TaskFields::new().with_title("Buy milk")).await);
    assert_ok!(repo.create(TaskFields::new().with_title("Go buy bread")).await);

    let anchored = assert_ok!(repo.list(&TaskFilter::new().with_title("^buy")).await);
    let titles: Vec<&str> = anchored.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy milk"]);

    let err = assert_err!(repo.list(&TaskFilter::new().with_title("(buy")).await);
    assert!(matches!(err, Error::InvalidFilter(_)), "{}", err);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_created_at_field_is_replaced_on_create() {
    let (repo, _db) = repository("created_at_field").await;
    let before = Utc::now() - Duration::hours(6) - Duration::seconds(1);

    let created = assert_ok!(
        repo.create(
            TaskFields::new()
                .with_title("Buy milk")
                .with_field("createdAt", json!("2001-01-01T00:00:00Z")),
        )
        .await
    );
    let stamped = created.created_at.unwrap();
    assert!(stamped > before);
    assert!(!created.extra.contains_key("createdAt"));

    let fetched = assert_ok!(repo.get_by_id(&created.id.to_string()).await).unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_wrong_typed_status_is_never_written() {
    let (repo, _db) = repository("wrong_typed_status").await;

    let err = assert_err!(
        repo.create(TaskFields::new().with_title("x").with_field("status", json!(3)))
            .await
    );
    assert!(matches!(err, Error::InvalidField(_)), "{}", err);

    assert!(assert_ok!(repo.list(&TaskFilter::new()).await).is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_a_connection_error() {
    let mut config = DbConfig::new("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200");
    config.collection = "unreachable".to_string();

    let err = assert_err!(Database::connect(&config).await);
    assert!(matches!(err, taskdb_db::Error::Connection(_)));
}
