//! Optimistic locking: the version clause on updates, the counter bump on
//! success, and the conflict error when the clause matches nothing.

use pretty_assertions::assert_eq;
use quarry::stmt::Value;
use quarry::{Record, Response};
use tests::*;

#[tokio::test]
async fn versioned_updates_guard_on_the_loaded_version() {
    let conn = MockConnection::new().respond(Response::count(1));
    let (mut db, log) = mock_db(conn);

    let mut record: Record<Article> = Record::hydrate(&article_row(3, "Intro", 1)).unwrap();
    record.title = "Updated".to_string();
    db.save(&mut record).await.unwrap();

    let statement = log.last();
    assert_eq!(
        statement.sql,
        "UPDATE `articles` SET `title` = ?, `updated_at` = ?, \
         `version` = `version` + 1 WHERE `articles_id` = ? AND `version` = ?"
    );
    assert_eq!(statement.bindings.len(), 4);
    assert_eq!(statement.bindings[0], Value::String("Updated".to_string()));
    assert_eq!(statement.bindings[2], Value::I64(3));
    assert_eq!(statement.bindings[3], Value::I64(1));
}

#[tokio::test]
async fn matching_update_bumps_the_version() {
    let conn = MockConnection::new().respond(Response::count(1));
    let (mut db, _log) = mock_db(conn);

    let mut record: Record<Article> = Record::hydrate(&article_row(3, "Intro", 1)).unwrap();
    let loaded_at = record.updated_at;
    record.title = "Updated".to_string();
    db.save(&mut record).await.unwrap();

    assert_eq!(record.version, Some(2));
    assert_ne!(record.updated_at, loaded_at);
    assert!(!record.is_dirty().unwrap());
}

#[tokio::test]
async fn bumped_version_guards_the_next_update() {
    let conn = MockConnection::new()
        .respond(Response::count(1))
        .respond(Response::count(1));
    let (mut db, log) = mock_db(conn);

    let mut record: Record<Article> = Record::hydrate(&article_row(3, "Intro", 1)).unwrap();
    record.title = "First".to_string();
    db.save(&mut record).await.unwrap();
    record.title = "Second".to_string();
    db.save(&mut record).await.unwrap();

    // The second statement guards on the version the first one produced.
    let statement = log.last();
    assert_eq!(statement.bindings[3], Value::I64(2));
    assert_eq!(record.version, Some(3));
}

#[tokio::test]
async fn stale_version_is_a_lock_conflict() {
    // Drivers report matched rows, so zero means the version clause
    // excluded the row rather than an identical write.
    let conn = MockConnection::new().respond(Response::count(0));
    let (mut db, _log) = mock_db(conn);

    let mut record: Record<Article> = Record::hydrate(&article_row(3, "Intro", 1)).unwrap();
    record.title = "Updated".to_string();
    let err = db.save(&mut record).await.unwrap_err();

    assert!(err.is_lock_conflict());
    assert_eq!(
        err.to_string(),
        "optimistic lock conflict: articles key=3 expected version 1"
    );
    // The counter stays at the loaded version; the write did not happen.
    assert_eq!(record.version, Some(1));
}

#[tokio::test]
async fn unversioned_updates_tolerate_zero_affected_rows() {
    let conn = MockConnection::new().respond(Response::count(0));
    let (mut db, log) = mock_db(conn);

    let mut record: Record<User> = Record::hydrate(&user_row(7, "jo@example.com")).unwrap();
    record.email = "new@example.com".to_string();
    db.save(&mut record).await.unwrap();

    assert!(!log.last().sql.contains("`version`"));
}
