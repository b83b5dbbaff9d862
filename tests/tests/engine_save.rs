//! Engine write paths: capability stamping, inserts with key write-back,
//! dirty-field updates, and deletes.

use pretty_assertions::assert_eq;
use quarry::stmt::Value;
use quarry::{Record, Response};
use tests::*;

#[tokio::test]
async fn insert_writes_every_field_and_assigns_the_key() {
    let conn = MockConnection::new().respond(Response::count(1).with_last_insert_id(Some(42)));
    let (mut db, log) = mock_db(conn);

    let mut record = Record::new(User::create("jo@example.com"));
    db.save(&mut record).await.unwrap();

    let statement = log.last();
    // The null key is left to storage to assign.
    assert_eq!(
        statement.sql,
        "INSERT INTO `users` (`email`, `active`) VALUES (?, ?)"
    );
    assert_eq!(
        statement.bindings,
        vec![Value::String("jo@example.com".to_string()), Value::I64(1)]
    );

    assert_eq!(record.id, Some(42));
    assert!(record.is_persisted());
    assert!(!record.is_dirty().unwrap());
}

#[tokio::test]
async fn insert_stamps_capability_columns() {
    let conn = MockConnection::new().respond(Response::count(1).with_last_insert_id(Some(5)));
    let (mut db, log) = mock_db(conn);

    let mut record = Record::new(Article::create("Intro"));
    db.save(&mut record).await.unwrap();

    let statement = log.last();
    assert_eq!(
        statement.sql,
        "INSERT INTO `articles` (`title`, `body`, `created_at`, `updated_at`, \
         `external_id`, `version`) VALUES (?, ?, ?, ?, ?, ?)"
    );
    assert_eq!(
        statement.bindings[0],
        Value::String("Intro".to_string())
    );
    // The version counter starts at 1.
    assert_eq!(statement.bindings[5], Value::I64(1));

    assert_eq!(record.id, Some(5));
    assert!(record.created_at.is_some());
    assert!(record.updated_at.is_some());
    assert_eq!(record.external_id.as_deref().map(str::len), Some(36));
    assert_eq!(record.version, Some(1));
}

#[tokio::test]
async fn preset_capability_values_are_kept() {
    let conn = MockConnection::new().respond(Response::count(1).with_last_insert_id(Some(5)));
    let (mut db, _log) = mock_db(conn);

    let mut article = Article::create("Intro");
    article.external_id = Some("import-7".to_string());
    let mut record = Record::new(article);
    db.save(&mut record).await.unwrap();

    assert_eq!(record.external_id.as_deref(), Some("import-7"));
}

#[tokio::test]
async fn preset_keys_are_not_overwritten() {
    let conn = MockConnection::new().respond(Response::count(1).with_last_insert_id(Some(99)));
    let (mut db, log) = mock_db(conn);

    let mut user = User::create("jo@example.com");
    user.id = Some(10);
    let mut record = Record::new(user);
    db.save(&mut record).await.unwrap();

    assert_eq!(
        log.last().sql,
        "INSERT INTO `users` (`users_id`, `email`, `active`) VALUES (?, ?, ?)"
    );
    // The connection's LAST_INSERT_ID is stale here and must not apply.
    assert_eq!(record.id, Some(10));
}

#[tokio::test]
async fn clean_save_is_a_noop() {
    let conn = MockConnection::new();
    let (mut db, log) = mock_db(conn);

    let mut record: Record<User> = Record::hydrate(&user_row(7, "jo@example.com")).unwrap();
    db.save(&mut record).await.unwrap();

    assert!(log.is_empty());
}

#[tokio::test]
async fn clean_save_leaves_timestamps_alone() {
    let conn = MockConnection::new();
    let (mut db, log) = mock_db(conn);

    let mut record: Record<Article> = Record::hydrate(&article_row(3, "Intro", 1)).unwrap();
    let loaded_at = record.updated_at;
    db.save(&mut record).await.unwrap();

    assert!(log.is_empty());
    assert_eq!(record.updated_at, loaded_at);
}

#[tokio::test]
async fn update_writes_only_dirty_columns() {
    let conn = MockConnection::new().respond(Response::count(1));
    let (mut db, log) = mock_db(conn);

    let mut record: Record<User> = Record::hydrate(&user_row(7, "jo@example.com")).unwrap();
    record.email = "new@example.com".to_string();
    db.save(&mut record).await.unwrap();

    let statement = log.last();
    assert_eq!(
        statement.sql,
        "UPDATE `users` SET `email` = ? WHERE `users_id` = ?"
    );
    assert_eq!(
        statement.bindings,
        vec![Value::String("new@example.com".to_string()), Value::I64(7)]
    );
    assert!(!record.is_dirty().unwrap());
}

#[tokio::test]
async fn key_and_version_edits_do_not_count_as_dirt() {
    let conn = MockConnection::new();
    let (mut db, log) = mock_db(conn);

    let mut record: Record<Article> = Record::hydrate(&article_row(3, "Intro", 1)).unwrap();
    record.version = Some(9);
    db.save(&mut record).await.unwrap();

    // The engine owns the version counter, so this save had nothing to do.
    assert!(log.is_empty());
}

#[tokio::test]
async fn delete_removes_the_row_and_unpersists() {
    let conn = MockConnection::new().respond(Response::count(1));
    let (mut db, log) = mock_db(conn);

    let mut record: Record<User> = Record::hydrate(&user_row(7, "jo@example.com")).unwrap();
    db.delete(&mut record).await.unwrap();

    let statement = log.last();
    assert_eq!(statement.sql, "DELETE FROM `users` WHERE `users_id` = ?");
    assert_eq!(statement.bindings, vec![Value::I64(7)]);
    assert!(!record.is_persisted());
}

#[tokio::test]
async fn delete_rejects_unpersisted_records() {
    let conn = MockConnection::new();
    let (mut db, log) = mock_db(conn);

    let mut record = Record::new(User::create("jo@example.com"));
    let err = db.delete(&mut record).await.unwrap_err();

    assert!(err.is_not_persisted());
    assert!(log.is_empty());
}

#[tokio::test]
async fn transactions_frame_the_connection() {
    let conn = MockConnection::new().respond(Response::count(1).with_last_insert_id(Some(1)));
    let (mut db, log) = mock_db(conn);

    db.begin().await.unwrap();
    let mut record = Record::new(User::create("jo@example.com"));
    db.save(&mut record).await.unwrap();
    db.commit().await.unwrap();

    let sqls: Vec<String> = log.all().into_iter().map(|s| s.sql).collect();
    assert_eq!(sqls[0], "START TRANSACTION");
    assert!(sqls[1].starts_with("INSERT INTO `users`"));
    assert_eq!(sqls[2], "COMMIT");
}

#[tokio::test]
async fn rollback_reaches_the_connection() {
    let conn = MockConnection::new();
    let (mut db, log) = mock_db(conn);

    db.begin().await.unwrap();
    db.rollback().await.unwrap();

    let sqls: Vec<String> = log.all().into_iter().map(|s| s.sql).collect();
    assert_eq!(sqls, ["START TRANSACTION", "ROLLBACK"]);
}
