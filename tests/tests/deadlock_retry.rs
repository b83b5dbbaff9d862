//! Deadlock handling in the save path: retries with backoff for the one
//! retryable error class, immediate surfacing for everything else.

use pretty_assertions::assert_eq;
use quarry::{Db, Error, Record, Response, RetryPolicy};
use tests::*;

use std::time::Duration;

fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
    }
}

fn deadlock() -> Error {
    Error::deadlock(
        1213,
        "Deadlock found when trying to get lock; try restarting transaction",
    )
}

#[tokio::test]
async fn save_retries_through_transient_deadlocks() {
    let conn = MockConnection::new()
        .fail(deadlock())
        .fail(deadlock())
        .respond(Response::count(1));
    let log = conn.log();
    let mut db = Db::builder().retry(fast_retries()).build(conn);

    let mut record: Record<User> = Record::hydrate(&user_row(7, "jo@example.com")).unwrap();
    record.email = "new@example.com".to_string();
    db.save(&mut record).await.unwrap();

    assert_eq!(log.matching("UPDATE `users`"), 3);
    assert!(!record.is_dirty().unwrap());
}

#[tokio::test]
async fn inserts_retry_too() {
    let conn = MockConnection::new()
        .fail(deadlock())
        .respond(Response::count(1).with_last_insert_id(Some(42)));
    let log = conn.log();
    let mut db = Db::builder().retry(fast_retries()).build(conn);

    let mut record = Record::new(User::create("jo@example.com"));
    db.save(&mut record).await.unwrap();

    assert_eq!(log.matching("INSERT INTO `users`"), 2);
    assert_eq!(record.id, Some(42));
}

#[tokio::test]
async fn deadlocks_surface_after_the_last_attempt() {
    let conn = MockConnection::new()
        .fail(deadlock())
        .fail(deadlock())
        .fail(deadlock());
    let log = conn.log();
    let mut db = Db::builder().retry(fast_retries()).build(conn);

    let mut record: Record<User> = Record::hydrate(&user_row(7, "jo@example.com")).unwrap();
    record.email = "new@example.com".to_string();
    let err = db.save(&mut record).await.unwrap_err();

    assert!(err.is_deadlock());
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn other_error_classes_do_not_retry() {
    let conn = MockConnection::new().fail(Error::duplicate_key(
        "Duplicate entry 'jo@example.com' for key 'users.email'",
    ));
    let log = conn.log();
    let mut db = Db::builder().retry(fast_retries()).build(conn);

    let mut record = Record::new(User::create("jo@example.com"));
    let err = db.save(&mut record).await.unwrap_err();

    assert!(err.is_duplicate_key());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn reads_are_not_retried() {
    let conn = MockConnection::new().fail(deadlock());
    let log = conn.log();
    let mut db = Db::builder().retry(fast_retries()).build(conn);

    let err = db.find::<User>(7i64).await.unwrap_err();

    assert!(err.is_deadlock());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn a_single_attempt_policy_never_retries() {
    let conn = MockConnection::new().fail(deadlock());
    let log = conn.log();
    let mut db = Db::builder().retry(RetryPolicy::none()).build(conn);

    let mut record: Record<User> = Record::hydrate(&user_row(7, "jo@example.com")).unwrap();
    record.email = "new@example.com".to_string();
    let err = db.save(&mut record).await.unwrap_err();

    assert!(err.is_deadlock());
    assert_eq!(log.len(), 1);
}
