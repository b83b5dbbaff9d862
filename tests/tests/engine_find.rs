//! Engine read paths: primary key lookups, the identity cache, and the
//! query execution helpers.

use pretty_assertions::assert_eq;
use quarry::stmt::{Row, Value};
use quarry::{Assignments, Db, MemoryCache, Query, Response};
use tests::*;

#[tokio::test]
async fn find_fetches_and_hydrates_one_row() {
    let conn = MockConnection::new().respond(Response::values(vec![user_row(7, "jo@example.com")]));
    let (mut db, log) = mock_db(conn);

    let record = db.find::<User>(7i64).await.unwrap().unwrap();
    assert_eq!(record.id, Some(7));
    assert_eq!(record.email, "jo@example.com");
    assert!(record.active);
    assert!(record.is_persisted());

    let statement = log.last();
    assert_eq!(
        statement.sql,
        "SELECT * FROM `users` WHERE `users_id` = ? LIMIT 1"
    );
    assert_eq!(statement.bindings, vec![Value::I64(7)]);
}

#[tokio::test]
async fn find_returns_none_when_no_row_matches() {
    let conn = MockConnection::new().respond(Response::values(vec![]));
    let (mut db, _log) = mock_db(conn);

    let record = db.find::<User>(9i64).await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn find_or_fail_reports_the_missing_key() {
    let conn = MockConnection::new().respond(Response::values(vec![]));
    let (mut db, _log) = mock_db(conn);

    let err = db.find_or_fail::<User>(9i64).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "entity not found: users key=9");
}

#[tokio::test]
async fn identity_cache_serves_repeat_lookups() {
    let conn = MockConnection::new().respond(Response::values(vec![user_row(7, "jo@example.com")]));
    let log = conn.log();
    let mut db = Db::builder().identity_cache(MemoryCache::new()).build(conn);

    let first = db.find::<User>(7i64).await.unwrap().unwrap();
    let second = db.find::<User>(7i64).await.unwrap().unwrap();

    assert_eq!(*first, *second);
    // One fetch; the second lookup never reached the connection.
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn find_many_preserves_caller_order() {
    // Storage returns rows in its own order; records come back in id order.
    let conn = MockConnection::new().respond(Response::values(vec![
        user_row(1, "a@example.com"),
        user_row(2, "b@example.com"),
        user_row(3, "c@example.com"),
    ]));
    let (mut db, log) = mock_db(conn);

    let records = db.find_many::<User>([3i64, 1, 2]).await.unwrap();
    let emails: Vec<&str> = records.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, ["c@example.com", "a@example.com", "b@example.com"]);

    let statement = log.last();
    assert_eq!(
        statement.sql,
        "SELECT * FROM `users` WHERE `users_id` IN (?, ?, ?)"
    );
    assert_eq!(
        statement.bindings,
        vec![Value::I64(3), Value::I64(1), Value::I64(2)]
    );
}

#[tokio::test]
async fn find_many_dedupes_ids_and_skips_missing_rows() {
    let conn = MockConnection::new().respond(Response::values(vec![user_row(1, "a@example.com")]));
    let (mut db, log) = mock_db(conn);

    let records = db.find_many::<User>([1i64, 99, 1]).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, Some(1));

    // The repeated id binds once; the missing id still gets asked for.
    assert_eq!(log.last().bindings, vec![Value::I64(1), Value::I64(99)]);
}

#[tokio::test]
async fn find_many_pools_cache_hits_with_one_fetch() {
    let conn = MockConnection::new()
        .respond(Response::values(vec![user_row(1, "a@example.com")]))
        .respond(Response::values(vec![user_row(2, "b@example.com")]));
    let log = conn.log();
    let mut db = Db::builder().identity_cache(MemoryCache::new()).build(conn);

    // Prime the cache with id 1.
    db.find::<User>(1i64).await.unwrap().unwrap();

    let records = db.find_many::<User>([1i64, 2]).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, Some(1));
    assert_eq!(records[1].id, Some(2));

    // The second statement only asked for the uncached id.
    assert_eq!(log.len(), 2);
    assert_eq!(
        log.last().sql,
        "SELECT * FROM `users` WHERE `users_id` IN (?)"
    );
    assert_eq!(log.last().bindings, vec![Value::I64(2)]);
}

#[tokio::test]
async fn all_hydrates_every_row() {
    let conn = MockConnection::new().respond(Response::values(vec![
        user_row(1, "a@example.com"),
        user_row(2, "b@example.com"),
    ]));
    let (mut db, log) = mock_db(conn);

    let query = Query::table("users").where_eq("active", true);
    let records = db.all::<User>(&query).await.unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(
        log.last().sql,
        "SELECT * FROM `users` WHERE `active` = ?"
    );
}

#[tokio::test]
async fn first_appends_limit_one() {
    let conn = MockConnection::new().respond(Response::values(vec![user_row(1, "a@example.com")]));
    let (mut db, log) = mock_db(conn);

    let query = Query::table("users").where_eq("active", true);
    let record = db.first::<User>(&query).await.unwrap().unwrap();
    assert_eq!(record.id, Some(1));

    assert_eq!(
        log.last().sql,
        "SELECT * FROM `users` WHERE `active` = ? LIMIT 1"
    );
}

#[tokio::test]
async fn count_reads_the_aggregate_column() {
    let mut row = Row::new();
    row.insert("aggregate", 3i64);
    let conn = MockConnection::new().respond(Response::values(vec![row]));
    let (mut db, log) = mock_db(conn);

    let query = Query::table("users").where_eq("active", true);
    assert_eq!(db.count(&query).await.unwrap(), 3);

    assert_eq!(
        log.last().sql,
        "SELECT COUNT(*) AS aggregate FROM `users` WHERE `active` = ?"
    );
}

#[tokio::test]
async fn exists_reads_the_probe_column() {
    let mut found = Row::new();
    found.insert("does_exist", 1i64);
    let mut not_found = Row::new();
    not_found.insert("does_exist", 0i64);

    let conn = MockConnection::new()
        .respond(Response::values(vec![found]))
        .respond(Response::values(vec![not_found]));
    let (mut db, log) = mock_db(conn);

    let query = Query::table("users").where_eq("active", true);
    assert!(db.exists(&query).await.unwrap());
    assert!(!db.exists(&query).await.unwrap());

    assert_eq!(
        log.last().sql,
        "SELECT EXISTS(SELECT * FROM `users` WHERE `active` = ?) AS does_exist"
    );
}

#[tokio::test]
async fn bulk_updates_and_deletes_report_affected_rows() {
    let conn = MockConnection::new()
        .respond(Response::count(4))
        .respond(Response::count(2));
    let (mut db, log) = mock_db(conn);

    let mut assignments = Assignments::new();
    assignments.set("active", false);
    let query = Query::table("users").where_op("age", "<", 18i64);

    assert_eq!(db.update_where(&query, &assignments).await.unwrap(), 4);
    assert_eq!(db.delete_where(&query).await.unwrap(), 2);

    assert_eq!(
        log.statement(0).sql,
        "UPDATE `users` SET `active` = ? WHERE `age` < ?"
    );
    assert_eq!(
        log.statement(1).sql,
        "DELETE FROM `users` WHERE `age` < ?"
    );
    assert_eq!(
        log.statement(0).bindings,
        vec![Value::Bool(false), Value::I64(18)]
    );
}

#[tokio::test]
async fn query_log_observes_each_statement() {
    use quarry::QueryLog;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingLog {
        entries: Arc<Mutex<Vec<String>>>,
    }

    impl QueryLog for RecordingLog {
        fn record(&self, sql: &str, _bindings: &[Value], _elapsed: Duration) {
            self.entries.lock().unwrap().push(sql.to_string());
        }
    }

    let recording = RecordingLog::default();
    let entries = recording.entries.clone();

    let conn = MockConnection::new().respond(Response::values(vec![user_row(7, "jo@example.com")]));
    let mut db = Db::builder().query_log(recording).build(conn);
    db.find::<User>(7i64).await.unwrap().unwrap();

    let recorded = entries.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0],
        "SELECT * FROM `users` WHERE `users_id` = ? LIMIT 1"
    );
}

#[tokio::test]
async fn clear_cache_forces_a_refetch() {
    let conn = MockConnection::new()
        .respond(Response::values(vec![user_row(7, "old@example.com")]))
        .respond(Response::values(vec![user_row(7, "new@example.com")]));
    let log = conn.log();
    let mut db = Db::builder().identity_cache(MemoryCache::new()).build(conn);

    db.find::<User>(7i64).await.unwrap().unwrap();
    db.clear_cache(Some("users"));
    let record = db.find::<User>(7i64).await.unwrap().unwrap();

    assert_eq!(record.email, "new@example.com");
    assert_eq!(log.len(), 2);
}
