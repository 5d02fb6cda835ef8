//! Row lock statements and cross-checks.

mod common;

use common::{events, user_row, users, MockExecutor};
use strata_orm::{Executor, Lock, OrmError, Record, SqliteExecutor};
use strata_schema::{DialectKind, SqlValue, TableBuilder};

fn loaded() -> Record {
    Record::new(users(), Some(user_row(1, "a@b.c", None, 3))).unwrap()
}

#[tokio::test]
async fn test_mysql_lock_selects_for_update() {
    let db = MockExecutor::mysql();
    db.will_return(vec![user_row(1, "a@b.c", None, 3)]);

    let mut lock = Lock::new(&loaded()).unwrap();
    assert!(!lock.status());
    assert!(lock.obtain(&db, None).await.unwrap().status());

    let call = db.last();
    assert_eq!(call.sql, "SELECT `id` FROM `users` WHERE `id`=? FOR UPDATE");
    assert_eq!(call.params, vec![SqlValue::Int(1)]);
}

#[tokio::test]
async fn test_sqlite_lock_has_no_row_lock_suffix() {
    let db = MockExecutor::sqlite();
    db.will_return(vec![user_row(1, "a@b.c", None, 3)]);

    let mut lock = Lock::new(&loaded()).unwrap();
    lock.obtain(&db, None).await.unwrap();
    assert_eq!(
        db.last().sql,
        "SELECT \"id\" FROM \"users\" WHERE \"id\"=?"
    );
}

#[tokio::test]
async fn test_cross_check_coerces_fetched_value() {
    let db = MockExecutor::mysql();
    let mut row = user_row(1, "a@b.c", None, 3);
    row.insert("version".to_string(), SqlValue::Text("3".to_string()));
    db.will_return(vec![row]);

    let mut lock = Lock::new(&loaded()).unwrap();
    lock.obtain(&db, Some(("version", SqlValue::Int(3))))
        .await
        .unwrap();

    assert!(lock.status());
    assert_eq!(
        db.last().sql,
        "SELECT `id`, `version` FROM `users` WHERE `id`=? FOR UPDATE"
    );
}

#[tokio::test]
async fn test_cross_check_mismatch_fails() {
    let db = MockExecutor::mysql();
    db.will_return(vec![user_row(1, "a@b.c", None, 4)]);

    let mut lock = Lock::new(&loaded()).unwrap();
    let err = lock
        .obtain(&db, Some(("version", SqlValue::Int(3))))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Lock on \"users\": cross-checking \"version\" failed"
    );
    assert!(!lock.status());
}

#[tokio::test]
async fn test_cross_check_column_must_exist() {
    let db = MockExecutor::mysql();
    let mut lock = Lock::new(&loaded()).unwrap();
    let err = lock
        .obtain(&db, Some(("revision", SqlValue::Int(1))))
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::Lock { .. }));
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn test_cross_check_value_is_validated() {
    let db = MockExecutor::mysql();
    let mut lock = Lock::new(&loaded()).unwrap();
    let err = lock
        .obtain(&db, Some(("version", SqlValue::Text("three".to_string()))))
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::BadValue { ref property, .. } if property == "version"));
}

#[tokio::test]
async fn test_missing_row_fails() {
    let db = MockExecutor::mysql();
    let mut lock = Lock::new(&loaded()).unwrap();
    assert!(matches!(
        lock.obtain(&db, None).await,
        Err(OrmError::Lock { .. })
    ));
    assert!(!lock.status());
}

#[test]
fn test_lock_needs_identity_column() {
    let row = [
        ("kind".to_string(), SqlValue::Text("login".to_string())),
        ("payload".to_string(), SqlValue::Null),
    ]
    .into_iter()
    .collect();
    let event: Record = Record::new(events(), Some(row)).unwrap();
    assert!(matches!(Lock::new(&event), Err(OrmError::Lock { .. })));
}

#[test]
fn test_lock_needs_identity_value() {
    let fresh: Record = Record::new(users(), None).unwrap();
    assert!(matches!(Lock::new(&fresh), Err(OrmError::BadValue { .. })));
}

#[tokio::test]
async fn test_sqlite_lock_on_stored_row() {
    let db = SqliteExecutor::connect(":memory:", 1)
        .await
        .expect("Failed to create in-memory SQLite pool");
    let ddl = TableBuilder::new(&users())
        .dialect(DialectKind::Sqlite)
        .compile()
        .unwrap();
    db.execute(&ddl, &[]).await.unwrap();

    let mut user: Record = Record::new(users(), None).unwrap();
    user.set("email", "ada@example.com").unwrap();
    user.query(&db).unwrap().insert().await.unwrap();

    let mut lock = Lock::new(&user).unwrap();
    assert!(lock
        .obtain(&db, Some(("version", SqlValue::Int(1))))
        .await
        .unwrap()
        .status());
    assert!(lock
        .obtain(&db, Some(("version", SqlValue::Int(2))))
        .await
        .is_err());
    assert!(!lock.status());

    user.query(&db).unwrap().delete().await.unwrap();
    assert!(lock.obtain(&db, None).await.is_err());
}
