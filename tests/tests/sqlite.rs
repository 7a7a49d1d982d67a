//! End-to-end against an in-memory SQLite database.

use sqlnest_tests::prelude::*;

async fn session() -> Session<SqliteExecutor> {
    let session = Session::new(SqliteExecutor::open_in_memory().unwrap());
    session
        .run(Query::new(
            "CREATE TABLE accounts (id INTEGER PRIMARY KEY, owner TEXT NOT NULL UNIQUE, balance INTEGER NOT NULL)",
        ))
        .await
        .unwrap();
    session
}

async fn balances(session: &Session<SqliteExecutor>) -> Vec<Row> {
    session
        .all(Query::new("SELECT owner, balance FROM accounts ORDER BY owner"))
        .await
        .unwrap()
}

fn open(owner: &str, balance: i64) -> Query {
    Query::new("INSERT INTO accounts (owner, balance) VALUES (?, ?)")
        .bind(owner)
        .bind(balance)
}

#[tokio::test]
async fn test_committed_writes_are_visible() {
    // GIVEN
    let mut session = session().await;

    // WHEN
    session
        .transaction(TransactionConfig::behavior(TransactionBehavior::Immediate), |tx| {
            Box::pin(async move {
                tx.run(open("ada", 10)).await?;
                tx.run(open("brian", 5)).await?;
                Ok::<_, SessionError>(())
            })
        })
        .await
        .unwrap();

    // THEN
    assert_eq!(
        balances(&session).await,
        vec![row!["ada", 10i64], row!["brian", 5i64]]
    );
}

#[tokio::test]
async fn test_rolled_back_writes_disappear() {
    // GIVEN
    let mut session = session().await;

    // WHEN
    let err = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                tx.run(open("ada", 10)).await?;
                tx.run(open("ada", 20)).await?;
                Ok::<_, SessionError>(())
            })
        })
        .await
        .unwrap_err();

    // THEN
    assert!(matches!(
        err,
        SessionError::Execution(ExecutionError::ConstraintViolation { .. })
    ));
    assert!(balances(&session).await.is_empty());
}

#[tokio::test]
async fn test_savepoint_rollback_keeps_outer_writes() {
    // GIVEN
    let mut session = session().await;

    // WHEN
    session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                tx.run(open("ada", 10)).await?;
                let nested = tx
                    .transaction(|sp| {
                        Box::pin(async move {
                            sp.run(open("brian", 5)).await?;
                            sp.run(open("ada", 1)).await?;
                            Ok::<_, SessionError>(())
                        })
                    })
                    .await;
                assert!(nested.is_err());
                Ok::<_, SessionError>(())
            })
        })
        .await
        .unwrap();

    // THEN
    assert_eq!(balances(&session).await, vec![row!["ada", 10i64]]);
}

#[tokio::test]
async fn test_migrations_apply_once() {
    // GIVEN
    let mut session = Session::new(SqliteExecutor::open_in_memory().unwrap());
    let migrations = vec![
        MigrationMeta::new(vec!["CREATE TABLE notes (body TEXT)".into()], 1_700_000_000_000, "a1"),
        MigrationMeta::new(
            vec!["INSERT INTO notes (body) VALUES ('hello')".into()],
            1_700_000_100_000,
            "b2",
        ),
    ];

    // WHEN
    let first = session
        .migrate(&migrations, MigrationConfig::default())
        .await
        .unwrap();
    let second = session
        .migrate(&migrations, MigrationConfig::default())
        .await
        .unwrap();

    // THEN
    assert_eq!(first, 2);
    assert_eq!(second, 0);
    let notes = session
        .prepare(Query::new("SELECT body FROM notes"))
        .with_fields(vec![SelectedField::new("body")], None)
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].value("body"), Some(&Value::Text("hello".into())));
}
