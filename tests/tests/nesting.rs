//! Savepoint-nested transactions.

use sqlnest_tests::prelude::*;

const INSERT: &str = "INSERT INTO audit (msg) VALUES (?)";

fn audit(msg: &str) -> Query {
    Query::new(INSERT).bind(msg)
}

#[tokio::test]
async fn test_nested_success_releases_savepoint() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| e);

    // WHEN
    let index = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                tx.run(audit("outer")).await?;
                let inner = tx
                    .transaction(|sp| {
                        Box::pin(async move {
                            sp.run(audit("inner")).await?;
                            Ok::<_, SessionError>(sp.nesting_index())
                        })
                    })
                    .await?;
                Ok::<_, SessionError>(inner)
            })
        })
        .await
        .unwrap();

    // THEN
    assert_eq!(index, 1);
    journal
        .expect_dispatched(&[
            "BEGIN",
            INSERT,
            "SAVEPOINT sp1",
            INSERT,
            "RELEASE SAVEPOINT sp1",
            "COMMIT",
        ])
        .unwrap();
}

#[tokio::test]
async fn test_nested_failure_propagated_rolls_back_everything() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| e);

    // WHEN
    let err = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                tx.transaction(|_sp| {
                    Box::pin(async move {
                        Err::<(), _>(SessionError::from(ExecutionError::constraint_violation(
                            "FOREIGN KEY constraint failed",
                        )))
                    })
                })
                .await?;
                Ok::<_, SessionError>(())
            })
        })
        .await
        .unwrap_err();

    // THEN
    assert_eq!(
        err.to_string(),
        "execution error: constraint violation: FOREIGN KEY constraint failed"
    );
    journal
        .expect_dispatched(&[
            "BEGIN",
            "SAVEPOINT sp1",
            "ROLLBACK TO SAVEPOINT sp1",
            "ROLLBACK",
        ])
        .unwrap();
}

#[tokio::test]
async fn test_nested_failure_recovered_by_outer_commits() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| {
        e.fail_once(INSERT, || ExecutionError::constraint_violation("UNIQUE constraint failed"))
    });

    // WHEN
    let recovered = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                let attempt = tx
                    .transaction(|sp| {
                        Box::pin(async move {
                            sp.run(audit("dup")).await?;
                            Ok::<_, SessionError>(())
                        })
                    })
                    .await;
                tx.run(audit("fallback")).await?;
                Ok::<_, SessionError>(attempt.is_err())
            })
        })
        .await
        .unwrap();

    // THEN
    assert!(recovered);
    journal
        .expect_dispatched(&[
            "BEGIN",
            "SAVEPOINT sp1",
            INSERT,
            "ROLLBACK TO SAVEPOINT sp1",
            INSERT,
            "COMMIT",
        ])
        .unwrap();
}

#[tokio::test]
async fn test_indices_increase_along_the_nesting_path() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| e);

    // WHEN
    let seen = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                let outer = tx.nesting_index();
                let deeper = tx
                    .transaction(|a| {
                        Box::pin(async move {
                            let first = a.nesting_index();
                            let rest = a
                                .transaction(|b| {
                                    Box::pin(async move {
                                        let second = b.nesting_index();
                                        let third = b
                                            .transaction(|c| {
                                                Box::pin(async move {
                                                    Ok::<_, SessionError>(c.nesting_index())
                                                })
                                            })
                                            .await?;
                                        Ok::<_, SessionError>(vec![second, third])
                                    })
                                })
                                .await?;
                            let mut all = vec![first];
                            all.extend(rest);
                            Ok::<_, SessionError>(all)
                        })
                    })
                    .await?;
                let mut all = vec![outer];
                all.extend(deeper);
                Ok::<_, SessionError>(all)
            })
        })
        .await
        .unwrap();

    // THEN
    assert_eq!(seen, vec![0, 1, 2, 3]);
    assert_eq!(
        journal.savepoints(),
        vec![
            (SavepointOp::Open, 1),
            (SavepointOp::Open, 2),
            (SavepointOp::Open, 3),
            (SavepointOp::Release, 3),
            (SavepointOp::Release, 2),
            (SavepointOp::Release, 1),
        ]
    );
    assert_eq!(journal.count("BEGIN"), 1);
    assert_eq!(journal.count("COMMIT"), 1);
}

#[tokio::test]
async fn test_sibling_scopes_reuse_the_same_name() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| e);

    // WHEN
    session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                for _ in 0..2 {
                    tx.transaction(|sp| Box::pin(async move { Ok::<_, SessionError>(sp.savepoint()) }))
                        .await?;
                }
                Ok::<_, SessionError>(())
            })
        })
        .await
        .unwrap();

    // THEN
    assert_eq!(
        journal.savepoints(),
        vec![
            (SavepointOp::Open, 1),
            (SavepointOp::Release, 1),
            (SavepointOp::Open, 1),
            (SavepointOp::Release, 1),
        ]
    );
}

#[tokio::test]
async fn test_every_opened_scope_terminates_exactly_once() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| e);

    // WHEN
    let _ = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                tx.transaction(|_sp| Box::pin(async move { Ok::<_, SessionError>(()) }))
                    .await?;
                let _ = tx
                    .transaction(|sp| Box::pin(async move { sp.rollback::<()>() }))
                    .await;
                tx.rollback::<()>()
            })
        })
        .await;

    // THEN
    let savepoints = journal.savepoints();
    let opened = savepoints.iter().filter(|(op, _)| *op == SavepointOp::Open).count();
    let closed = savepoints.len() - opened;
    assert_eq!(opened, 2);
    assert_eq!(closed, 2);
    journal
        .expect_dispatched(&[
            "BEGIN",
            "SAVEPOINT sp1",
            "RELEASE SAVEPOINT sp1",
            "SAVEPOINT sp1",
            "ROLLBACK TO SAVEPOINT sp1",
            "ROLLBACK",
        ])
        .unwrap();
}

#[tokio::test]
async fn test_release_failure_rolls_back_to_savepoint() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| {
        e.fail_once("RELEASE SAVEPOINT sp1", || ExecutionError::rejected("no such savepoint: sp1"))
    });

    // WHEN
    let err = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                tx.transaction(|_sp| Box::pin(async move { Ok::<_, SessionError>(()) }))
                    .await?;
                Ok::<_, SessionError>(())
            })
        })
        .await
        .unwrap_err();

    // THEN
    assert!(matches!(err, SessionError::Execution(ExecutionError::Rejected { .. })));
    journal
        .expect_dispatched(&[
            "BEGIN",
            "SAVEPOINT sp1",
            "RELEASE SAVEPOINT sp1",
            "ROLLBACK TO SAVEPOINT sp1",
            "ROLLBACK",
        ])
        .unwrap();
}

#[tokio::test]
async fn test_failed_rollback_to_savepoint_keeps_the_original_error() {
    // GIVEN
    let (mut session, journal) = recording_session(|e| {
        e.fail(INSERT, || ExecutionError::constraint_violation("orig"))
            .fail("ROLLBACK TO SAVEPOINT sp1", || ExecutionError::connection("lost"))
    });

    // WHEN
    let err = session
        .transaction(TransactionConfig::default(), |tx| {
            Box::pin(async move {
                tx.transaction(|sp| {
                    Box::pin(async move {
                        sp.run(audit("x")).await?;
                        Ok::<_, SessionError>(())
                    })
                })
                .await?;
                Ok::<_, SessionError>(())
            })
        })
        .await
        .unwrap_err();

    // THEN
    journal
        .expect_dispatched(&[
            "BEGIN",
            "SAVEPOINT sp1",
            INSERT,
            "ROLLBACK TO SAVEPOINT sp1",
            "ROLLBACK",
        ])
        .unwrap();
    assert!(matches!(
        err.rollback_error(),
        Some(ExecutionError::Connection { .. })
    ));
    let cause = err.abort_cause().map(|c| c.to_string()).unwrap_or_default();
    assert!(cause.contains("constraint violation: orig"), "{}", cause);
}
