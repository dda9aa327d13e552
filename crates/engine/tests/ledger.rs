use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BalanceSheet, DepositCmd, Engine, EngineError, LedgerEvent, Money, OperationKind, Recipient,
    ServiceKind, StartSessionCmd, TransactionListFilter, TransferCmd, WithdrawCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

const OPERATOR: &str = "rakoto";

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, url, path)
}

fn opening() -> BalanceSheet {
    BalanceSheet::new(
        Money::new(100_000),
        Money::new(50_000),
        Money::ZERO,
        Money::ZERO,
    )
}

async fn started_engine() -> (Engine, DatabaseConnection) {
    let (engine, db) = engine_with_db().await;
    engine
        .start_session(StartSessionCmd::new(OPERATOR, opening(), Utc::now()))
        .await
        .unwrap();
    (engine, db)
}

fn deposit_cmd(amount: i64) -> DepositCmd {
    DepositCmd::new(
        OPERATOR,
        ServiceKind::Mvola,
        Money::new(amount),
        "034 11 222 33",
        Utc::now(),
    )
}

#[tokio::test]
async fn start_session_seeds_balances_from_opening() {
    let (engine, _db) = engine_with_db().await;

    let session = engine
        .start_session(StartSessionCmd::new(OPERATOR, opening(), Utc::now()))
        .await
        .unwrap();

    assert!(session.is_active);
    assert_eq!(session.opening, opening());
    assert_eq!(session.balances, opening());
    assert_eq!(engine.balances(OPERATOR).await.unwrap(), opening());
}

#[tokio::test]
async fn second_start_without_close_is_rejected() {
    let (engine, _db) = started_engine().await;

    let first = engine.active_session(OPERATOR).await.unwrap();
    let err = engine
        .start_session(StartSessionCmd::new(OPERATOR, opening(), Utc::now()))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::SessionAlreadyActive(first.id.to_string())
    );
}

#[tokio::test]
async fn negative_opening_balance_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let bad = BalanceSheet::new(Money::new(-1), Money::ZERO, Money::ZERO, Money::ZERO);
    let err = engine
        .start_session(StartSessionCmd::new(OPERATOR, bad, Utc::now()))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn counter_scenario_moves_balances_and_fees() {
    let (engine, _db) = started_engine().await;

    let deposit = engine.deposit(deposit_cmd(20_000)).await.unwrap();
    assert_eq!(deposit.fee, Money::ZERO);
    assert_eq!(
        engine.balances(OPERATOR).await.unwrap(),
        BalanceSheet::new(
            Money::new(120_000),
            Money::new(30_000),
            Money::ZERO,
            Money::ZERO
        )
    );

    let withdrawal = engine
        .withdraw(WithdrawCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(10_000),
            "034 22 333 44",
            Utc::now(),
        ))
        .await
        .unwrap();
    assert_eq!(withdrawal.fee, Money::new(300));
    assert_eq!(
        engine.balances(OPERATOR).await.unwrap(),
        BalanceSheet::new(
            Money::new(110_000),
            Money::new(40_000),
            Money::ZERO,
            Money::ZERO
        )
    );

    let transfer = engine
        .transfer(
            TransferCmd::new(
                OPERATOR,
                ServiceKind::Mvola,
                Money::new(5_000),
                Recipient {
                    name: "Marie".to_string(),
                    phone: "+261 33 11 222 33".to_string(),
                },
                Utc::now(),
            )
            .description("Paiement du loyer"),
        )
        .await
        .unwrap();
    assert_eq!(transfer.fee, Money::new(200));
    assert_eq!(
        engine.balances(OPERATOR).await.unwrap(),
        BalanceSheet::new(
            Money::new(115_000),
            Money::new(35_000),
            Money::ZERO,
            Money::ZERO
        )
    );
}

#[tokio::test]
async fn conservation_holds_over_accepted_operations() {
    let (engine, _db) = started_engine().await;

    let total = |sheet: BalanceSheet| {
        sheet.cash + sheet.mvola + sheet.orange_money + sheet.airtel_money
    };
    let before = total(engine.balances(OPERATOR).await.unwrap());

    engine.deposit(deposit_cmd(20_000)).await.unwrap();
    engine
        .withdraw(WithdrawCmd::new(
            OPERATOR,
            ServiceKind::OrangeMoney,
            Money::new(7_000),
            "032 22 333 44",
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .transfer(TransferCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(5_000),
            Recipient {
                name: "Marie".to_string(),
                phone: "+261 33 11 222 33".to_string(),
            },
            Utc::now(),
        ))
        .await
        .unwrap();

    // Transfers and fees net to zero on the four-field sum.
    let after = total(engine.balances(OPERATOR).await.unwrap());
    assert_eq!(after - before, Money::new(20_000 - 7_000));
}

#[tokio::test]
async fn withdrawal_beyond_cash_is_rejected_without_mutation() {
    let (engine, _db) = started_engine().await;

    let err = engine
        .withdraw(WithdrawCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(200_000),
            "034 22 333 44",
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InsufficientCash {
            requested: Money::new(200_000),
            available: Money::new(100_000),
        }
    );
    assert_eq!(engine.balances(OPERATOR).await.unwrap(), opening());
    assert!(
        engine
            .recent_transactions(OPERATOR, 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn deposit_beyond_service_float_is_rejected() {
    let (engine, _db) = started_engine().await;

    let err = engine
        .deposit(DepositCmd::new(
            OPERATOR,
            ServiceKind::AirtelMoney,
            Money::new(5_000),
            "033 11 222 33",
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InsufficientService {
            service: ServiceKind::AirtelMoney,
            requested: Money::new(5_000),
            available: Money::ZERO,
        }
    );
    assert_eq!(engine.balances(OPERATOR).await.unwrap(), opening());
}

#[tokio::test]
async fn amount_below_minimum_is_rejected() {
    let (engine, _db) = started_engine().await;

    let err = engine.deposit(deposit_cmd(999)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    engine.deposit(deposit_cmd(1_000)).await.unwrap();
}

#[tokio::test]
async fn blank_phone_number_is_rejected() {
    let (engine, _db) = started_engine().await;

    let err = engine
        .deposit(DepositCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(5_000),
            "   ",
            Utc::now(),
        ))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::MissingField("phone number".to_string()));
}

#[tokio::test]
async fn transfer_requires_recipient_name_and_phone() {
    let (engine, _db) = started_engine().await;

    let err = engine
        .transfer(TransferCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(5_000),
            Recipient {
                name: String::new(),
                phone: "+261 33 11 222 33".to_string(),
            },
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingField("recipient name".to_string()));

    let err = engine
        .transfer(TransferCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(5_000),
            Recipient {
                name: "Marie".to_string(),
                phone: "  ".to_string(),
            },
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingField("recipient phone".to_string())
    );
}

#[tokio::test]
async fn operations_require_an_active_session() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.deposit(deposit_cmd(5_000)).await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveSession);
}

#[tokio::test]
async fn closed_session_rejects_operations_but_keeps_history() {
    let (engine, _db) = started_engine().await;

    engine.deposit(deposit_cmd(20_000)).await.unwrap();
    let closed = engine.close_session(OPERATOR, Utc::now()).await.unwrap();
    assert!(!closed.is_active);
    assert!(closed.closed_at.is_some());
    // Balances survive the close on the stored row.
    assert_eq!(closed.balances.cash, Money::new(120_000));

    let err = engine.deposit(deposit_cmd(5_000)).await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveSession);
    let err = engine.close_session(OPERATOR, Utc::now()).await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveSession);

    // A new session starts clean and does not resurrect the old history.
    engine
        .start_session(StartSessionCmd::new(OPERATOR, opening(), Utc::now()))
        .await
        .unwrap();
    assert!(
        engine
            .recent_transactions(OPERATOR, 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sessions_are_scoped_per_operator() {
    let (engine, _db) = started_engine().await;

    // A second operator has no session and can open one independently.
    let err = engine.balances("vola").await.unwrap_err();
    assert_eq!(err, EngineError::NoActiveSession);

    engine
        .start_session(StartSessionCmd::new(
            "vola",
            BalanceSheet::new(Money::new(10_000), Money::ZERO, Money::ZERO, Money::ZERO),
            Utc::now(),
        ))
        .await
        .unwrap();

    assert_eq!(
        engine.balances("vola").await.unwrap().cash,
        Money::new(10_000)
    );
    assert_eq!(engine.balances(OPERATOR).await.unwrap(), opening());
}

#[tokio::test]
async fn listing_filters_by_service_and_kind() {
    let (engine, _db) = started_engine().await;

    engine.deposit(deposit_cmd(20_000)).await.unwrap();
    engine
        .withdraw(WithdrawCmd::new(
            OPERATOR,
            ServiceKind::OrangeMoney,
            Money::new(7_000),
            "032 22 333 44",
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .transfer(TransferCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(5_000),
            Recipient {
                name: "Marie".to_string(),
                phone: "+261 33 11 222 33".to_string(),
            },
            Utc::now(),
        ))
        .await
        .unwrap();

    let mvola = engine
        .list_transactions(
            OPERATOR,
            TransactionListFilter {
                service: Some(ServiceKind::Mvola),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(mvola.len(), 2);
    assert!(mvola.iter().all(|tx| tx.service == ServiceKind::Mvola));

    let withdrawals = engine
        .list_transactions(
            OPERATOR,
            TransactionListFilter {
                kind: Some(OperationKind::Withdrawal),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].amount, Money::new(7_000));

    let limited = engine
        .list_transactions(
            OPERATOR,
            TransactionListFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn recent_orders_newest_first_with_stable_tie_break() {
    let (engine, _db) = started_engine().await;

    // Same timestamp for all three: the insertion counter must break the tie.
    let at = Utc::now();
    for amount in [1_000, 2_000, 3_000] {
        engine
            .deposit(DepositCmd::new(
                OPERATOR,
                ServiceKind::Mvola,
                Money::new(amount),
                "034 11 222 33",
                at,
            ))
            .await
            .unwrap();
    }
    engine
        .deposit(DepositCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(4_000),
            "034 11 222 33",
            at + Duration::seconds(1),
        ))
        .await
        .unwrap();

    let recent = engine.recent_transactions(OPERATOR, 10).await.unwrap();
    let amounts: Vec<i64> = recent.iter().map(|tx| tx.amount.ariary()).collect();
    assert_eq!(amounts, vec![4_000, 3_000, 2_000, 1_000]);

    let top = engine.recent_transactions(OPERATOR, 2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].amount, Money::new(4_000));
}

#[tokio::test]
async fn listing_without_session_is_empty() {
    let (engine, _db) = engine_with_db().await;

    let txs = engine
        .list_transactions(OPERATOR, TransactionListFilter::default())
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn summary_aggregates_fees_and_totals() {
    let (engine, _db) = started_engine().await;

    engine.deposit(deposit_cmd(20_000)).await.unwrap();
    engine
        .withdraw(WithdrawCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(10_000),
            "034 22 333 44",
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .transfer(TransferCmd::new(
            OPERATOR,
            ServiceKind::Mvola,
            Money::new(5_000),
            Recipient {
                name: "Marie".to_string(),
                phone: "+261 33 11 222 33".to_string(),
            },
            Utc::now(),
        ))
        .await
        .unwrap();

    let summary = engine.session_summary(OPERATOR).await.unwrap();
    assert!(summary.session_id.is_some());
    assert_eq!(summary.balances.cash, Money::new(115_000));
    assert_eq!(summary.mobile_total, Money::new(35_000));
    assert_eq!(summary.fees_collected, Money::new(500));
    assert_eq!(summary.deposits_total, Money::new(20_000));
    assert_eq!(summary.withdrawals_total, Money::new(10_000));
    assert_eq!(summary.transfers_total, Money::new(5_000));
    assert_eq!(summary.transaction_count, 3);
}

#[tokio::test]
async fn summary_without_session_is_all_zeros() {
    let (engine, _db) = engine_with_db().await;

    let summary = engine.session_summary(OPERATOR).await.unwrap();
    assert_eq!(summary.session_id, None);
    assert_eq!(summary.balances, BalanceSheet::default());
    assert_eq!(summary.fees_collected, Money::ZERO);
    assert_eq!(summary.transaction_count, 0);
}

#[tokio::test]
async fn recompute_restores_corrupted_denormalized_balances() {
    let (engine, db) = started_engine().await;
    let backend = db.get_database_backend();

    engine.deposit(deposit_cmd(20_000)).await.unwrap();
    let session = engine.active_session(OPERATOR).await.unwrap();

    // Corrupt the denormalized columns directly in the database.
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE sessions SET cash = ?, mvola = ? WHERE id = ?;",
        vec![999i64.into(), 999i64.into(), session.id.to_string().into()],
    ))
    .await
    .unwrap();

    engine.recompute_balances(OPERATOR).await.unwrap();

    assert_eq!(
        engine.balances(OPERATOR).await.unwrap(),
        BalanceSheet::new(
            Money::new(120_000),
            Money::new(30_000),
            Money::ZERO,
            Money::ZERO
        )
    );
}

#[tokio::test]
async fn events_are_emitted_for_appends() {
    let (engine, _db) = started_engine().await;
    let mut events = engine.subscribe();

    let record = engine.deposit(deposit_cmd(20_000)).await.unwrap();

    let appended = events.recv().await.unwrap();
    match appended {
        LedgerEvent::TransactionAppended { record: seen } => assert_eq!(seen.id, record.id),
        other => panic!("expected TransactionAppended, got {other:?}"),
    }
    let changed = events.recv().await.unwrap();
    match changed {
        LedgerEvent::BalanceChanged { balances } => {
            assert_eq!(balances.cash, Money::new(120_000));
        }
        other => panic!("expected BalanceChanged, got {other:?}"),
    }
}

#[tokio::test]
async fn restart_engine_reads_same_state() {
    let (engine, db, url, path) = engine_with_file_db().await;
    engine
        .start_session(StartSessionCmd::new(OPERATOR, opening(), Utc::now()))
        .await
        .unwrap();
    engine.deposit(deposit_cmd(20_000)).await.unwrap();

    drop(engine);
    drop(db);

    let db2 = Database::connect(&url).await.unwrap();
    let engine2 = Engine::builder()
        .database(db2.clone())
        .build()
        .await
        .unwrap();

    assert_eq!(
        engine2.balances(OPERATOR).await.unwrap(),
        BalanceSheet::new(
            Money::new(120_000),
            Money::new(30_000),
            Money::ZERO,
            Money::ZERO
        )
    );
    assert_eq!(
        engine2.recent_transactions(OPERATOR, 10).await.unwrap().len(),
        1
    );

    drop(db2);
    let _ = std::fs::remove_file(path);
}
