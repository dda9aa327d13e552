//! The write path (deposit / withdraw / transfer) and the read projections
//! over the ledger.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    DepositCmd, EngineError, LedgerEvent, Money, OperationKind, Recipient, ResultEngine,
    ServiceKind, Session, TransactionRecord, TransactionStatus, TransferCmd, WithdrawCmd, fees,
    sessions, transactions,
};

use super::{Engine, normalize_optional_text, normalize_required_text};

/// Filter for ledger listings. `None` fields match everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionListFilter {
    pub service: Option<ServiceKind>,
    pub kind: Option<OperationKind>,
    pub limit: Option<u64>,
}

/// One validated operation about to enter the ledger.
struct ProposedOp {
    operator_id: String,
    kind: OperationKind,
    service: ServiceKind,
    amount: Money,
    phone_number: Option<String>,
    recipient: Option<Recipient>,
    description: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl Engine {
    /// Records a customer deposit: the customer's mobile money becomes the
    /// agent's, cash goes over the counter the other way.
    pub async fn deposit(&self, cmd: DepositCmd) -> ResultEngine<TransactionRecord> {
        let phone = normalize_required_text(&cmd.phone_number, "phone number")?;
        self.record_operation(ProposedOp {
            operator_id: cmd.operator_id,
            kind: OperationKind::Deposit,
            service: cmd.service,
            amount: cmd.amount,
            phone_number: Some(phone),
            recipient: None,
            description: None,
            occurred_at: cmd.occurred_at,
        })
        .await
    }

    /// Records a customer withdrawal: cash out of the till, service float in.
    pub async fn withdraw(&self, cmd: WithdrawCmd) -> ResultEngine<TransactionRecord> {
        let phone = normalize_required_text(&cmd.phone_number, "phone number")?;
        self.record_operation(ProposedOp {
            operator_id: cmd.operator_id,
            kind: OperationKind::Withdrawal,
            service: cmd.service,
            amount: cmd.amount,
            phone_number: Some(phone),
            recipient: None,
            description: None,
            occurred_at: cmd.occurred_at,
        })
        .await
    }

    /// Records a transfer sent to a third party on a customer's behalf.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransactionRecord> {
        let recipient = Recipient {
            name: normalize_required_text(&cmd.recipient.name, "recipient name")?,
            phone: normalize_required_text(&cmd.recipient.phone, "recipient phone")?,
        };
        self.record_operation(ProposedOp {
            operator_id: cmd.operator_id,
            kind: OperationKind::Transfer,
            service: cmd.service,
            amount: cmd.amount,
            phone_number: None,
            recipient: Some(recipient),
            description: normalize_optional_text(cmd.description.as_deref()),
            occurred_at: cmd.occurred_at,
        })
        .await
    }

    /// Validates and appends one operation.
    ///
    /// Row insert and session balance update share one database transaction;
    /// the whole validate-then-apply span holds the engine write lock so a
    /// concurrent call cannot pass a stale solvency check.
    async fn record_operation(&self, op: ProposedOp) -> ResultEngine<TransactionRecord> {
        if op.amount < fees::MIN_TRANSACTION_AMOUNT {
            return Err(EngineError::InvalidAmount(format!(
                "minimum amount is {}, got {}",
                fees::MIN_TRANSACTION_AMOUNT,
                op.amount
            )));
        }

        let _guard = self.write_guard().await;
        let session_model = self
            .find_active_model(&op.operator_id)
            .await?
            .ok_or(EngineError::NoActiveSession)?;
        let session = Session::try_from(session_model)?;

        let fee = fees::fee(op.kind, op.amount);
        let next = session.balances.apply(op.kind, op.service, op.amount)?;

        let db_tx = self.database().begin().await?;
        let seq = next_seq(&db_tx, session.id).await?;
        let record = TransactionRecord {
            id: Uuid::new_v4(),
            session_id: session.id,
            seq,
            kind: op.kind,
            service: op.service,
            amount: op.amount,
            fee,
            phone_number: op.phone_number,
            recipient: op.recipient,
            description: op.description,
            occurred_at: op.occurred_at,
            status: TransactionStatus::Completed,
            created_by: op.operator_id,
        };

        transactions::ActiveModel::from(&record).insert(&db_tx).await?;
        let balance_update = sessions::ActiveModel {
            id: ActiveValue::Set(session.id.to_string()),
            cash: ActiveValue::Set(next.cash.ariary()),
            mvola: ActiveValue::Set(next.mvola.ariary()),
            orange_money: ActiveValue::Set(next.orange_money.ariary()),
            airtel_money: ActiveValue::Set(next.airtel_money.ariary()),
            ..Default::default()
        };
        balance_update.update(&db_tx).await?;
        db_tx.commit().await?;

        tracing::debug!(
            transaction_id = %record.id,
            kind = record.kind.as_str(),
            service = record.service.as_str(),
            amount = record.amount.ariary(),
            fee = record.fee.ariary(),
            "operation recorded"
        );
        self.emit(LedgerEvent::TransactionAppended {
            record: record.clone(),
        });
        self.emit(LedgerEvent::BalanceChanged { balances: next });
        Ok(record)
    }

    /// Lists the active session's transactions, newest first.
    ///
    /// Ordering is by timestamp descending with the insertion counter as the
    /// stable tie-break. Without an active session the listing is empty;
    /// only writes are gated on a session.
    pub async fn list_transactions(
        &self,
        operator_id: &str,
        filter: TransactionListFilter,
    ) -> ResultEngine<Vec<TransactionRecord>> {
        let Some(session_model) = self.find_active_model(operator_id).await? else {
            return Ok(Vec::new());
        };

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::SessionId.eq(session_model.id))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Seq);

        if let Some(service) = filter.service {
            query = query.filter(transactions::Column::Service.eq(service.as_str()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let models = query.all(self.database()).await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(TransactionRecord::try_from(model)?);
        }
        Ok(out)
    }

    /// The `n` most recent transactions of the active session.
    pub async fn recent_transactions(
        &self,
        operator_id: &str,
        limit: u64,
    ) -> ResultEngine<Vec<TransactionRecord>> {
        self.list_transactions(
            operator_id,
            TransactionListFilter {
                limit: Some(limit),
                ..Default::default()
            },
        )
        .await
    }

    /// Recomputes the active session's denormalized balances from the ledger.
    ///
    /// Replays completed rows in insertion order over the opening snapshot,
    /// re-validating every movement, then rewrites the session row. Recovery
    /// path for a corrupted denormalization.
    pub async fn recompute_balances(&self, operator_id: &str) -> ResultEngine<()> {
        let _guard = self.write_guard().await;
        let session_model = self
            .find_active_model(operator_id)
            .await?
            .ok_or(EngineError::NoActiveSession)?;
        let session = Session::try_from(session_model)?;

        let db_tx = self.database().begin().await?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::SessionId.eq(session.id.to_string()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Completed.as_str()))
            .order_by_asc(transactions::Column::OccurredAt)
            .order_by_asc(transactions::Column::Seq)
            .all(&db_tx)
            .await?;

        let mut sheet = session.opening;
        for model in models {
            let record = TransactionRecord::try_from(model)?;
            sheet = sheet.apply(record.kind, record.service, record.amount)?;
        }

        let update = sessions::ActiveModel {
            id: ActiveValue::Set(session.id.to_string()),
            cash: ActiveValue::Set(sheet.cash.ariary()),
            mvola: ActiveValue::Set(sheet.mvola.ariary()),
            orange_money: ActiveValue::Set(sheet.orange_money.ariary()),
            airtel_money: ActiveValue::Set(sheet.airtel_money.ariary()),
            ..Default::default()
        };
        update.update(&db_tx).await?;
        db_tx.commit().await?;

        self.emit(LedgerEvent::BalanceChanged { balances: sheet });
        Ok(())
    }
}

async fn next_seq(db_tx: &DatabaseTransaction, session_id: Uuid) -> ResultEngine<i64> {
    let backend = db_tx.get_database_backend();
    let stmt = Statement::from_sql_and_values(
        backend,
        "SELECT COALESCE(MAX(seq), 0) AS max_seq FROM transactions WHERE session_id = ?",
        vec![session_id.to_string().into()],
    );
    let row = db_tx.query_one(stmt).await?;
    let max_seq: i64 = row.and_then(|r| r.try_get("", "max_seq").ok()).unwrap_or(0);
    Ok(max_seq + 1)
}
