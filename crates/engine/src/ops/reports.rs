//! Read-only projections consumed by presentation layers.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use uuid::Uuid;

use crate::{BalanceSheet, Money, OperationKind, ResultEngine, Session};

use super::Engine;

/// Aggregated view of the operator's current session.
///
/// With no active session every figure is zero and `session_id` is `None`;
/// an empty ledger likewise yields zero totals. Fees never move a balance,
/// so `fees_collected` is pure revenue on top of the float.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: Option<Uuid>,
    pub opened_at: Option<DateTime<Utc>>,
    pub balances: BalanceSheet,
    pub mobile_total: Money,
    pub fees_collected: Money,
    pub deposits_total: Money,
    pub withdrawals_total: Money,
    pub transfers_total: Money,
    pub transaction_count: u64,
}

impl Engine {
    /// Returns session totals for reporting.
    ///
    /// Amount totals are per operation kind; aggregation runs in SQL over
    /// the session's completed rows.
    pub async fn session_summary(&self, operator_id: &str) -> ResultEngine<SessionSummary> {
        let Some(model) = self.find_active_model(operator_id).await? else {
            return Ok(SessionSummary::default());
        };
        let session = Session::try_from(model)?;

        let deposits_total = self.kind_total(&session, OperationKind::Deposit).await?;
        let withdrawals_total = self.kind_total(&session, OperationKind::Withdrawal).await?;
        let transfers_total = self.kind_total(&session, OperationKind::Transfer).await?;

        let backend = self.database().get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(fee), 0) AS fees, COUNT(*) AS cnt \
             FROM transactions \
             WHERE session_id = ? AND status = 'completed'",
            vec![session.id.to_string().into()],
        );
        let row = self.database().query_one(stmt).await?;
        let (fees, count) = match row {
            Some(row) => (
                row.try_get::<i64>("", "fees").unwrap_or(0),
                row.try_get::<i64>("", "cnt").unwrap_or(0),
            ),
            None => (0, 0),
        };

        Ok(SessionSummary {
            session_id: Some(session.id),
            opened_at: Some(session.opened_at),
            balances: session.balances,
            mobile_total: session.balances.mobile_total(),
            fees_collected: Money::new(fees),
            deposits_total,
            withdrawals_total,
            transfers_total,
            transaction_count: count.max(0) as u64,
        })
    }

    async fn kind_total(&self, session: &Session, kind: OperationKind) -> ResultEngine<Money> {
        let backend = self.database().get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(amount), 0) AS sum \
             FROM transactions \
             WHERE session_id = ? AND kind = ? AND status = 'completed'",
            vec![session.id.to_string().into(), kind.as_str().into()],
        );
        let row = self.database().query_one(stmt).await?;
        let sum: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
        Ok(Money::new(sum))
    }
}
