//! Change notifications for presentation layers.
//!
//! Delivery is best-effort over a broadcast channel: a lagging or absent
//! subscriber never blocks or fails an operation, and core correctness does
//! not depend on any event being observed.

use uuid::Uuid;

use crate::{BalanceSheet, TransactionRecord};

#[derive(Clone, Debug)]
pub enum LedgerEvent {
    SessionStarted { session_id: Uuid },
    SessionClosed { session_id: Uuid },
    TransactionAppended { record: TransactionRecord },
    BalanceChanged { balances: BalanceSheet },
}
