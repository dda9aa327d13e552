//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. `occurred_at` is always
//! supplied by the caller so the engine stays clock-free.

use chrono::{DateTime, Utc};

use crate::{BalanceSheet, Money, Recipient, ServiceKind};

/// Open a session with declared opening balances.
#[derive(Clone, Debug)]
pub struct StartSessionCmd {
    pub operator_id: String,
    pub opening: BalanceSheet,
    pub opened_at: DateTime<Utc>,
}

impl StartSessionCmd {
    #[must_use]
    pub fn new(
        operator_id: impl Into<String>,
        opening: BalanceSheet,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            operator_id: operator_id.into(),
            opening,
            opened_at,
        }
    }
}

/// Record a customer deposit (customer hands over mobile money, takes cash).
#[derive(Clone, Debug)]
pub struct DepositCmd {
    pub operator_id: String,
    pub service: ServiceKind,
    pub amount: Money,
    pub phone_number: String,
    pub occurred_at: DateTime<Utc>,
}

impl DepositCmd {
    #[must_use]
    pub fn new(
        operator_id: impl Into<String>,
        service: ServiceKind,
        amount: Money,
        phone_number: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            operator_id: operator_id.into(),
            service,
            amount,
            phone_number: phone_number.into(),
            occurred_at,
        }
    }
}

/// Record a customer withdrawal (customer hands over cash, receives mobile
/// money).
#[derive(Clone, Debug)]
pub struct WithdrawCmd {
    pub operator_id: String,
    pub service: ServiceKind,
    pub amount: Money,
    pub phone_number: String,
    pub occurred_at: DateTime<Utc>,
}

impl WithdrawCmd {
    #[must_use]
    pub fn new(
        operator_id: impl Into<String>,
        service: ServiceKind,
        amount: Money,
        phone_number: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            operator_id: operator_id.into(),
            service,
            amount,
            phone_number: phone_number.into(),
            occurred_at,
        }
    }
}

/// Send mobile money to a third party on a customer's behalf, collected in
/// cash.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub operator_id: String,
    pub service: ServiceKind,
    pub amount: Money,
    pub recipient: Recipient,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        operator_id: impl Into<String>,
        service: ServiceKind,
        amount: Money,
        recipient: Recipient,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            operator_id: operator_id.into(),
            service,
            amount,
            recipient,
            description: None,
            occurred_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
