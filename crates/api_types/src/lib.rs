use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mobile-money service, wire names matching the engine/database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Mvola,
    OrangeMoney,
    AirtelMoney,
}

/// The four balances of a session, in whole Ariary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub cash: i64,
    pub mvola: i64,
    pub orange_money: i64,
    pub airtel_money: i64,
}

pub mod session {
    use super::*;

    /// Request body for opening a session with declared opening balances.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionStart {
        pub cash: i64,
        pub mvola: i64,
        pub orange_money: i64,
        pub airtel_money: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionView {
        pub id: Uuid,
        /// RFC3339 timestamp, including timezone offset.
        pub opened_at: DateTime<FixedOffset>,
        pub closed_at: Option<DateTime<FixedOffset>>,
        pub is_active: bool,
        pub opening: Balances,
        pub balances: Balances,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OperationKind {
        Deposit,
        Withdrawal,
        Transfer,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Completed,
        Failed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        pub service: Service,
        /// Whole Ariary, at least the configured minimum.
        pub amount: i64,
        pub phone_number: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawNew {
        pub service: Service,
        pub amount: i64,
        pub phone_number: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub service: Service,
        pub amount: i64,
        pub recipient_name: String,
        pub recipient_phone: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: OperationKind,
        pub service: Service,
        pub amount: i64,
        pub fee: i64,
        pub phone_number: Option<String>,
        pub recipient_name: Option<String>,
        pub recipient_phone: Option<String>,
        pub description: Option<String>,
        /// RFC3339 timestamp, including timezone offset.
        pub occurred_at: DateTime<FixedOffset>,
        pub status: TransactionStatus,
    }

    /// Listing filter; omitted fields match everything.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub service: Option<Service>,
        pub kind: Option<OperationKind>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod stats {
    use super::*;

    /// Aggregated session figures for dashboards.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionSummary {
        pub active: bool,
        pub session_id: Option<Uuid>,
        pub opened_at: Option<DateTime<FixedOffset>>,
        pub balances: Balances,
        pub mobile_total: i64,
        pub fees_collected: i64,
        pub deposits_total: i64,
        pub withdrawals_total: i64,
        pub transfers_total: i64,
        pub transaction_count: u64,
    }
}
