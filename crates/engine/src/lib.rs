//! Session & ledger engine for a mobile-money kiosk.
//!
//! The engine owns the accounting invariants: one active session per
//! operator, non-negative balances at all times, deterministic fees, and an
//! append-only transaction history every balance can be rebuilt from.
//! Presentation, identity, and receipts live elsewhere and talk to this
//! crate through [`Engine`].

pub use balances::BalanceSheet;
pub use commands::{DepositCmd, StartSessionCmd, TransferCmd, WithdrawCmd};
pub use error::EngineError;
pub use events::LedgerEvent;
pub use fees::{MIN_TRANSACTION_AMOUNT, fee};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, SessionSummary, TransactionListFilter};
pub use services::ServiceKind;
pub use sessions::Session;
pub use transactions::{OperationKind, Recipient, TransactionRecord, TransactionStatus};

mod balances;
mod commands;
mod error;
mod events;
pub mod fees;
mod money;
mod ops;
mod services;
mod sessions;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
