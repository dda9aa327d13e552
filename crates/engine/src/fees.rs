//! Fee schedule for kiosk operations.
//!
//! Withdrawal and transfer fees are the kiosk's revenue: a percentage with a
//! floor so small transactions stay profitable. Deposits are free to attract
//! float. Fees are recorded on the transaction and reported as revenue; they
//! are never drawn from a session balance (see `DESIGN.md`).

use crate::{Money, OperationKind};

/// Smallest amount accepted for any operation.
pub const MIN_TRANSACTION_AMOUNT: Money = Money::new(1_000);

/// Withdrawal fee floor.
pub const WITHDRAWAL_FEE_FLOOR: Money = Money::new(300);

/// Transfer fee floor.
pub const TRANSFER_FEE_FLOOR: Money = Money::new(200);

/// Computes the fee for an operation.
///
/// - deposit: free
/// - withdrawal: max(300 Ar, 2% of the amount)
/// - transfer: max(200 Ar, 1.5% of the amount)
///
/// Percentages are ceiled to a whole Ariary using integer arithmetic.
#[must_use]
pub fn fee(kind: OperationKind, amount: Money) -> Money {
    let amount = amount.ariary();
    match kind {
        OperationKind::Deposit => Money::ZERO,
        // ceil(amount * 0.02)
        OperationKind::Withdrawal => {
            let percent = (amount * 2 + 99) / 100;
            Money::new(percent.max(WITHDRAWAL_FEE_FLOOR.ariary()))
        }
        // ceil(amount * 0.015)
        OperationKind::Transfer => {
            let percent = (amount * 15 + 999) / 1_000;
            Money::new(percent.max(TRANSFER_FEE_FLOOR.ariary()))
        }
    }
}
