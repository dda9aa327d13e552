//! The kiosk's float: one cash balance plus one balance per mobile-money
//! service.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, OperationKind, ResultEngine, ServiceKind};

/// Snapshot of the four balances a session tracks.
///
/// `apply` is the only way an operation changes a sheet, and it works on a
/// copy: either every movement of the operation is accepted and a new sheet
/// is returned, or the typed shortfall error is returned and the input sheet
/// is untouched. All four fields stay `>= 0` after any accepted application.
///
/// Movements are from the agent's perspective. A deposit converts customer
/// mobile-money into cash over the counter: the agent's cash rises and the
/// service float falls. A withdrawal is the reverse. A transfer is paid in
/// cash by the customer and sent from the agent's service account, so it
/// moves like a deposit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub cash: Money,
    pub mvola: Money,
    pub orange_money: Money,
    pub airtel_money: Money,
}

impl BalanceSheet {
    #[must_use]
    pub const fn new(cash: Money, mvola: Money, orange_money: Money, airtel_money: Money) -> Self {
        Self {
            cash,
            mvola,
            orange_money,
            airtel_money,
        }
    }

    /// Returns the balance held on a service.
    #[must_use]
    pub const fn service(&self, kind: ServiceKind) -> Money {
        match kind {
            ServiceKind::Mvola => self.mvola,
            ServiceKind::OrangeMoney => self.orange_money,
            ServiceKind::AirtelMoney => self.airtel_money,
        }
    }

    fn service_mut(&mut self, kind: ServiceKind) -> &mut Money {
        match kind {
            ServiceKind::Mvola => &mut self.mvola,
            ServiceKind::OrangeMoney => &mut self.orange_money,
            ServiceKind::AirtelMoney => &mut self.airtel_money,
        }
    }

    /// Sum of the three mobile-money balances.
    #[must_use]
    pub fn mobile_total(&self) -> Money {
        self.mvola + self.orange_money + self.airtel_money
    }

    /// Rejects a sheet with any negative field, naming the offender.
    pub fn ensure_non_negative(&self) -> ResultEngine<()> {
        if self.cash.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "cash balance must not be negative, got {}",
                self.cash
            )));
        }
        for kind in ServiceKind::ALL {
            if self.service(kind).is_negative() {
                return Err(EngineError::InvalidAmount(format!(
                    "{kind} balance must not be negative, got {}",
                    self.service(kind)
                )));
            }
        }
        Ok(())
    }

    /// Validates and applies one operation, returning the resulting sheet.
    ///
    /// Solvency is checked against the amount alone; the fee never moves a
    /// balance.
    pub fn apply(
        &self,
        kind: OperationKind,
        service: ServiceKind,
        amount: Money,
    ) -> ResultEngine<BalanceSheet> {
        let mut next = *self;
        match kind {
            // Cash in, service float out.
            OperationKind::Deposit | OperationKind::Transfer => {
                let available = self.service(service);
                if available < amount {
                    return Err(EngineError::InsufficientService {
                        service,
                        requested: amount,
                        available,
                    });
                }
                *next.service_mut(service) = available - amount;
                next.cash = self.cash + amount;
            }
            // Cash out, service float in.
            OperationKind::Withdrawal => {
                if self.cash < amount {
                    return Err(EngineError::InsufficientCash {
                        requested: amount,
                        available: self.cash,
                    });
                }
                next.cash = self.cash - amount;
                *next.service_mut(service) = self.service(service) + amount;
            }
        }
        Ok(next)
    }
}
