//! The module contains the operating session and its persisted model.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BalanceSheet, EngineError, Money};

/// One operator's accounting period.
///
/// A session is opened by declaring the cash and per-service balances the
/// operator starts the day with, and closed explicitly at the end of it. At
/// most one session per operator is active at a time. Closing a session
/// keeps the row and its transactions; only a new `start` creates fresh
/// balances.
///
/// `opening` is the declared snapshot and never changes; `balances` is the
/// current state, denormalized onto the session row and updated in the same
/// database transaction as every appended operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub operator_id: String,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub opening: BalanceSheet,
    pub balances: BalanceSheet,
}

impl Session {
    /// Opens a new active session seeded with the declared balances.
    pub fn open(operator_id: String, opening: BalanceSheet, opened_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            operator_id,
            opened_at,
            closed_at: None,
            is_active: true,
            opening,
            balances: opening,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub operator_id: String,
    pub opened_at: DateTimeUtc,
    pub closed_at: Option<DateTimeUtc>,
    pub is_active: bool,
    pub opening_cash: i64,
    pub opening_mvola: i64,
    pub opening_orange_money: i64,
    pub opening_airtel_money: i64,
    pub cash: i64,
    pub mvola: i64,
    pub orange_money: i64,
    pub airtel_money: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Session> for ActiveModel {
    fn from(session: &Session) -> Self {
        Self {
            id: ActiveValue::Set(session.id.to_string()),
            operator_id: ActiveValue::Set(session.operator_id.clone()),
            opened_at: ActiveValue::Set(session.opened_at),
            closed_at: ActiveValue::Set(session.closed_at),
            is_active: ActiveValue::Set(session.is_active),
            opening_cash: ActiveValue::Set(session.opening.cash.ariary()),
            opening_mvola: ActiveValue::Set(session.opening.mvola.ariary()),
            opening_orange_money: ActiveValue::Set(session.opening.orange_money.ariary()),
            opening_airtel_money: ActiveValue::Set(session.opening.airtel_money.ariary()),
            cash: ActiveValue::Set(session.balances.cash.ariary()),
            mvola: ActiveValue::Set(session.balances.mvola.ariary()),
            orange_money: ActiveValue::Set(session.balances.orange_money.ariary()),
            airtel_money: ActiveValue::Set(session.balances.airtel_money.ariary()),
        }
    }
}

impl TryFrom<Model> for Session {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("session not exists".to_string()))?,
            operator_id: model.operator_id,
            opened_at: model.opened_at,
            closed_at: model.closed_at,
            is_active: model.is_active,
            opening: BalanceSheet::new(
                Money::new(model.opening_cash),
                Money::new(model.opening_mvola),
                Money::new(model.opening_orange_money),
                Money::new(model.opening_airtel_money),
            ),
            balances: BalanceSheet::new(
                Money::new(model.cash),
                Money::new(model.mvola),
                Money::new(model.orange_money),
                Money::new(model.airtel_money),
            ),
        })
    }
}
