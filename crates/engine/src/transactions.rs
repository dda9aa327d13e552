//! Transaction primitives.
//!
//! A `TransactionRecord` is one completed counter operation. Records are
//! immutable once appended: each one independently encodes its own balance
//! delta (kind + service + amount), so the history can be replayed to
//! rebuild a session's balances.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ServiceKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for OperationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::KeyNotFound(format!(
                "invalid operation kind: {other}"
            ))),
        }
    }
}

/// Outcome recorded on a row. The engine only appends `Completed` rows;
/// rejected attempts are surfaced as errors and never persisted. `Failed`
/// stays representable so externally imported rows round-trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::KeyNotFound(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Third party receiving a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    /// Insertion counter within the session, the stable tie-break when
    /// ordering by timestamp.
    pub seq: i64,
    pub kind: OperationKind,
    pub service: ServiceKind,
    pub amount: Money,
    pub fee: Money,
    pub phone_number: Option<String>,
    pub recipient: Option<Recipient>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub created_by: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub session_id: String,
    pub seq: i64,
    pub kind: String,
    pub service: String,
    pub amount: i64,
    pub fee: i64,
    pub phone_number: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub description: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub status: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Sessions,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransactionRecord> for ActiveModel {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            session_id: ActiveValue::Set(record.session_id.to_string()),
            seq: ActiveValue::Set(record.seq),
            kind: ActiveValue::Set(record.kind.as_str().to_string()),
            service: ActiveValue::Set(record.service.as_str().to_string()),
            amount: ActiveValue::Set(record.amount.ariary()),
            fee: ActiveValue::Set(record.fee.ariary()),
            phone_number: ActiveValue::Set(record.phone_number.clone()),
            recipient_name: ActiveValue::Set(
                record.recipient.as_ref().map(|r| r.name.clone()),
            ),
            recipient_phone: ActiveValue::Set(
                record.recipient.as_ref().map(|r| r.phone.clone()),
            ),
            description: ActiveValue::Set(record.description.clone()),
            occurred_at: ActiveValue::Set(record.occurred_at),
            status: ActiveValue::Set(record.status.as_str().to_string()),
            created_by: ActiveValue::Set(record.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for TransactionRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let recipient = match (model.recipient_name, model.recipient_phone) {
            (Some(name), Some(phone)) => Some(Recipient { name, phone }),
            _ => None,
        };
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            session_id: Uuid::parse_str(&model.session_id)
                .map_err(|_| EngineError::KeyNotFound("session not exists".to_string()))?,
            seq: model.seq,
            kind: OperationKind::try_from(model.kind.as_str())?,
            service: ServiceKind::try_from(model.service.as_str())?,
            amount: Money::new(model.amount),
            fee: Money::new(model.fee),
            phone_number: model.phone_number,
            recipient,
            description: model.description,
            occurred_at: model.occurred_at,
            status: TransactionStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
        })
    }
}
