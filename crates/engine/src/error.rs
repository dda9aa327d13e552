//! The module contains the errors the engine can return.
//!
//! Every rejection names the unmet precondition, including the concrete
//! amounts involved, so callers can surface a correctable message to the
//! operator without string-matching.

use sea_orm::DbErr;
use thiserror::Error;

use crate::{Money, ServiceKind};

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no active session: declare opening balances before recording operations")]
    NoActiveSession,
    #[error("session {0} is already active: close it before starting a new one")]
    SessionAlreadyActive(String),
    #[error("cash balance insufficient: requested {requested}, available {available}")]
    InsufficientCash { requested: Money, available: Money },
    #[error("{service} balance insufficient: requested {requested}, available {available}")]
    InsufficientService {
        service: ServiceKind,
        requested: Money,
        available: Money,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NoActiveSession, Self::NoActiveSession) => true,
            (Self::SessionAlreadyActive(a), Self::SessionAlreadyActive(b)) => a == b,
            (
                Self::InsufficientCash {
                    requested: a_req,
                    available: a_av,
                },
                Self::InsufficientCash {
                    requested: b_req,
                    available: b_av,
                },
            ) => a_req == b_req && a_av == b_av,
            (
                Self::InsufficientService {
                    service: a_svc,
                    requested: a_req,
                    available: a_av,
                },
                Self::InsufficientService {
                    service: b_svc,
                    requested: b_req,
                    available: b_av,
                },
            ) => a_svc == b_svc && a_req == b_req && a_av == b_av,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
