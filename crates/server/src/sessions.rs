//! Session API endpoints

use api_types::Balances;
use api_types::session::{SessionStart, SessionView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{FixedOffset, Utc};

use crate::{
    ServerError,
    server::{OperatorId, ServerState},
};
use engine::{BalanceSheet, EngineError, Money, Session, StartSessionCmd};

pub(crate) fn map_balances(sheet: BalanceSheet) -> Balances {
    Balances {
        cash: sheet.cash.ariary(),
        mvola: sheet.mvola.ariary(),
        orange_money: sheet.orange_money.ariary(),
        airtel_money: sheet.airtel_money.ariary(),
    }
}

fn session_view(session: Session) -> Result<SessionView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    Ok(SessionView {
        id: session.id,
        opened_at: session.opened_at.with_timezone(&utc),
        closed_at: session.closed_at.map(|dt| dt.with_timezone(&utc)),
        is_active: session.is_active,
        opening: map_balances(session.opening),
        balances: map_balances(session.balances),
    })
}

pub async fn start(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
    Json(payload): Json<SessionStart>,
) -> Result<(StatusCode, Json<SessionView>), ServerError> {
    let opening = BalanceSheet::new(
        Money::new(payload.cash),
        Money::new(payload.mvola),
        Money::new(payload.orange_money),
        Money::new(payload.airtel_money),
    );

    let session = state
        .engine
        .start_session(StartSessionCmd::new(operator.0, opening, Utc::now()))
        .await?;

    Ok((StatusCode::CREATED, Json(session_view(session)?)))
}

pub async fn close(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.engine.close_session(&operator.0, Utc::now()).await?;
    Ok(Json(session_view(session)?))
}

pub async fn get_current(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state
        .engine
        .active_session(&operator.0)
        .await
        .map_err(|err| match err {
            // "No session yet" is a missing resource on this route, not a
            // conflict.
            EngineError::NoActiveSession => {
                ServerError::Engine(EngineError::KeyNotFound("active session".to_string()))
            }
            other => ServerError::Engine(other),
        })?;
    Ok(Json(session_view(session)?))
}
