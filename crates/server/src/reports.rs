//! Reporting API endpoints

use api_types::stats::SessionSummary as ApiSummary;
use axum::{Extension, Json, extract::State};
use chrono::FixedOffset;

use crate::{
    ServerError,
    server::{OperatorId, ServerState},
    sessions::map_balances,
};

pub async fn get_stats(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
) -> Result<Json<ApiSummary>, ServerError> {
    let summary = state.engine.session_summary(&operator.0).await?;

    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;

    Ok(Json(ApiSummary {
        active: summary.session_id.is_some(),
        session_id: summary.session_id,
        opened_at: summary.opened_at.map(|dt| dt.with_timezone(&utc)),
        balances: map_balances(summary.balances),
        mobile_total: summary.mobile_total.ariary(),
        fees_collected: summary.fees_collected.ariary(),
        deposits_total: summary.deposits_total.ariary(),
        withdrawals_total: summary.withdrawals_total.ariary(),
        transfers_total: summary.transfers_total.ariary(),
        transaction_count: summary.transaction_count,
    }))
}
