//! Transactions API endpoints

use api_types::Service as ApiService;
use api_types::transaction::{
    DepositNew, OperationKind as ApiKind, TransactionList, TransactionListResponse,
    TransactionStatus as ApiStatus, TransactionView, TransferNew, WithdrawNew,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{FixedOffset, Utc};

use crate::{
    ServerError,
    server::{OperatorId, ServerState},
};
use engine::{
    DepositCmd, Money, Recipient, TransactionListFilter, TransactionRecord, TransferCmd,
    WithdrawCmd,
};

fn map_service(service: ApiService) -> engine::ServiceKind {
    match service {
        ApiService::Mvola => engine::ServiceKind::Mvola,
        ApiService::OrangeMoney => engine::ServiceKind::OrangeMoney,
        ApiService::AirtelMoney => engine::ServiceKind::AirtelMoney,
    }
}

fn map_service_back(service: engine::ServiceKind) -> ApiService {
    match service {
        engine::ServiceKind::Mvola => ApiService::Mvola,
        engine::ServiceKind::OrangeMoney => ApiService::OrangeMoney,
        engine::ServiceKind::AirtelMoney => ApiService::AirtelMoney,
    }
}

fn map_kind(kind: engine::OperationKind) -> ApiKind {
    match kind {
        engine::OperationKind::Deposit => ApiKind::Deposit,
        engine::OperationKind::Withdrawal => ApiKind::Withdrawal,
        engine::OperationKind::Transfer => ApiKind::Transfer,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Completed => ApiStatus::Completed,
        engine::TransactionStatus::Failed => ApiStatus::Failed,
    }
}

fn transaction_view(record: TransactionRecord) -> Result<TransactionView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;
    Ok(TransactionView {
        id: record.id,
        kind: map_kind(record.kind),
        service: map_service_back(record.service),
        amount: record.amount.ariary(),
        fee: record.fee.ariary(),
        phone_number: record.phone_number,
        recipient_name: record.recipient.as_ref().map(|r| r.name.clone()),
        recipient_phone: record.recipient.map(|r| r.phone),
        description: record.description,
        occurred_at: record.occurred_at.with_timezone(&utc),
        status: map_status(record.status),
    })
}

pub async fn deposit_new(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
    Json(payload): Json<DepositNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let record = state
        .engine
        .deposit(DepositCmd::new(
            operator.0,
            map_service(payload.service),
            Money::new(payload.amount),
            payload.phone_number,
            Utc::now(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(transaction_view(record)?)))
}

pub async fn withdraw_new(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
    Json(payload): Json<WithdrawNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let record = state
        .engine
        .withdraw(WithdrawCmd::new(
            operator.0,
            map_service(payload.service),
            Money::new(payload.amount),
            payload.phone_number,
            Utc::now(),
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(transaction_view(record)?)))
}

pub async fn transfer_new(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = TransferCmd::new(
        operator.0,
        map_service(payload.service),
        Money::new(payload.amount),
        Recipient {
            name: payload.recipient_name,
            phone: payload.recipient_phone,
        },
        Utc::now(),
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let record = state.engine.transfer(cmd).await?;
    Ok((StatusCode::CREATED, Json(transaction_view(record)?)))
}

pub async fn list(
    Extension(operator): Extension<OperatorId>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = TransactionListFilter {
        service: payload.service.map(map_service),
        kind: payload.kind.map(|kind| match kind {
            ApiKind::Deposit => engine::OperationKind::Deposit,
            ApiKind::Withdrawal => engine::OperationKind::Withdrawal,
            ApiKind::Transfer => engine::OperationKind::Transfer,
        }),
        limit: payload.limit,
    };

    let records = state.engine.list_transactions(&operator.0, filter).await?;
    let mut transactions = Vec::with_capacity(records.len());
    for record in records {
        transactions.push(transaction_view(record)?);
    }

    Ok(Json(TransactionListResponse { transactions }))
}
