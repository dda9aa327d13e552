use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{reports, sessions, transactions};
use engine::Engine;

static OPERATOR_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("operator-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Identity of the operator behind a request, attached by the middleware.
///
/// Authentication itself happens upstream; this layer only refuses anonymous
/// requests, since every ledger operation must be attributable.
#[derive(Clone, Debug)]
pub struct OperatorId(pub String);

/// `TypedHeader` for the custom operator header
///
/// Requests must carry a non-empty "operator-id" entry in the header.
#[derive(Debug)]
struct OperatorHeader(String);

impl Header for OperatorHeader {
    fn name() -> &'static axum::http::HeaderName {
        &OPERATOR_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(OperatorHeader(trimmed.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode operator-id header"),
        }
    }
}

async fn auth(
    operator: Option<TypedHeader<OperatorHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(operator)) = operator else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(OperatorId(operator.0));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/session",
            post(sessions::start).get(sessions::get_current),
        )
        .route("/session/close", post(sessions::close))
        .route("/deposit", post(transactions::deposit_new))
        .route("/withdraw", post(transactions::withdraw_new))
        .route("/transfer", post(transactions::transfer_new))
        .route("/transactions", get(transactions::list))
        .route("/stats", get(reports::get_stats))
        .route_layer(middleware::from_fn(auth))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
